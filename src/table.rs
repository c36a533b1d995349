use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use log::{debug, info, warn};
use crate::error::Error;
use crate::grammar::{Grammar, Production};
use crate::sets::Sets;
use crate::symbols::{SymbolId, SymbolMapping};

/// A production as the engine sees it: the head, the body as symbol ids and
/// the opaque action code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
  head: SymbolId,
  body: Vec<SymbolId>,
  code: Option<String>,
  production: String,
}

impl Action {
  pub fn head(&self) -> SymbolId {
    self.head
  }

  pub fn body(&self) -> &[SymbolId] {
    &self.body
  }

  pub fn code(&self) -> Option<&str> {
    self.code.as_deref()
  }

  /// The production rendered as `N -> a B`.
  pub fn production(&self) -> &str {
    &self.production
  }
}

/// Two productions competing for the same table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
  pub nonterminal: String,
  pub terminal: String,
  /// the production already in the cell
  pub first: String,
  pub second: String,
}

impl Display for Conflict {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "conflict at ({}, {}): `{}` vs `{}`",
      self.nonterminal, self.terminal, self.first, self.second)
  }
}

/// An LL(1) parsing table. Only conflict-free tables are ever built, and the
/// table is immutable afterwards, so any number of parsers may share it.
#[derive(Debug, Clone)]
pub struct ParsingTable {
  symbols: SymbolMapping,
  /// row-major, one row per nonterminal, one column per terminal plus `$`
  /// at column 0; 0 is an empty cell, otherwise an action id
  cells: Vec<u32>,
  actions: Vec<Action>,
}

impl ParsingTable {
  pub fn symbols(&self) -> &SymbolMapping {
    &self.symbols
  }

  pub fn start(&self) -> SymbolId {
    self.symbols.start()
  }

  pub fn column_count(&self) -> usize {
    self.symbols.column_count()
  }

  /// The action for nonterminal `nonterminal` at lookahead `terminal`.
  pub fn get(&self, nonterminal: SymbolId, terminal: SymbolId) -> Option<&Action> {
    self.lookup(nonterminal, terminal).map(|(_, action)| action)
  }

  /// Like `get`, with the action id.
  pub(crate) fn lookup(&self, nonterminal: SymbolId, terminal: SymbolId) -> Option<(u32, &Action)> {
    let id = self.cell(nonterminal, terminal)?;
    Some((id, self.action(id)?))
  }

  pub fn action(&self, id: u32) -> Option<&Action> {
    match id {
      0 => None,
      id => self.actions.get(id as usize - 1),
    }
  }

  pub fn cells(&self) -> &[u32] {
    &self.cells
  }

  pub fn actions(&self) -> &[Action] {
    &self.actions
  }

  /// Non-empty cells in row-major order.
  pub fn entries(&self) -> impl Iterator<Item = (SymbolId, SymbolId, &Action)> + '_ {
    let columns = self.column_count();
    self.cells.iter()
      .enumerate()
      .filter(|&(_, &id)| id != 0)
      .filter_map(move |(ix, &id)| {
        let nonterminal = SymbolId(-((ix / columns) as i32) - 1);
        let terminal = SymbolId((ix % columns) as i32);
        Some((nonterminal, terminal, self.action(id)?))
      })
  }

  fn cell(&self, nonterminal: SymbolId, terminal: SymbolId) -> Option<u32> {
    let row = nonterminal.row()?;
    let column = terminal.column()?;
    if row >= self.symbols.nonterminal_count() || column >= self.column_count() {
      return None;
    }
    self.cells.get(row * self.column_count() + column).copied()
  }
}

impl Display for ParsingTable {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, (nt, t, action)) in self.entries().enumerate() {
      if i != 0 {
        f.write_str("\n")?;
      }
      write!(f, "M[{}, {}] = {}",
        self.symbols.describe(nt), self.symbols.describe(t), action.production)?;
    }
    Ok(())
  }
}

/// Fills the table of one grammar from its FIRST/FOLLOW sets. Every
/// conflict is collected; the table is only produced when there is none.
pub struct TableBuilder<'a> {
  grammar: &'a Grammar,
  sets: &'a Sets,
  symbols: SymbolMapping,
  cells: Vec<u32>,
  actions: Vec<Action>,
  /// (head index, production index) -> action id
  action_ids: HashMap<(usize, usize), u32>,
  conflicts: Vec<Conflict>,
}

impl<'a> TableBuilder<'a> {
  pub fn new(grammar: &'a Grammar, sets: &'a Sets, symbols: SymbolMapping) -> Self {
    let cells = vec![0; symbols.nonterminal_count() * symbols.column_count()];
    TableBuilder {
      grammar,
      sets,
      symbols,
      cells,
      actions: vec![],
      action_ids: HashMap::new(),
      conflicts: vec![],
    }
  }

  /// For `N -> α`, every terminal in FIRST(α) gets the production, and when
  /// α is nullable so does every terminal in FOLLOW(N), `$` included.
  pub fn build(mut self) -> Result<ParsingTable, Error> {
    let grammar = self.grammar;
    let sets = self.sets;
    for (head_ix, head) in grammar.nonterminals().enumerate() {
      let row = self.symbols.id(head)
        .and_then(SymbolId::row)
        .ok_or_else(|| Error::UnknownSymbol(head.to_owned()))?;
      let follow = sets.follow(head)
        .ok_or_else(|| Error::UnknownSymbol(head.to_owned()))?;

      for (prod_ix, prod) in grammar.productions_of(head).iter().enumerate() {
        let first = sets.first_of(&prod.body, &self.symbols)?;
        for column in first.iter() {
          self.write(row, column, (head_ix, prod_ix), prod)?;
        }
        if first.has_epsilon() {
          for column in follow.iter() {
            self.write(row, column, (head_ix, prod_ix), prod)?;
          }
        }
      }
    }

    if !self.conflicts.is_empty() {
      for conflict in &self.conflicts {
        warn!("{}", conflict);
      }
      return Err(Error::Conflicts(self.conflicts));
    }

    info!("parsing table: {} nonterminal(s) x {} column(s), {} action(s)",
      self.symbols.nonterminal_count(), self.symbols.column_count(), self.actions.len());

    Ok(ParsingTable {
      symbols: self.symbols,
      cells: self.cells,
      actions: self.actions,
    })
  }

  fn write(
    &mut self,
    row: usize,
    column: usize,
    key: (usize, usize),
    prod: &Production,
  ) -> Result<(), Error> {
    let ix = row * self.symbols.column_count() + column;
    let existing = self.cells[ix];
    if existing == 0 {
      let id = self.action_id(key, prod)?;
      self.cells[ix] = id;
      debug!("M[{}, {}] = {}",
        prod.head, self.symbols.describe(SymbolId(column as i32)), prod);
      return Ok(());
    }
    if self.action_ids.get(&key) == Some(&existing) {
      return Ok(());
    }

    let first = self.actions[existing as usize - 1].production.clone();
    self.conflicts.push(Conflict {
      nonterminal: prod.head.clone(),
      terminal: self.symbols.describe(SymbolId(column as i32)),
      first,
      second: prod.to_string(),
    });
    Ok(())
  }

  fn action_id(&mut self, key: (usize, usize), prod: &Production) -> Result<u32, Error> {
    if let Some(&id) = self.action_ids.get(&key) {
      return Ok(id);
    }

    let lookup = |name: &str| self.symbols.id(name)
      .ok_or_else(|| Error::UnknownSymbol(name.to_owned()));
    let action = Action {
      head: lookup(&prod.head)?,
      body: prod.body.iter()
        .map(|sym| lookup(&sym.name))
        .collect::<Result<_, _>>()?,
      code: prod.code.clone(),
      production: prod.to_string(),
    };

    self.actions.push(action);
    let id = self.actions.len() as u32;
    self.action_ids.insert(key, id);
    Ok(id)
  }
}
