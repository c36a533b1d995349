use std::collections::HashMap;
use indexmap::IndexMap;
use crate::error::Error;
use crate::grammar::{Grammar, Symbol};
use crate::symbols::{SymbolId, SymbolMapping};

pub mod term_set;

pub use term_set::{TermSet, EPSILON_NAME};

/// FIRST and FOLLOW sets of every nonterminal of one grammar snapshot.
/// Recompute after transforming the grammar.
#[derive(Debug, Clone)]
pub struct Sets {
  first: IndexMap<String, TermSet>,
  follow: IndexMap<String, TermSet>,
  num_columns: usize,
}

enum Memo {
  InProgress,
  Done(TermSet),
}

struct FirstBuilder<'a> {
  grammar: &'a Grammar,
  mapping: &'a SymbolMapping,
  memo: HashMap<&'a str, Memo>,
  /// nonterminals currently being computed, outermost first
  path: Vec<&'a str>,
}

impl<'a> FirstBuilder<'a> {
  fn first(&mut self, nt: &'a str) -> Result<TermSet, Error> {
    match self.memo.get(nt) {
      Some(Memo::Done(set)) => return Ok(set.clone()),
      Some(Memo::InProgress) => {
        let from = self.path.iter().position(|&n| n == nt).unwrap_or(0);
        let mut cycle = self.path[from..].iter()
          .map(|n| (*n).to_owned())
          .collect::<Vec<_>>();
        cycle.push(nt.to_owned());
        return Err(Error::Cycle(cycle));
      }
      None => {}
    }

    self.memo.insert(nt, Memo::InProgress);
    self.path.push(nt);

    let mut set = TermSet::new(self.mapping.column_count());
    let grammar = self.grammar;
    for prod in grammar.productions_of(nt) {
      self.first_of_symbols(&prod.body, &mut set)?;
    }

    self.path.pop();
    self.memo.insert(nt, Memo::Done(set.clone()));
    Ok(set)
  }

  fn first_of_symbols(
    &mut self,
    symbols: &'a [Symbol],
    result: &mut TermSet,
  ) -> Result<(), Error> {
    for sym in symbols {
      if sym.is_terminal {
        result.insert(column(self.mapping, sym)?);
        return Ok(());
      }
      let first = self.first(&sym.name)?;
      result.union_with(&first);
      if !first.has_epsilon() {
        return Ok(());
      }
    }
    result.insert_epsilon();
    Ok(())
  }
}

fn column(mapping: &SymbolMapping, sym: &Symbol) -> Result<usize, Error> {
  mapping.id(&sym.name)
    .and_then(SymbolId::column)
    .ok_or_else(|| Error::UnknownSymbol(sym.name.clone()))
}

impl Sets {
  pub fn compute(grammar: &Grammar, mapping: &SymbolMapping) -> Result<Sets, Error> {
    let mut builder = FirstBuilder {
      grammar,
      mapping,
      memo: HashMap::new(),
      path: vec![],
    };
    let mut first = IndexMap::new();
    for nt in grammar.nonterminals() {
      first.insert(nt.to_owned(), builder.first(nt)?);
    }

    let mut sets = Sets {
      first,
      follow: IndexMap::new(),
      num_columns: mapping.column_count(),
    };
    sets.follow = sets.compute_follow(grammar, mapping)?;
    Ok(sets)
  }

  /// Fixpoint over every occurrence `M -> α N β`: FIRST(β) minus ε goes into
  /// FOLLOW(N), and FOLLOW(M) too when β is nullable.
  fn compute_follow(
    &self,
    grammar: &Grammar,
    mapping: &SymbolMapping,
  ) -> Result<IndexMap<String, TermSet>, Error> {
    let mut follow = grammar.nonterminals()
      .map(|nt| (nt.to_owned(), TermSet::new(self.num_columns)))
      .collect::<IndexMap<_, _>>();
    if let Some(set) = follow.get_mut(grammar.start()) {
      set.insert(0);
    }

    loop {
      let mut changed = false;
      for prod in grammar.productions() {
        for (i, sym) in prod.body.iter().enumerate() {
          if sym.is_terminal {
            continue;
          }
          let mut add = self.first_of(&prod.body[i + 1..], mapping)?;
          if add.has_epsilon() {
            if let Some(head_follow) = follow.get(&prod.head) {
              add.union_with(head_follow);
            }
          }
          if let Some(set) = follow.get_mut(&sym.name) {
            changed |= set.union_with(&add);
          }
        }
      }
      if !changed {
        break;
      }
    }

    Ok(follow)
  }

  pub fn first(&self, nonterminal: &str) -> Option<&TermSet> {
    self.first.get(nonterminal)
  }

  pub fn follow(&self, nonterminal: &str) -> Option<&TermSet> {
    self.follow.get(nonterminal)
  }

  /// FIRST of a symbol sequence; holds ε iff every symbol is nullable.
  pub fn first_of(&self, symbols: &[Symbol], mapping: &SymbolMapping) -> Result<TermSet, Error> {
    let mut result = TermSet::new(self.num_columns);
    for sym in symbols {
      if sym.is_terminal {
        result.insert(column(mapping, sym)?);
        return Ok(result);
      }
      let first = self.first(&sym.name)
        .ok_or_else(|| Error::UnknownSymbol(sym.name.clone()))?;
      result.union_with(first);
      if !first.has_epsilon() {
        return Ok(result);
      }
    }
    result.insert_epsilon();
    Ok(result)
  }

  /// FIRST sets in grammar order.
  pub fn firsts(&self) -> impl Iterator<Item = (&str, &TermSet)> {
    self.first.iter().map(|(nt, set)| (nt.as_str(), set))
  }

  /// FOLLOW sets in grammar order.
  pub fn follows(&self) -> impl Iterator<Item = (&str, &TermSet)> {
    self.follow.iter().map(|(nt, set)| (nt.as_str(), set))
  }
}
