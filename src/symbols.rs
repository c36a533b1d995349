use std::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use crate::grammar::Grammar;

/// Dense symbol id: terminals are positive, nonterminals negative, and 0 is
/// the end of input.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbolId(pub i32);

impl SymbolId {
  pub const EOF: SymbolId = SymbolId(0);

  pub fn is_terminal(self) -> bool {
    self.0 > 0
  }

  pub fn is_nonterminal(self) -> bool {
    self.0 < 0
  }

  /// Table column of a terminal or of the end of input.
  pub(crate) fn column(self) -> Option<usize> {
    if self.0 >= 0 {
      Some(self.0 as usize)
    } else {
      None
    }
  }

  /// Table row of a nonterminal.
  pub(crate) fn row(self) -> Option<usize> {
    if self.0 < 0 {
      Some((-self.0 - 1) as usize)
    } else {
      None
    }
  }
}

impl Display for SymbolId {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Rendering of the end-of-input marker.
pub const EOF_NAME: &str = "$";

/// Bijection between symbol names and ids. Build it once from the final
/// grammar, after all transformation passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolMapping {
  ids: IndexMap<String, SymbolId>,
  /// indexed by `id - 1`
  terminals: Vec<String>,
  /// indexed by `-id - 1`
  nonterminals: Vec<String>,
}

impl SymbolMapping {
  /// The start symbol gets -1; every other symbol gets the next free id of
  /// its kind in the order it is first met, walking heads and bodies in
  /// grammar order.
  pub fn new(grammar: &Grammar) -> Self {
    let mut mapping = SymbolMapping {
      ids: IndexMap::new(),
      terminals: vec![],
      nonterminals: vec![],
    };

    mapping.add(grammar.start(), false);
    for (head, prods) in grammar.rules() {
      mapping.add(head, false);
      for sym in prods.iter().flat_map(|prod| &prod.body) {
        mapping.add(&sym.name, sym.is_terminal);
      }
    }

    mapping
  }

  fn add(&mut self, name: &str, is_terminal: bool) {
    if self.ids.contains_key(name) {
      return;
    }
    let id = if is_terminal {
      self.terminals.push(name.to_owned());
      SymbolId(self.terminals.len() as i32)
    } else {
      self.nonterminals.push(name.to_owned());
      SymbolId(-(self.nonterminals.len() as i32))
    };
    self.ids.insert(name.to_owned(), id);
  }

  pub fn id(&self, name: &str) -> Option<SymbolId> {
    self.ids.get(name).copied()
  }

  pub fn name(&self, id: SymbolId) -> Option<&str> {
    if id == SymbolId::EOF {
      Some(EOF_NAME)
    } else if id.is_terminal() {
      self.terminals.get(id.0 as usize - 1).map(|s| s.as_str())
    } else {
      id.row().and_then(|row| self.nonterminals.get(row)).map(|s| s.as_str())
    }
  }

  pub fn terminal_count(&self) -> usize {
    self.terminals.len()
  }

  pub fn nonterminal_count(&self) -> usize {
    self.nonterminals.len()
  }

  /// Number of table columns: every terminal plus the end of input.
  pub fn column_count(&self) -> usize {
    self.terminals.len() + 1
  }

  pub fn start(&self) -> SymbolId {
    SymbolId(-1)
  }

  /// Name/id pairs in assignment order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolId)> {
    self.ids.iter().map(|(name, &id)| (name.as_str(), id))
  }

  pub(crate) fn describe(&self, id: SymbolId) -> String {
    match self.name(id) {
      Some(name) => name.to_owned(),
      None => format!("#{}", id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::rule::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn dense_ids() {
    let g = grammar(&["+", "id"], "E", &[
      ("E", seq([sym("T"), sym("E'")])),
      ("E'", seq([sym("+"), sym("T"), sym("E'")]) | eps()),
      ("T", sym("id")),
    ]);
    let mapping = SymbolMapping::new(&g);

    assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![
      ("E", SymbolId(-1)),
      ("T", SymbolId(-2)),
      ("E'", SymbolId(-3)),
      ("+", SymbolId(1)),
      ("id", SymbolId(2)),
    ]);
    assert_eq!(mapping.terminal_count(), 2);
    assert_eq!(mapping.nonterminal_count(), 3);
    assert_eq!(mapping.name(SymbolId::EOF), Some("$"));
    assert_eq!(mapping.name(SymbolId(-3)), Some("E'"));
    assert_eq!(mapping.name(SymbolId(3)), None);
    assert_eq!(mapping.id("id"), Some(SymbolId(2)));
  }

  #[test]
  fn start_comes_first() {
    let mut g = crate::Grammar::new("S");
    g.add(crate::Production::new("A", vec![], None));
    g.add(crate::Production::new("S", vec![crate::Symbol::nonterminal("A")], None));
    let mapping = SymbolMapping::new(&g);
    assert_eq!(mapping.id("S"), Some(SymbolId(-1)));
    assert_eq!(mapping.id("A"), Some(SymbolId(-2)));
  }
}
