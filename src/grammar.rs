use std::fmt::{self, Display, Formatter};
use indexmap::{IndexMap, IndexSet};

mod verify;
mod epsilon;
mod left_recursion;

pub use verify::VerificationError;

/// A symbol occurrence inside a production body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
  pub name: String,
  pub is_terminal: bool,
  /// Opaque secondary identifier, carried through to code generation.
  pub argument: Option<String>,
}

impl Symbol {
  pub fn terminal(name: impl Into<String>) -> Self {
    Symbol {
      name: name.into(),
      is_terminal: true,
      argument: None,
    }
  }

  pub fn nonterminal(name: impl Into<String>) -> Self {
    Symbol {
      name: name.into(),
      is_terminal: false,
      argument: None,
    }
  }

  pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
    self.argument = Some(argument.into());
    self
  }
}

impl Display for Symbol {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match &self.argument {
      Some(arg) => write!(f, "{}({})", self.name, arg),
      None => f.write_str(&self.name),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
  pub head: String,
  /// empty for an epsilon production
  pub body: Vec<Symbol>,
  pub code: Option<String>,
}

impl Production {
  pub fn new(
    head: impl Into<String>,
    body: Vec<Symbol>,
    code: Option<String>,
  ) -> Self {
    Production {
      head: head.into(),
      body,
      code,
    }
  }

  pub fn is_epsilon(&self) -> bool {
    self.body.is_empty()
  }

  /// The leading nonterminal of the body, if the body starts with one.
  pub(crate) fn leading_nonterminal(&self) -> Option<&str> {
    match self.body.first() {
      Some(sym) if !sym.is_terminal => Some(&sym.name),
      _ => None,
    }
  }
}

struct Body<'a>(&'a [Symbol]);

impl Display for Body<'_> {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    if self.0.is_empty() {
      return f.write_str("ε");
    }
    for (i, sym) in self.0.iter().enumerate() {
      if i != 0 {
        f.write_str(" ")?;
      }
      write!(f, "{}", sym)?;
    }
    Ok(())
  }
}

impl Display for Production {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{} -> {}", self.head, Body(&self.body))
  }
}

/// A context-free grammar. Productions are grouped by head, and both the
/// heads and the productions under one head keep their insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
  start: String,
  rules: IndexMap<String, Vec<Production>>,
}

impl Grammar {
  pub fn new(start: impl Into<String>) -> Self {
    let start = start.into();
    let mut rules = IndexMap::new();
    rules.insert(start.clone(), vec![]);
    Grammar {
      start,
      rules,
    }
  }

  /// Appends a production to its head. Exact duplicates are ignored.
  pub fn add(&mut self, production: Production) {
    let prods = self.rules.entry(production.head.clone()).or_default();
    if !prods.contains(&production) {
      prods.push(production);
    }
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  pub fn nonterminals(&self) -> impl Iterator<Item = &str> {
    self.rules.keys().map(|s| s.as_str())
  }

  pub fn productions(&self) -> impl Iterator<Item = &Production> {
    self.rules.values().flatten()
  }

  pub fn productions_of(&self, nonterminal: &str) -> &[Production] {
    self.rules.get(nonterminal).map_or(&[], |prods| prods.as_slice())
  }

  pub(crate) fn index_of(&self, nonterminal: &str) -> Option<usize> {
    self.rules.get_index_of(nonterminal)
  }

  pub(crate) fn rules(&self) -> &IndexMap<String, Vec<Production>> {
    &self.rules
  }

  pub(crate) fn rules_mut(&mut self) -> &mut IndexMap<String, Vec<Production>> {
    &mut self.rules
  }

  /// Nonterminals that can derive the empty string.
  pub fn nullable(&self) -> IndexSet<String> {
    let mut nullable = IndexSet::new();

    loop {
      let mut changed = false;
      for prod in self.productions() {
        if !nullable.contains(&prod.head)
          && prod.body.iter().all(|sym| is_nullable(&nullable, sym))
        {
          nullable.insert(prod.head.clone());
          changed = true;
        }
      }
      if !changed {
        break;
      }
    }

    nullable
  }
}

fn is_nullable(nullable: &IndexSet<String>, sym: &Symbol) -> bool {
  !sym.is_terminal && nullable.contains(&sym.name)
}

impl Display for Grammar {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (i, (head, prods)) in self.rules.iter().enumerate() {
      if i != 0 {
        f.write_str("\n")?;
      }
      write!(f, "{} ->", head)?;
      for (j, prod) in prods.iter().enumerate() {
        if j != 0 {
          f.write_str(" |")?;
        }
        write!(f, " {}", Body(&prod.body))?;
      }
      f.write_str(";")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use crate::rule::*;
  use pretty_assertions::assert_eq;

  fn simple() -> crate::Grammar {
    grammar(
      &["a", "c", "d"],
      "Z",
      &[
        ("Z", sym("d") | seq([sym("X"), sym("Y"), sym("Z")])),
        ("Y", eps() | sym("c")),
        ("X", sym("Y") | sym("a")),
      ])
  }

  #[test]
  fn simple_nullable() {
    let nullable = simple().nullable();
    let mut names = nullable.iter().map(|s| s.as_str()).collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["X", "Y"]);
  }

  #[test]
  fn display() {
    assert_eq!(simple().to_string(), "\
Z -> d | X Y Z;
Y -> ε | c;
X -> Y | a;");
  }

  #[test]
  fn duplicates_are_ignored() {
    let g = grammar(&["a"], "S", &[
      ("S", sym("a")),
      ("S", sym("a")),
    ]);
    assert_eq!(g.productions_of("S").len(), 1);
  }

  #[test]
  fn arguments_are_rendered() {
    let g = grammar(&["id"], "S", &[
      ("S", seq([arg("id", "name"), sym("T")]).action("v = name;")),
      ("T", eps()),
    ]);
    assert_eq!(g.productions_of("S")[0].to_string(), "S -> id(name) T");
    assert_eq!(g.productions_of("S")[0].code.as_deref(), Some("v = name;"));
  }
}
