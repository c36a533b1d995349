use std::collections::HashSet;
use indexmap::IndexSet;
use thiserror::Error;
use super::Grammar;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
  #[error("start symbol `{0}` has no productions")]
  MissingStart(String),
  #[error("nonterminal `{name}` used in `{used_in}` has no productions")]
  UndefinedNonterminal {
    name: String,
    used_in: String,
  },
  #[error("symbol `{0}` is used both as a terminal and as a nonterminal")]
  AmbiguousSymbol(String),
  #[error("nonterminal `{0}` is left-recursive")]
  LeftRecursion(String),
  /// Left recursion that only shows through a nullable prefix, as in
  /// `A -> B A x` with `B` nullable. Epsilon elimination exposes it.
  #[error("nonterminal `{0}` is left-recursive through a nullable prefix")]
  HiddenLeftRecursion(String),
}

impl VerificationError {
  pub fn can_be_auto_fixed(&self) -> bool {
    matches!(self,
      VerificationError::LeftRecursion(_)
      | VerificationError::HiddenLeftRecursion(_))
  }
}

impl Grammar {
  /// Checks the grammar and returns every problem found. Left recursion is
  /// only looked for once the grammar is otherwise well-formed.
  pub fn verify(&self) -> Vec<VerificationError> {
    let mut errors = vec![];

    let start_missing = self.productions_of(&self.start).is_empty();
    if start_missing {
      errors.push(VerificationError::MissingStart(self.start.clone()));
    }

    let mut terminals = IndexSet::new();
    let mut nonterminals = self.nonterminals().collect::<HashSet<_>>();
    let mut undefined = IndexSet::new();
    for prod in self.productions() {
      for sym in &prod.body {
        if sym.is_terminal {
          terminals.insert(sym.name.as_str());
          continue;
        }
        nonterminals.insert(sym.name.as_str());
        let is_start = sym.name == self.start;
        if self.productions_of(&sym.name).is_empty() && !(is_start && start_missing) {
          undefined.insert((sym.name.as_str(), prod.head.as_str()));
        }
      }
    }

    errors.extend(undefined.into_iter()
      .map(|(name, used_in)| VerificationError::UndefinedNonterminal {
        name: name.to_owned(),
        used_in: used_in.to_owned(),
      }));

    errors.extend(terminals.into_iter()
      .filter(|t| nonterminals.contains(t))
      .map(|t| VerificationError::AmbiguousSymbol(t.to_owned())));

    if errors.is_empty() {
      errors.extend(self.left_recursion_errors());
    }

    errors
  }

  fn left_recursion_errors(&self) -> Vec<VerificationError> {
    let nullable = self.nullable();
    self.nonterminals()
      .filter_map(|nt| {
        if self.left_reaches(nt, nt, None) {
          Some(VerificationError::LeftRecursion(nt.to_owned()))
        } else if self.left_reaches(nt, nt, Some(&nullable)) {
          Some(VerificationError::HiddenLeftRecursion(nt.to_owned()))
        } else {
          None
        }
      })
      .collect()
  }

  /// Whether `to` can appear leftmost in a derivation from `from`. With
  /// `nullable`, symbols after a nullable prefix count as leftmost too.
  pub(crate) fn left_reaches<'a>(
    &'a self,
    from: &'a str,
    to: &str,
    nullable: Option<&IndexSet<String>>,
  ) -> bool {
    let mut visited = HashSet::new();
    let mut stack = vec![from];

    while let Some(nt) = stack.pop() {
      for prod in self.productions_of(nt) {
        for sym in &prod.body {
          if sym.is_terminal {
            break;
          }
          if sym.name == to {
            return true;
          }
          if visited.insert(sym.name.as_str()) {
            stack.push(sym.name.as_str());
          }
          match nullable {
            Some(nullable) if nullable.contains(&sym.name) => {}
            _ => break,
          }
        }
      }
    }

    false
  }
}
