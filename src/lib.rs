pub mod rule;
pub mod grammar;
pub mod symbols;
pub mod sets;
pub mod table;
pub mod parser;
pub mod report;
mod error;
#[cfg(test)]
mod testing;

use log::{debug, info, warn};

pub use error::Error;
pub use grammar::{Grammar, Production, Symbol, VerificationError};
pub use parser::{ParseError, Parser, Semantics};
pub use rule::{arg, eps, grammar, seq, sym, Rule};
pub use sets::{Sets, TermSet};
pub use symbols::{SymbolId, SymbolMapping};
pub use table::{Action, Conflict, ParsingTable, TableBuilder};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
  /// Repair left recursion (and the epsilon productions hiding it) instead
  /// of reporting it.
  pub auto_fix: bool,
}

impl Default for Options {
  fn default() -> Self {
    Options {
      auto_fix: true,
    }
  }
}

/// The output of a successful build. `grammar` is the grammar after any
/// repairs, and the sets and the table are computed from it.
#[derive(Debug, Clone)]
pub struct Generated {
  pub grammar: Grammar,
  pub sets: Sets,
  pub table: ParsingTable,
}

pub fn build(grammar: Grammar) -> Result<Generated, Error> {
  build_with(grammar, &Options::default())
}

pub fn build_with(mut grammar: Grammar, options: &Options) -> Result<Generated, Error> {
  debug!("input grammar:\n{}", grammar);

  let errors = grammar.verify();
  for err in &errors {
    warn!("{}", err);
  }
  if errors.iter().any(|err| !options.auto_fix || !err.can_be_auto_fixed()) {
    return Err(Error::Verification(errors));
  }

  if !errors.is_empty() {
    let hidden = errors.iter()
      .any(|err| matches!(err, VerificationError::HiddenLeftRecursion(_)));
    if hidden {
      let count = grammar.eliminate_epsilon_productions();
      info!("eliminated epsilon productions of {} nonterminal(s)", count);
    }
    let count = grammar.eliminate_left_recursion();
    info!("eliminated left recursion with {} rewrite(s)", count);

    let errors = grammar.verify();
    for err in &errors {
      warn!("{}", err);
    }
    if !errors.is_empty() {
      return Err(Error::Verification(errors));
    }
  }
  info!("grammar verified: {} nonterminal(s)", grammar.nonterminals().count());

  let symbols = SymbolMapping::new(&grammar);
  let sets = Sets::compute(&grammar, &symbols)?;
  let table = TableBuilder::new(&grammar, &sets, symbols).build()?;
  debug!("parsing table:\n{}", table);

  Ok(Generated {
    grammar,
    sets,
    table,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
  }

  fn left_recursive() -> Grammar {
    grammar(&["+", "*", "(", ")", "id"], "E", &[
      ("E", seq([sym("E"), sym("+"), sym("T")]) | sym("T")),
      ("T", seq([sym("T"), sym("*"), sym("F")]) | sym("F")),
      ("F", seq([sym("("), sym("E"), sym(")")]) | sym("id")),
    ])
  }

  #[test]
  fn fatal_errors_are_returned() {
    init_logger();
    let g = grammar(&["x"], "S", &[
      ("S", seq([sym("A"), sym("x")])),
      ("T", sym("B")),
    ]);
    match build(g) {
      Err(Error::Verification(errors)) => assert_eq!(errors, vec![
        VerificationError::UndefinedNonterminal {
          name: "A".to_owned(),
          used_in: "S".to_owned(),
        },
        VerificationError::UndefinedNonterminal {
          name: "B".to_owned(),
          used_in: "T".to_owned(),
        },
      ]),
      other => panic!("expected verification errors, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn auto_fix_disabled() {
    init_logger();
    let options = Options {
      auto_fix: false,
    };
    match build_with(left_recursive(), &options) {
      Err(Error::Verification(errors)) => {
        assert_eq!(errors, vec![
          VerificationError::LeftRecursion("E".to_owned()),
          VerificationError::LeftRecursion("T".to_owned()),
        ]);
      }
      other => panic!("expected verification errors, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn left_recursion_is_repaired() {
    init_logger();
    let generated = build(left_recursive()).unwrap();
    assert_eq!(generated.grammar.to_string(), "\
E -> T E';
T -> F T';
F -> ( E ) | id;
E' -> + T E' | ε;
T' -> * F T' | ε;");

    let symbols = generated.table.symbols();
    let e = symbols.id("E'").unwrap();
    let close = symbols.id(")").unwrap();
    assert_eq!(
      generated.table.get(e, close).map(|action| action.production()),
      Some("E' -> ε"));
  }

  #[test]
  fn hidden_left_recursion_is_repaired() {
    init_logger();
    let g = grammar(&["x", "y"], "A", &[
      ("A", seq([sym("B"), sym("A"), sym("x")]) | sym("y")),
      ("B", eps()),
    ]);
    let generated = build(g).unwrap();
    assert_eq!(generated.grammar.to_string(), "\
A -> y A';
A' -> x A' | ε;");
  }

  #[test]
  fn left_recursion_through_nullable_tails() {
    init_logger();
    let g = grammar(&["a"], "S", &[
      ("S", seq([sym("S"), sym("S")]) | sym("a") | eps()),
    ]);
    match build(g) {
      Err(Error::Verification(errors)) => assert_eq!(errors, vec![
        VerificationError::LeftRecursion("S".to_owned()),
        VerificationError::LeftRecursion("S'".to_owned()),
      ]),
      other => panic!("expected verification errors, got {:?}", other.map(|_| ())),
    }

    let g = grammar(&["a"], "S", &[
      ("S", seq([sym("S"), sym("A")]) | eps()),
      ("A", seq([sym("S"), sym("A")]) | sym("a")),
    ]);
    match build(g) {
      Err(Error::Verification(errors)) => assert_eq!(errors, vec![
        VerificationError::LeftRecursion("A".to_owned()),
        VerificationError::LeftRecursion("S'".to_owned()),
      ]),
      other => panic!("expected verification errors, got {:?}", other.map(|_| ())),
    }
  }

  #[test]
  fn unit_cycles() {
    init_logger();
    let g = || grammar(&["x"], "A", &[
      ("A", sym("B") | sym("x")),
      ("B", sym("A")),
    ]);
    let options = Options {
      auto_fix: false,
    };
    assert!(matches!(build_with(g(), &options), Err(Error::Verification(_))));
    assert!(matches!(build(g()), Err(Error::Conflicts(_))));
  }
}
