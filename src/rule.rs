use std::collections::HashSet;
use std::ops::BitOr;
use crate::grammar::{Grammar, Production, Symbol};

/// One or more alternatives for a nonterminal.
#[derive(Debug, Clone)]
pub struct Rule(Vec<Alt>);

#[derive(Debug, Clone, Default)]
struct Alt {
  symbols: Vec<SymRef>,
  code: Option<String>,
}

#[derive(Debug, Clone)]
struct SymRef {
  name: String,
  argument: Option<String>,
}

impl Alt {
  fn join(&self, other: &Alt) -> Alt {
    Alt {
      symbols: self.symbols.iter().chain(&other.symbols).cloned().collect(),
      code: None,
    }
  }
}

impl Rule {
  /// Attaches action code to every alternative of the rule.
  pub fn action(
    mut self,
    code: impl Into<String>,
  ) -> Rule {
    let code = code.into();
    for alt in &mut self.0 {
      alt.code = Some(code.clone());
    }
    self
  }
}

pub fn sym(
  sym: impl Into<String>,
) -> Rule {
  Rule(vec![Alt {
    symbols: vec![SymRef {
      name: sym.into(),
      argument: None,
    }],
    code: None,
  }])
}

/// A symbol carrying an opaque argument, written `sym(argument)`.
pub fn arg(
  sym: impl Into<String>,
  argument: impl Into<String>,
) -> Rule {
  Rule(vec![Alt {
    symbols: vec![SymRef {
      name: sym.into(),
      argument: Some(argument.into()),
    }],
    code: None,
  }])
}

/// The empty alternative.
pub fn eps() -> Rule {
  Rule(vec![Alt::default()])
}

/// Concatenation. Distributes over alternatives, so
/// `seq([a | b, c])` is `seq([a, c]) | seq([b, c])`.
pub fn seq<const N: usize>(
  rules: [Rule; N],
) -> Rule {
  let mut alts = vec![Alt::default()];
  for Rule(rule_alts) in rules {
    alts = alts.iter()
      .flat_map(|prefix| rule_alts.iter().map(move |alt| prefix.join(alt)))
      .collect();
  }
  Rule(alts)
}

impl BitOr for Rule {
  type Output = Rule;

  fn bitor(self, rhs: Rule) -> Rule {
    let Rule(mut x) = self;
    let Rule(mut y) = rhs;
    x.append(&mut y);
    Rule(x)
  }
}

/// Builds a grammar. A referenced name is a terminal iff it is listed in
/// `tokens`; everything else is a nonterminal. Several entries for the same
/// nonterminal append to its productions.
pub fn grammar(
  tokens: &[&str],
  start: &str,
  rules: &[(&str, Rule)],
) -> Grammar {
  let tokens = tokens.iter().copied().collect::<HashSet<_>>();

  let mut grammar = Grammar::new(start);
  for (name, Rule(alts)) in rules {
    for alt in alts {
      let body = alt.symbols.iter()
        .map(|s| Symbol {
          name: s.name.clone(),
          is_terminal: tokens.contains(s.name.as_str()),
          argument: s.argument.clone(),
        })
        .collect();
      grammar.add(Production::new(*name, body, alt.code.clone()));
    }
  }
  grammar
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn bodies(g: &Grammar, nt: &str) -> Vec<String> {
    g.productions_of(nt).iter().map(|p| p.to_string()).collect()
  }

  #[test]
  fn seq_distributes_over_alternatives() {
    let g = grammar(&["a", "b", "c"], "S", &[
      ("S", seq([sym("a") | sym("b"), sym("c")])),
    ]);
    assert_eq!(bodies(&g, "S"), vec!["S -> a c", "S -> b c"]);
  }

  #[test]
  fn tokens_classify_symbols() {
    let g = grammar(&["x"], "S", &[
      ("S", seq([sym("x"), sym("T")])),
      ("T", sym("x")),
    ]);
    let body = &g.productions_of("S")[0].body;
    assert!(body[0].is_terminal);
    assert!(!body[1].is_terminal);
  }

  #[test]
  fn action_applies_to_every_alternative() {
    let g = grammar(&["a", "b"], "S", &[
      ("S", (sym("a") | sym("b")).action("pick")),
    ]);
    let codes = g.productions_of("S").iter()
      .map(|p| p.code.as_deref())
      .collect::<Vec<_>>();
    assert_eq!(codes, vec![Some("pick"), Some("pick")]);
  }
}
