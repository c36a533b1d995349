use log::{debug, warn};
use super::{Grammar, Production, Symbol};

impl Grammar {
  /// Removes direct and indirect left recursion.
  ///
  /// The nonterminals present when the pass starts are visited in grammar
  /// order; the primed ones it adds are not. Before the direct rewrite of
  /// `N`, every production `N -> M γ` where `M` comes earlier and can lead
  /// back to `N` is replaced by `M`'s alternatives followed by `γ`. Then
  /// ```text
  /// N -> N α1 | ... | N αm | β1 | ... | βk
  /// ```
  /// becomes
  /// ```text
  /// N  -> β1 N' | ... | βk N'
  /// N' -> α1 N' | ... | αm N' | ε
  /// ```
  /// Productions `N -> N` are dropped. Left recursion hidden behind
  /// nullable prefixes is not seen here; eliminate epsilon productions first.
  ///
  /// Returns the number of rewrites performed.
  pub fn eliminate_left_recursion(&mut self) -> usize {
    let mut rewrites = 0;

    let count = self.rules().len();
    for i in 0..count {
      let head = match self.rules().get_index(i) {
        Some((head, _)) => head.clone(),
        None => break,
      };
      rewrites += self.substitute_leading(&head, i);
      if self.eliminate_direct(&head) {
        rewrites += 1;
      }
    }

    debug!("left recursion elimination performed {} rewrite(s):\n{}", rewrites, self);
    rewrites
  }

  fn substitute_leading(&mut self, head: &str, index: usize) -> usize {
    let mut count = 0;

    loop {
      let target = self.productions_of(head).iter()
        .enumerate()
        .find_map(|(k, prod)| {
          let lead = prod.leading_nonterminal()?;
          let j = self.index_of(lead)?;
          (j < index && lead != head && self.left_reaches(lead, head, None)).then(|| k)
        });
      let k = match target {
        Some(k) => k,
        None => break,
      };

      let prod = self.productions_of(head)[k].clone();
      let replacement = self.productions_of(&prod.body[0].name).iter()
        .map(|alt| {
          let body = alt.body.iter().chain(&prod.body[1..]).cloned().collect();
          Production::new(head, body, prod.code.clone())
        })
        .collect::<Vec<_>>();

      if let Some(prods) = self.rules_mut().get_mut(head) {
        prods.splice(k..k + 1, replacement);
        dedup(prods);
      }
      count += 1;
    }

    count
  }

  fn eliminate_direct(&mut self, head: &str) -> bool {
    let (recursive, others): (Vec<_>, Vec<_>) = self.productions_of(head).iter()
      .cloned()
      .partition(|prod| prod.leading_nonterminal() == Some(head));
    if recursive.is_empty() {
      return false;
    }
    if others.is_empty() {
      warn!("cannot remove left recursion from `{}`: every alternative is left-recursive", head);
      return false;
    }

    let recursive = recursive.into_iter()
      .filter(|prod| prod.body.len() > 1)
      .collect::<Vec<_>>();
    if recursive.is_empty() {
      if let Some(prods) = self.rules_mut().get_mut(head) {
        *prods = others;
      }
      return true;
    }

    let prime = self.fresh_name(head);
    let prime_sym = Symbol::nonterminal(prime.clone());

    let heads = others.into_iter()
      .map(|prod| {
        let mut body = prod.body;
        body.push(prime_sym.clone());
        Production::new(head, body, prod.code)
      })
      .collect();

    let mut tails = recursive.into_iter()
      .map(|prod| {
        let mut body = prod.body[1..].to_vec();
        body.push(prime_sym.clone());
        Production::new(prime.clone(), body, prod.code)
      })
      .collect::<Vec<_>>();
    tails.push(Production::new(prime.clone(), vec![], None));

    if let Some(prods) = self.rules_mut().get_mut(head) {
      *prods = heads;
    }
    self.rules_mut().insert(prime, tails);
    true
  }

  /// `head` followed by as many primes as needed to get an unused name.
  fn fresh_name(&self, head: &str) -> String {
    let mut name = format!("{}'", head);
    while self.uses_name(&name) {
      name.push('\'');
    }
    name
  }

  fn uses_name(&self, name: &str) -> bool {
    self.rules().contains_key(name)
      || self.productions().any(|prod| prod.body.iter().any(|sym| sym.name == name))
  }
}

fn dedup(prods: &mut Vec<Production>) {
  let mut seen = Vec::with_capacity(prods.len());
  prods.retain(|prod| {
    if seen.contains(prod) {
      false
    } else {
      seen.push(prod.clone());
      true
    }
  });
}

#[cfg(test)]
mod tests {
  use crate::rule::*;
  use crate::testing::recognizes;
  use crate::Grammar;
  use pretty_assertions::assert_eq;

  fn expression() -> Grammar {
    grammar(&["+", "*", "(", ")", "id"], "E", &[
      ("E", seq([sym("E"), sym("+"), sym("T")]) | sym("T")),
      ("T", seq([sym("T"), sym("*"), sym("F")]) | sym("F")),
      ("F", seq([sym("("), sym("E"), sym(")")]) | sym("id")),
    ])
  }

  fn indirect() -> Grammar {
    grammar(&["a", "b", "c", "d"], "A", &[
      ("A", seq([sym("B"), sym("a")]) | sym("c")),
      ("B", seq([sym("A"), sym("b")]) | sym("d")),
    ])
  }

  #[test]
  fn direct() {
    let mut g = expression();
    assert_eq!(g.eliminate_left_recursion(), 2);
    assert_eq!(g.to_string(), "\
E -> T E';
T -> F T';
F -> ( E ) | id;
E' -> + T E' | ε;
T' -> * F T' | ε;");
    assert!(g.verify().is_empty());
  }

  #[test]
  fn indirect_through_substitution() {
    let mut g = indirect();
    assert_eq!(g.eliminate_left_recursion(), 2);
    assert_eq!(g.to_string(), "\
A -> B a | c;
B -> c b B' | d B';
B' -> a b B' | ε;");
    assert!(g.verify().is_empty());
  }

  #[test]
  fn fixed_point() {
    for mut g in vec![expression(), indirect()] {
      g.eliminate_left_recursion();
      let once = g.clone();
      assert_eq!(g.eliminate_left_recursion(), 0);
      assert_eq!(g, once);
    }
  }

  #[test]
  fn preserves_language() {
    let samples: &[&[&str]] = &[
      &["id"],
      &["id", "+", "id"],
      &["id", "*", "id", "+", "id"],
      &["(", "id", "+", "id", ")", "*", "id"],
      &["id", "+"],
      &["+", "id"],
      &["id", "id"],
      &["(", "id"],
      &[],
    ];
    let before = expression();
    let mut after = before.clone();
    after.eliminate_left_recursion();
    for input in samples {
      assert_eq!(recognizes(&before, input), recognizes(&after, input), "{:?}", input);
    }

    let samples: &[&[&str]] = &[
      &["c"],
      &["d", "a"],
      &["c", "b", "a"],
      &["d", "a", "b", "a"],
      &["c", "b"],
      &["a"],
      &["d"],
      &[],
    ];
    let before = indirect();
    let mut after = before.clone();
    after.eliminate_left_recursion();
    for input in samples {
      assert_eq!(recognizes(&before, input), recognizes(&after, input), "{:?}", input);
    }
  }

  #[test]
  fn self_loops_are_dropped() {
    let mut g = grammar(&["x"], "A", &[
      ("A", sym("A") | sym("x")),
    ]);
    assert_eq!(g.eliminate_left_recursion(), 1);
    assert_eq!(g.to_string(), "A -> x;");
  }

  #[test]
  fn nullable_alternatives_terminate() {
    let mut g = grammar(&["a"], "S", &[
      ("S", seq([sym("S"), sym("S")]) | sym("a") | eps()),
    ]);
    assert_eq!(g.eliminate_left_recursion(), 1);
    assert_eq!(g.to_string(), "\
S -> a S' | S';
S' -> S S' | ε;");

    let mut g = grammar(&["a"], "S", &[
      ("S", seq([sym("S"), sym("A")]) | eps()),
      ("A", seq([sym("S"), sym("A")]) | sym("a")),
    ]);
    assert_eq!(g.eliminate_left_recursion(), 2);
    assert_eq!(g.to_string(), "\
S -> S';
A -> S' A | a;
S' -> A S' | ε;");
  }

  #[test]
  fn unresolvable() {
    let mut g = grammar(&["x"], "A", &[
      ("A", seq([sym("A"), sym("x")])),
    ]);
    assert_eq!(g.eliminate_left_recursion(), 0);
    assert!(!g.verify().is_empty());
  }
}
