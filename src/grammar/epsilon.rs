use std::collections::HashSet;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use super::{Grammar, Production, Symbol};

impl Grammar {
  /// Replaces every production by the variants obtained by keeping or
  /// dropping each nullable nonterminal of its body. Empty bodies are
  /// dropped, except one for the start symbol if it derives the empty
  /// string. Nonterminals left without productions disappear along with
  /// their occurrences.
  ///
  /// Returns the number of nonterminals whose productions changed.
  pub fn eliminate_epsilon_productions(&mut self) -> usize {
    let nullable = self.nullable();
    let keep_start_empty = nullable.contains(&self.start);

    let mut rules = IndexMap::new();
    for (head, prods) in self.rules() {
      let mut new_prods = vec![];
      let mut kept_empty = false;
      for prod in prods {
        for body in expand(&prod.body, &nullable) {
          if body.is_empty() {
            if *head != self.start || !keep_start_empty || kept_empty {
              continue;
            }
            kept_empty = true;
          }
          let new_prod = Production::new(head.clone(), body, prod.code.clone());
          if !new_prods.contains(&new_prod) {
            new_prods.push(new_prod);
          }
        }
      }
      rules.insert(head.clone(), new_prods);
    }

    loop {
      let dead = rules.iter()
        .filter(|(head, prods)| prods.is_empty() && **head != self.start)
        .map(|(head, _)| head.clone())
        .collect::<HashSet<_>>();
      if dead.is_empty() {
        break;
      }
      rules.retain(|head, _| !dead.contains(head));
      for prods in rules.values_mut() {
        prods.retain(|prod| {
          !prod.body.iter().any(|sym| !sym.is_terminal && dead.contains(&sym.name))
        });
      }
    }

    let changed = self.rules().iter()
      .filter(|(head, prods)| rules.get(*head) != Some(*prods))
      .count();

    *self.rules_mut() = rules;
    debug!("epsilon elimination rewrote {} nonterminal(s):\n{}", changed, self);
    changed
  }
}

/// All bodies obtained by independently keeping or dropping each nullable
/// nonterminal, the full body first.
fn expand(body: &[Symbol], nullable: &IndexSet<String>) -> Vec<Vec<Symbol>> {
  let mut bodies = vec![vec![]];
  for sym in body {
    let optional = !sym.is_terminal && nullable.contains(&sym.name);
    let without = if optional { bodies.clone() } else { vec![] };
    for body in &mut bodies {
      body.push(sym.clone());
    }
    bodies.extend(without);
  }
  bodies
}
