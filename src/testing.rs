use std::collections::HashSet;
use crate::grammar::Grammar;

/// Whether `grammar` derives `input`, by brute force: a fixpoint over the
/// spans `(nonterminal, i, j)` such that the nonterminal derives
/// `input[i..j]`. Works for any grammar, left-recursive or not.
pub(crate) fn recognizes(grammar: &Grammar, input: &[&str]) -> bool {
  let n = input.len();
  let mut derived = HashSet::<(String, usize, usize)>::new();

  loop {
    let mut changed = false;
    for prod in grammar.productions() {
      for i in 0..=n {
        // positions reachable after matching a prefix of the body from `i`
        let mut ends = vec![i];
        for sym in &prod.body {
          let mut next = vec![];
          for &k in &ends {
            if sym.is_terminal {
              if k < n && input[k] == sym.name {
                next.push(k + 1);
              }
            } else {
              next.extend((k..=n).filter(|&j| derived.contains(&(sym.name.clone(), k, j))));
            }
          }
          next.sort_unstable();
          next.dedup();
          ends = next;
        }
        for j in ends {
          changed |= derived.insert((prod.head.clone(), i, j));
        }
      }
    }
    if !changed {
      break;
    }
  }

  derived.contains(&(grammar.start().to_owned(), 0, n))
}
