use crate::sets::TermSet;
use crate::symbols::{SymbolId, SymbolMapping};
use crate::table::Conflict;
use crate::Generated;

/// Renders the grammar, its FIRST and FOLLOW sets, and the filled table
/// cells, nonterminals in grammar order.
pub fn render(generated: &Generated) -> String {
  let Generated { grammar, sets, table } = generated;
  let symbols = table.symbols();

  let mut lines = vec![
    "Grammar:".to_owned(),
    String::new(),
    grammar.to_string(),
    String::new(),
    "First sets:".to_owned(),
  ];
  for (nt, set) in sets.firsts() {
    lines.push(format!("FIRST({}) = {}", nt, members(set, symbols)));
  }

  lines.push(String::new());
  lines.push("Follow sets:".to_owned());
  for (nt, set) in sets.follows() {
    lines.push(format!("FOLLOW({}) = {}", nt, members(set, symbols)));
  }

  lines.push(String::new());
  lines.push("Table:".to_owned());
  for nt in grammar.nonterminals() {
    let id = match symbols.id(nt) {
      Some(id) => id,
      None => continue,
    };
    for column in 0..table.column_count() {
      let t = SymbolId(column as i32);
      if let Some(action) = table.get(id, t) {
        lines.push(format!("M[{}, {}] = {}", nt, symbols.describe(t), action.production()));
      }
    }
  }

  lines.join("\n")
}

pub fn render_conflicts(conflicts: &[Conflict]) -> String {
  conflicts.iter()
    .map(|conflict| format!("Conflict: {}", conflict))
    .collect::<Vec<_>>()
    .join("\n")
}

fn members(set: &TermSet, symbols: &SymbolMapping) -> String {
  format!("{{{}}}", set.names(symbols).join(", "))
}
