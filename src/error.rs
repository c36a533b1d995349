use thiserror::Error;
use crate::grammar::VerificationError;
use crate::table::Conflict;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("grammar verification failed:\n{}", join_lines(.0))]
  Verification(Vec<VerificationError>),
  /// FIRST computation re-entered a nonterminal; the path ends where it began.
  #[error("grammar cycle: {}", .0.join(" -> "))]
  Cycle(Vec<String>),
  #[error("grammar is not LL(1):\n{}", join_lines(.0))]
  Conflicts(Vec<Conflict>),
  /// The symbol mapping was built from a different grammar.
  #[error("symbol `{0}` is not in the symbol mapping")]
  UnknownSymbol(String),
}

fn join_lines<T: ToString>(items: &[T]) -> String {
  items.iter()
    .map(|item| item.to_string())
    .collect::<Vec<_>>()
    .join("\n")
}
