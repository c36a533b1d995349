use log::trace;
use thiserror::Error;
use crate::symbols::SymbolId;
use crate::table::{Action, ParsingTable};

mod node;

use node::ParseNode;

/// Semantic actions run when a production completes.
pub trait Semantics {
  /// Payload of tokens and of completed nonterminals.
  type Value;

  /// Called with the values of the children of `action`'s production, in
  /// body order. An error aborts the parse.
  fn reduce(
    &mut self,
    action: &Action,
    children: Vec<Self::Value>,
  ) -> Result<Self::Value, String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("expected `{expected}`, found `{found}`")]
  Mismatch {
    expected: String,
    found: String,
  },
  /// Empty table cell.
  #[error("syntax error: unexpected `{found}` while parsing `{nonterminal}`")]
  Syntax {
    nonterminal: String,
    found: String,
  },
  #[error("unexpected end of input, expected `{expected}`")]
  UnexpectedEnd {
    expected: String,
  },
  #[error("extra input `{found}` after a complete parse")]
  ExtraInput {
    found: String,
  },
  #[error("unknown token id {0}")]
  UnknownToken(i32),
  /// A completed node refers to an action missing from the table.
  #[error("no action with id {0}")]
  UnknownAction(u32),
  #[error("action of `{production}` failed: {message}")]
  Action {
    production: String,
    message: String,
  },
  /// The parse is over, successfully or not, and the parser was not reset.
  #[error("parser is halted")]
  Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
  Running,
  Accepted,
  Failed,
}

/// Consumes one token per `feed` call. Many parsers may share one table;
/// each owns its stack.
pub struct Parser<'t, S: Semantics> {
  table: &'t ParsingTable,
  semantics: S,
  stack: Vec<ParseNode<S::Value>>,
  result: Option<S::Value>,
  state: State,
}

impl<'t, S: Semantics> Parser<'t, S> {
  pub fn new(table: &'t ParsingTable, semantics: S) -> Self {
    let mut parser = Parser {
      table,
      semantics,
      stack: vec![],
      result: None,
      state: State::Running,
    };
    parser.reset();
    parser
  }

  /// Drops any partial parse and starts over from the start symbol.
  pub fn reset(&mut self) {
    self.stack.clear();
    self.stack.push(ParseNode::new(self.table.start(), None));
    self.result = None;
    self.state = State::Running;
  }

  /// Processes one token. The end of input is `SymbolId::EOF`, whose value
  /// is dropped. Any error halts the parser until `reset`.
  pub fn feed(&mut self, token: SymbolId, value: S::Value) -> Result<(), ParseError> {
    if self.state != State::Running {
      return Err(ParseError::Halted);
    }

    let result = self.step(token, value);
    if let Err(err) = &result {
      trace!("parse failed: {}", err);
      self.state = State::Failed;
      self.stack.clear();
      self.result = None;
    }
    result
  }

  fn step(&mut self, token: SymbolId, value: S::Value) -> Result<(), ParseError> {
    let table = self.table;
    match token.column() {
      Some(column) if column < table.column_count() => {}
      _ => return Err(ParseError::UnknownToken(token.0)),
    }

    loop {
      self.reduce_completed()?;

      let top = match self.stack.len() {
        0 if token == SymbolId::EOF => {
          trace!("accept");
          self.state = State::Accepted;
          return Ok(());
        }
        0 => {
          return Err(ParseError::ExtraInput {
            found: self.name(token),
          });
        }
        len => len - 1,
      };
      let symbol = self.stack[top].symbol;

      if symbol.is_terminal() {
        if symbol != token {
          return Err(if token == SymbolId::EOF {
            ParseError::UnexpectedEnd {
              expected: self.name(symbol),
            }
          } else {
            ParseError::Mismatch {
              expected: self.name(symbol),
              found: self.name(token),
            }
          });
        }
        trace!("shift {}", self.name(token));
        let parent = self.stack.pop().and_then(|node| node.parent);
        self.attach(parent, value);
        return Ok(());
      }

      let (id, action) = match table.lookup(symbol, token) {
        Some(entry) => entry,
        None if token == SymbolId::EOF => {
          return Err(ParseError::UnexpectedEnd {
            expected: self.name(symbol),
          });
        }
        None => {
          return Err(ParseError::Syntax {
            nonterminal: self.name(symbol),
            found: self.name(token),
          });
        }
      };
      trace!("expand {} on {}", action.production(), self.name(token));
      self.stack[top].expand(id, action.body().len());
      for &child in action.body().iter().rev() {
        self.stack.push(ParseNode::new(child, Some(top)));
      }
    }
  }

  /// Pops and reduces every completed node on top of the stack.
  fn reduce_completed(&mut self) -> Result<(), ParseError> {
    let table = self.table;
    while self.stack.last().map_or(false, |node| node.is_complete()) {
      let node = match self.stack.pop() {
        Some(node) => node,
        None => break,
      };
      let action = table.action(node.action)
        .ok_or(ParseError::UnknownAction(node.action))?;
      trace!("reduce {}", action.production());
      let value = self.semantics.reduce(action, node.children)
        .map_err(|message| ParseError::Action {
          production: action.production().to_owned(),
          message,
        })?;
      self.attach(node.parent, value);
    }
    Ok(())
  }

  fn attach(&mut self, parent: Option<usize>, value: S::Value) {
    match parent.and_then(|ix| self.stack.get_mut(ix)) {
      Some(node) => node.children.push(value),
      None => self.result = Some(value),
    }
  }

  fn name(&self, id: SymbolId) -> String {
    self.table.symbols().describe(id)
  }

  pub fn succeeded(&self) -> bool {
    self.state == State::Accepted
  }

  /// The value of the start symbol, once the input has been accepted.
  pub fn result(&self) -> Option<&S::Value> {
    if self.succeeded() {
      self.result.as_ref()
    } else {
      None
    }
  }

  pub fn take_result(&mut self) -> Option<S::Value> {
    if self.succeeded() {
      self.result.take()
    } else {
      None
    }
  }

  pub fn semantics(&self) -> &S {
    &self.semantics
  }

  pub fn semantics_mut(&mut self) -> &mut S {
    &mut self.semantics
  }

  pub fn table(&self) -> &'t ParsingTable {
    self.table
  }
}
