use crate::symbols::SymbolId;

/// One entry of the engine stack.
#[derive(Debug, Clone)]
pub(crate) struct ParseNode<V> {
  pub symbol: SymbolId,
  /// action the node was expanded with, 0 while unexpanded; always 0 for
  /// terminals
  pub action: u32,
  /// number of children the action produces
  pub arity: usize,
  /// stack index of the parent node, `None` for the root
  pub parent: Option<usize>,
  /// values of the completed children, in body order
  pub children: Vec<V>,
}

impl<V> ParseNode<V> {
  pub fn new(symbol: SymbolId, parent: Option<usize>) -> Self {
    ParseNode {
      symbol,
      action: 0,
      arity: 0,
      parent,
      children: vec![],
    }
  }

  pub fn expand(&mut self, action: u32, arity: usize) {
    self.action = action;
    self.arity = arity;
    self.children = Vec::with_capacity(arity);
  }

  pub fn is_complete(&self) -> bool {
    self.action != 0 && self.children.len() == self.arity
  }
}
