use std::fmt::{self, Debug, Formatter};
use crate::symbols::{SymbolId, SymbolMapping};

type BitBlock = u64;

const BLOCK_NBITS: usize = std::mem::size_of::<BitBlock>() * 8;

/// Rendering of the epsilon marker.
pub const EPSILON_NAME: &str = "ε";

/// A set of table columns (terminals plus the end of input, column 0),
/// with a separate epsilon marker.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TermSet {
  slice: Box<[BitBlock]>,
  epsilon: bool,
}

impl TermSet {
  pub fn new(num_columns: usize) -> Self {
    let len = (num_columns + BLOCK_NBITS - 1) / BLOCK_NBITS;
    Self {
      slice: vec![0; len].into_boxed_slice(),
      epsilon: false,
    }
  }

  pub fn insert(&mut self, column: usize) {
    self.slice[column / BLOCK_NBITS] |= 1 << (column % BLOCK_NBITS);
  }

  pub fn contains(&self, column: usize) -> bool {
    self.slice.get(column / BLOCK_NBITS)
      .map_or(false, |block| block & (1 << (column % BLOCK_NBITS)) != 0)
  }

  pub fn insert_epsilon(&mut self) {
    self.epsilon = true;
  }

  pub fn has_epsilon(&self) -> bool {
    self.epsilon
  }

  /// Adds the columns of `other`, leaving the epsilon marker alone.
  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &TermSet) -> bool {
    let mut changed = false;
    for (x, y) in self.slice.iter_mut().zip(other.slice.iter()) {
      let old = *x;
      *x |= *y;
      changed |= old != *x;
    }
    changed
  }

  /// Columns in increasing order.
  pub fn iter(&self) -> Iter {
    Iter {
      blocks: &self.slice,
      offset: 0,
      current: self.slice.first().copied().unwrap_or(0),
    }
  }

  /// Member names in column order, `$` first and `ε` last.
  pub fn names<'a>(&self, mapping: &'a SymbolMapping) -> Vec<&'a str> {
    let mut names = self.iter()
      .filter_map(|column| mapping.name(SymbolId(column as i32)))
      .collect::<Vec<_>>();
    if self.epsilon {
      names.push(EPSILON_NAME);
    }
    names
  }
}

pub struct Iter<'a> {
  /// blocks not yet loaded into `current`, plus the one that is
  blocks: &'a [BitBlock],
  /// column of bit 0 of `current`
  offset: usize,
  /// bits of the current block not yet yielded
  current: BitBlock,
}

impl<'a> Iterator for Iter<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    while self.current == 0 {
      self.blocks = self.blocks.get(1..).filter(|rest| !rest.is_empty())?;
      self.offset += BLOCK_NBITS;
      self.current = self.blocks[0];
    }
    let bit = self.current.trailing_zeros() as usize;
    self.current &= self.current - 1;
    Some(self.offset + bit)
  }
}

impl Debug for TermSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    let mut set = f.debug_set();
    set.entries(self.iter());
    if self.epsilon {
      set.entry(&EPSILON_NAME);
    }
    set.finish()
  }
}
