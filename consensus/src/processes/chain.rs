//!
//! Read-only traversals along `parent` links
//!
use crate::model::{
    block::{Block, BlockIndex},
    stores::blocks::BlockStoreReader,
};
use std::iter::FusedIterator;

/// Walks from a starting block up through its ancestors, yielding the starting block
/// first and the origin last.
pub struct ParentChainIterator<'a> {
    store: &'a dyn BlockStoreReader,
    current: Option<BlockIndex>,
}

impl<'a> ParentChainIterator<'a> {
    pub fn new(store: &'a dyn BlockStoreReader, start: BlockIndex) -> Self {
        Self { store, current: Some(start) }
    }
}

impl<'a> Iterator for ParentChainIterator<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.store.get(self.current?);
        self.current = block.parent_index();
        Some(block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.current {
            // Depth counts edges, so the chain holds depth + 1 blocks
            Some(index) => {
                let remaining = self.store.get(index).depth() as usize + 1;
                (remaining, Some(remaining))
            }
            None => (0, Some(0)),
        }
    }
}

impl FusedIterator for ParentChainIterator<'_> {}
impl ExactSizeIterator for ParentChainIterator<'_> {}

/// Returns the chain led by the leader of `block`'s subtree: the leader itself followed by
/// its ancestors, truncated to at most `max` blocks.
pub fn leader_chain(store: &dyn BlockStoreReader, block: BlockIndex, max: usize) -> std::iter::Take<ParentChainIterator<'_>> {
    ParentChainIterator::new(store, store.get(block).leader_index()).take(max)
}
