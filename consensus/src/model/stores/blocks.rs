use crate::{
    errors::{TreeError, TreeResult},
    model::block::{Block, BlockId, BlockIndex},
};
use std::collections::HashMap;

/// Reader API for `BlockStore`.
pub trait BlockStoreReader {
    fn has(&self, id: BlockId) -> bool;
    /// Resolves `id` to the arena slot currently bound to it
    fn get_index(&self, id: BlockId) -> Option<BlockIndex>;
    /// Returns the block at `index`. Indices are only handed out by the store itself,
    /// so an out of range index is a logic error and panics.
    fn get(&self, index: BlockIndex) -> &Block;
    /// Returns the number of arena slots, displaced blocks included
    fn count(&self) -> usize;
}

/// Write API for `BlockStore`. Blocks are append-only; the leader link is the
/// only field which may change after insertion.
pub trait BlockStore: BlockStoreReader {
    /// Seeds an empty store with the origin block
    fn init(&mut self, origin: BlockId) -> BlockIndex;
    /// Appends a new block bound to `id`. Fails if `id` is already bound.
    fn insert(&mut self, id: BlockId, parent: BlockIndex) -> TreeResult<BlockIndex>;
    /// Appends a new block and re-binds `id` to it, returning the previously bound slot if any
    fn insert_or_replace(&mut self, id: BlockId, parent: BlockIndex) -> (BlockIndex, Option<BlockIndex>);
    fn set_leader(&mut self, index: BlockIndex, leader: BlockIndex);
}

/// Arena implementation of `BlockStore`: blocks in a `Vec`, ids resolved through a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockStore {
    blocks: Vec<Block>,
    indices: HashMap<BlockId, BlockIndex>,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { blocks: Vec::with_capacity(capacity), indices: HashMap::with_capacity(capacity) }
    }

    fn next_index(&self) -> BlockIndex {
        BlockIndex::new(self.blocks.len())
    }

    fn push_child(&mut self, id: BlockId, parent: BlockIndex) -> BlockIndex {
        let index = self.next_index();
        let parent_depth = self.get(parent).depth();
        self.blocks.push(Block::new(id, index, parent, parent_depth));
        index
    }
}

impl BlockStore for MemoryBlockStore {
    fn init(&mut self, origin: BlockId) -> BlockIndex {
        debug_assert!(self.blocks.is_empty());
        let index = self.next_index();
        self.blocks.push(Block::origin(origin, index));
        self.indices.insert(origin, index);
        index
    }

    fn insert(&mut self, id: BlockId, parent: BlockIndex) -> TreeResult<BlockIndex> {
        if self.indices.contains_key(&id) {
            return Err(TreeError::BlockAlreadyExists(id));
        }
        let index = self.push_child(id, parent);
        self.indices.insert(id, index);
        Ok(index)
    }

    fn insert_or_replace(&mut self, id: BlockId, parent: BlockIndex) -> (BlockIndex, Option<BlockIndex>) {
        let index = self.push_child(id, parent);
        let displaced = self.indices.insert(id, index);
        (index, displaced)
    }

    fn set_leader(&mut self, index: BlockIndex, leader: BlockIndex) {
        self.blocks[index.as_usize()].set_leader(leader);
    }
}

impl BlockStoreReader for MemoryBlockStore {
    fn has(&self, id: BlockId) -> bool {
        self.indices.contains_key(&id)
    }

    fn get_index(&self, id: BlockId) -> Option<BlockIndex> {
        self.indices.get(&id).copied()
    }

    fn get(&self, index: BlockIndex) -> &Block {
        &self.blocks[index.as_usize()]
    }

    fn count(&self) -> usize {
        self.blocks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_basics() {
        let mut store: Box<dyn BlockStore> = Box::new(MemoryBlockStore::new());
        let origin = store.init(0);
        let child = store.insert(7, origin).unwrap();
        assert!(store.has(7));
        assert_eq!(store.get_index(7), Some(child));
        assert_eq!(store.get(child).depth(), 1);
        assert_eq!(store.get(child).parent_index(), Some(origin));
        assert_eq!(store.count(), 2);

        store.set_leader(origin, child);
        assert_eq!(store.get(origin).leader_index(), child);
    }

    #[test]
    fn test_store_rejects_duplicates() {
        let mut store = MemoryBlockStore::new();
        let origin = store.init(0);
        store.insert(1, origin).unwrap();
        assert_eq!(store.insert(1, origin), Err(TreeError::BlockAlreadyExists(1)));
        assert_eq!(store.insert(0, origin), Err(TreeError::BlockAlreadyExists(0)));
        assert_eq!(store.count(), 2);

        // Rejected inserts leave no slot behind
        let child = store.insert(2, BlockIndex::new(1)).unwrap();
        assert_eq!(child, BlockIndex::new(2));
        assert_eq!(store.get(child).depth(), 2);
        assert_eq!(store.get_index(2), Some(child));
    }

    #[test]
    fn test_store_replace_keeps_displaced_block() {
        let mut store = MemoryBlockStore::new();
        let origin = store.init(0);
        let first = store.insert(1, origin).unwrap();
        let grandchild = store.insert(2, first).unwrap();

        let (second, displaced) = store.insert_or_replace(1, grandchild);
        assert_eq!(displaced, Some(first));
        assert_eq!(store.get_index(1), Some(second));
        assert_eq!(store.get(second).depth(), 3);
        // The old slot is still alive and still parents block 2
        assert_eq!(store.get(grandchild).parent_index(), Some(first));
        assert_eq!(store.get(first).id(), 1);
        assert_eq!(store.count(), 4);

        let (fresh, displaced) = store.insert_or_replace(9, origin);
        assert_eq!(displaced, None);
        assert_eq!(store.get_index(9), Some(fresh));
    }
}
