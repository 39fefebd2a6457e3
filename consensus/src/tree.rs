use crate::{
    config::TreeConfig,
    errors::{TreeError, TreeResult},
    model::{
        ORIGIN, ORIGIN_INDEX,
        block::{Block, BlockId, BlockIndex},
        stores::blocks::{BlockStore, BlockStoreReader, MemoryBlockStore},
    },
    processes::{
        chain::{ParentChainIterator, leader_chain},
        leader::add_tree_block,
    },
};
use kchain_core::debug;
use std::iter::Take;

/// An append-only tree of blocks which tracks, for every block, the deepest block of its
/// subtree (its leader).
///
/// The tree is seeded with the origin block (id [`ORIGIN`], depth 0). Every other block is
/// added through [`BlockTree::insert`], under a parent which is already in the tree.
#[derive(Debug, Clone)]
pub struct BlockTree {
    store: MemoryBlockStore,
    config: TreeConfig,
}

impl BlockTree {
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    pub fn with_config(config: TreeConfig) -> Self {
        let mut store = MemoryBlockStore::with_capacity(config.initial_capacity.max(1));
        let origin = store.init(ORIGIN);
        debug_assert_eq!(origin, ORIGIN_INDEX);
        Self { store, config }
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Inserts block `id` under `parent` and updates the leaders along its ancestor chain.
    ///
    /// Fails with [`TreeError::UnknownParent`] if `parent` is not in the tree, or with
    /// [`TreeError::BlockAlreadyExists`] if `id` is taken and duplicates are rejected.
    /// The tree is left unchanged on failure.
    pub fn insert(&mut self, id: BlockId, parent: BlockId) -> TreeResult<&Block> {
        let index = self
            .store
            .get_index(parent)
            .ok_or(TreeError::UnknownParent(parent))
            .and_then(|parent| add_tree_block(&mut self.store, id, parent, self.config.duplicate_policy))
            .inspect_err(|err| debug!("Rejected block {}: {}", id, err))?;
        Ok(self.store.get(index))
    }

    /// Returns the current leader of `id`'s subtree, which is `id` itself when nothing
    /// deeper was inserted below it.
    pub fn leader(&self, id: BlockId) -> TreeResult<&Block> {
        let index = self.get_index(id)?;
        Ok(self.store.get(self.store.get(index).leader_index()))
    }

    /// Returns the leader of the whole tree
    pub fn tip(&self) -> &Block {
        self.leader_of(self.root())
    }

    /// Returns up to `max` blocks of the chain ending at the leader of `id`'s subtree,
    /// leader first and walking towards the origin.
    pub fn chain(&self, id: BlockId, max: usize) -> TreeResult<Take<ParentChainIterator<'_>>> {
        let index = self.get_index(id)?;
        Ok(leader_chain(&self.store, index, max))
    }

    /// Iterates `id` and then all of its ancestors up to the origin
    pub fn ancestors(&self, id: BlockId) -> TreeResult<ParentChainIterator<'_>> {
        let index = self.get_index(id)?;
        Ok(ParentChainIterator::new(&self.store, index))
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.store.get_index(id).map(|index| self.store.get(index))
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.store.has(id)
    }

    pub fn root(&self) -> &Block {
        self.store.get(ORIGIN_INDEX)
    }

    pub fn parent(&self, block: &Block) -> Option<&Block> {
        block.parent_index().map(|index| self.store.get(index))
    }

    pub fn leader_of(&self, block: &Block) -> &Block {
        self.store.get(block.leader_index())
    }

    /// Returns the block stored at arena slot `index`
    pub fn block_at(&self, index: BlockIndex) -> &Block {
        self.store.get(index)
    }

    /// Number of blocks held by the tree, origin included. Blocks displaced under
    /// [`DuplicatePolicy::Replace`](crate::config::DuplicatePolicy::Replace) are still counted.
    pub fn block_count(&self) -> usize {
        self.store.count()
    }

    fn get_index(&self, id: BlockId) -> TreeResult<BlockIndex> {
        self.store.get_index(id).ok_or(TreeError::UnknownBlock(id))
    }
}

impl Default for BlockTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DuplicatePolicy, test_helpers::TreeBuilder};
    use itertools::Itertools;

    fn leader_pair(tree: &BlockTree, id: BlockId) -> (BlockId, u64) {
        let leader = tree.leader(id).unwrap();
        (leader.id(), leader.depth())
    }

    fn chain_ids(tree: &BlockTree, id: BlockId, max: usize) -> Vec<BlockId> {
        tree.chain(id, max).unwrap().map(|block| block.id()).collect_vec()
    }

    #[test]
    fn test_new_tree() {
        let tree = BlockTree::new();
        let root = tree.root();
        assert_eq!(root.id(), ORIGIN);
        assert_eq!(root.depth(), 0);
        assert!(root.is_origin());
        assert!(tree.parent(root).is_none());
        assert_eq!(tree.tip(), root);
        assert_eq!(leader_pair(&tree, ORIGIN), (0, 0));
        assert_eq!(tree.block_count(), 1);
    }

    #[test]
    fn test_scenarios() {
        let mut tree = BlockTree::new();

        // Single child
        assert_eq!(tree.insert(1, 0).unwrap().depth(), 1);
        assert_eq!(leader_pair(&tree, 1), (1, 1));
        assert_eq!(leader_pair(&tree, 0), (1, 1));

        // Ties keep the first block to reach the depth
        assert_eq!(tree.insert(2, 1).unwrap().depth(), 2);
        assert_eq!(tree.insert(3, 1).unwrap().depth(), 2);
        assert_eq!(leader_pair(&tree, 0), (2, 2));

        // A deeper block moves leaders only along its own ancestor chain
        assert_eq!(tree.insert(4, 3).unwrap().depth(), 3);
        assert_eq!(leader_pair(&tree, 0), (4, 3));
        assert_eq!(leader_pair(&tree, 1), (4, 3));
        assert_eq!(leader_pair(&tree, 2), (2, 2));
        assert_eq!(leader_pair(&tree, 3), (4, 3));

        assert_eq!(chain_ids(&tree, 0, 2), vec![4, 3]);
        assert_eq!(chain_ids(&tree, 0, 10), vec![4, 3, 1, 0]);

        assert_eq!(tree.leader(99), Err(TreeError::UnknownBlock(99)));

        assert_eq!(tree.insert(5, 99), Err(TreeError::UnknownParent(99)));
        assert!(!tree.contains(5));
        assert_eq!(leader_pair(&tree, 0), (4, 3));
        assert_eq!(tree.block_count(), 5);
    }

    #[test]
    fn test_out_of_order_ids() {
        let mut tree = BlockTree::new();
        TreeBuilder::new(&mut tree).add_block(900, 0).add_block(17, 900).add_block(3, 0).add_block(42, 3).add_block(8, 42);
        assert_eq!(leader_pair(&tree, 0), (8, 3));
        assert_eq!(leader_pair(&tree, 900), (17, 2));
        assert_eq!(tree.ancestors(8).unwrap().map(|block| block.id()).collect_vec(), vec![8, 42, 3, 0]);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut tree = BlockTree::new();
        TreeBuilder::new(&mut tree).add_chain(0, 1..=5).add_block(10, 2).add_block(11, 10);
        let leader = leader_pair(&tree, 2);
        let chain = chain_ids(&tree, 2, 3);
        for _ in 0..3 {
            assert_eq!(leader_pair(&tree, 2), leader);
            assert_eq!(chain_ids(&tree, 2, 3), chain);
        }
    }

    #[test]
    fn test_chain_errors_and_bounds() {
        let mut tree = BlockTree::new();
        TreeBuilder::new(&mut tree).add_chain(0, 1..=3);
        assert!(matches!(tree.chain(7, 2), Err(TreeError::UnknownBlock(7))));
        assert!(tree.chain(0, 0).unwrap().next().is_none());
        assert_eq!(chain_ids(&tree, 3, 5), vec![3, 2, 1, 0]);
        assert!(tree.ancestors(7).is_err());
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut tree = BlockTree::new();
        assert_eq!(tree.config().duplicate_policy, DuplicatePolicy::Reject);
        tree.insert(1, 0).unwrap();
        tree.insert(2, 1).unwrap();
        assert_eq!(tree.insert(2, 0), Err(TreeError::BlockAlreadyExists(2)));
        assert!(!tree.insert(2, 0).unwrap_err().is_unknown_reference());
        assert!(tree.insert(3, 9).unwrap_err().is_unknown_reference());
        assert!(tree.leader(9).unwrap_err().is_unknown_reference());
        assert_eq!(tree.insert(0, 2), Err(TreeError::BlockAlreadyExists(0)));
        assert_eq!(tree.get(2).unwrap().depth(), 2);
        assert_eq!(tree.block_count(), 3);
    }

    #[test]
    fn test_duplicate_replace_policy() {
        let mut tree = BlockTree::with_config(TreeConfig::default().with_duplicate_policy(DuplicatePolicy::Replace));
        assert_eq!(tree.config().duplicate_policy, DuplicatePolicy::Replace);
        tree.insert(1, 0).unwrap();
        tree.insert(2, 1).unwrap();

        // Re-binding 1 under 2 creates a depth-3 block; the old block 1 still parents block 2
        assert_eq!(tree.insert(1, 2).unwrap().depth(), 3);
        assert_eq!(tree.get(1).unwrap().depth(), 3);
        assert_eq!(leader_pair(&tree, 0), (1, 3));
        assert_eq!(chain_ids(&tree, 0, 10), vec![1, 2, 1, 0]);
        assert_eq!(tree.block_count(), 4);

        // Re-binding the origin id leaves the actual root in place
        assert_eq!(tree.insert(0, 0).unwrap().depth(), 1);
        assert_eq!(tree.root().depth(), 0);
        assert_eq!(tree.get(0).unwrap().depth(), 1);
    }
}
