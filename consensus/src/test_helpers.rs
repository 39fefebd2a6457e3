//!
//! Test utils for block trees
//!
use crate::{
    model::block::{BlockId, BlockIndex},
    tree::BlockTree,
};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;

/// A struct with fluent API to streamline tree building
pub struct TreeBuilder<'a> {
    tree: &'a mut BlockTree,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(tree: &'a mut BlockTree) -> Self {
        Self { tree }
    }

    pub fn add_block(&mut self, id: BlockId, parent: BlockId) -> &mut Self {
        self.tree.insert(id, parent).unwrap();
        self
    }

    /// Adds `ids` as a chain hanging from `parent`, each block the child of the previous one
    pub fn add_chain(&mut self, parent: BlockId, ids: impl IntoIterator<Item = BlockId>) -> &mut Self {
        let mut parent = parent;
        for id in ids {
            self.add_block(id, parent);
            parent = id;
        }
        self
    }
}

#[derive(Error, Debug)]
pub enum TestError {
    #[error("origin block {0} is expected at depth 0 without a parent")]
    BadOrigin(BlockIndex),

    #[error("block {block} has depth {depth} under a parent at depth {parent_depth}")]
    BadDepth { block: BlockIndex, depth: u64, parent_depth: u64 },

    #[error("block {block} is led by {actual} but the deepest first-inserted descendant is {expected}")]
    WrongLeader { block: BlockIndex, expected: BlockIndex, actual: BlockIndex },
}

/// Checks every block of `tree` against a brute-force recomputation: depths must follow
/// parent links, and each leader must be the deepest block of its subtree with ties going
/// to the earliest arena slot (i.e. the first inserted).
pub fn validate_tree(tree: &BlockTree) -> std::result::Result<(), TestError> {
    let mut best = HashMap::<BlockIndex, BlockIndex>::new();

    for slot in 0..tree.block_count() {
        let index = BlockIndex::new(slot);
        let block = tree.block_at(index);

        match tree.parent(block) {
            Some(parent) if parent.depth() + 1 != block.depth() => {
                return Err(TestError::BadDepth { block: index, depth: block.depth(), parent_depth: parent.depth() });
            }
            None if slot != 0 || block.depth() != 0 => return Err(TestError::BadOrigin(index)),
            _ => {}
        }

        // Slots are visited in insertion order, so only strictly deeper blocks take over
        let mut current = Some(index);
        while let Some(ancestor) = current {
            let entry = best.entry(ancestor).or_insert(index);
            if tree.block_at(*entry).depth() < block.depth() {
                *entry = index;
            }
            current = tree.block_at(ancestor).parent_index();
        }
    }

    for (block, expected) in best {
        let actual = tree.block_at(block).leader_index();
        if actual != expected {
            return Err(TestError::WrongLeader { block, expected, actual });
        }
    }
    Ok(())
}

/// Inserts `count` blocks with ids `1..=count`, each under a uniformly chosen earlier block.
/// `chain_bias` in `[0, 1]` is the probability to extend the most recent block instead,
/// which produces deeper trees with frequent leader changes.
pub fn generate_random_tree(rng: &mut impl Rng, count: u64, chain_bias: f64) -> BlockTree {
    let mut tree = BlockTree::new();
    for id in 1..=count {
        let parent = if rng.gen_bool(chain_bias) { id - 1 } else { rng.gen_range(0..id) };
        tree.insert(id, parent).unwrap();
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TreeError;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_random_trees_are_valid() {
        let mut rng = StdRng::seed_from_u64(22);
        for chain_bias in [0.0, 0.3, 0.9] {
            let tree = generate_random_tree(&mut rng, 500, chain_bias);
            validate_tree(&tree).unwrap();
            assert_eq!(tree.block_count(), 501);
        }
    }

    #[test]
    fn test_leader_depth_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = BlockTree::new();
        let mut last_depths = vec![0u64];
        for id in 1..=300u64 {
            tree.insert(id, rng.gen_range(0..id)).unwrap();
            last_depths.push(0);
            for (watched, last) in last_depths.iter_mut().enumerate() {
                let depth = tree.leader(watched as BlockId).unwrap().depth();
                assert!(depth >= *last, "leader depth of {watched} dropped from {last} to {depth}");
                *last = depth;
            }
        }
        validate_tree(&tree).unwrap();
    }

    #[test]
    fn test_validation_survives_rejected_inserts() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = generate_random_tree(&mut rng, 100, 0.5);
        let tip = tree.tip().id();
        for id in 101..150 {
            assert_eq!(tree.insert(id, 1_000 + id).map(|block| block.id()), Err(TreeError::UnknownParent(1_000 + id)));
        }
        assert_eq!(tree.tip().id(), tip);
        assert_eq!(tree.block_count(), 101);
        validate_tree(&tree).unwrap();
    }

    #[test]
    fn test_builder_chain() {
        let mut tree = BlockTree::new();
        TreeBuilder::new(&mut tree).add_chain(0, [5, 6, 7]).add_block(8, 5);
        assert_eq!(tree.tip().id(), 7);
        assert_eq!(tree.leader(5).unwrap().id(), 7);
        assert_eq!(tree.leader(8).unwrap().id(), 8);
        validate_tree(&tree).unwrap();
    }
}
