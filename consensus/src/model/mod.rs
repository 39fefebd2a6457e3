pub mod block;
pub mod stores;

use block::{BlockId, BlockIndex};

/// model::ORIGIN is the id of the synthetic root every tree is seeded with.
/// All blocks inserted into a tree are in its subtree.
pub const ORIGIN: BlockId = 0;

/// The root always occupies the first arena slot
pub const ORIGIN_INDEX: BlockIndex = BlockIndex::new(0);
