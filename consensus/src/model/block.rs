use std::fmt::Display;

/// Caller-assigned block identifier
pub type BlockId = u64;

/// Stable position of a block inside the tree arena.
///
/// Parent and leader links are stored as arena indices rather than ids, so a link keeps
/// pointing at the same block even if its id is later re-bound to another block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex(usize);

impl BlockIndex {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn as_usize(self) -> usize {
        self.0
    }
}

impl Display for BlockIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the block tree.
///
/// `id`, `depth` and `parent` are fixed at creation. Only the `leader` link changes,
/// and only through later insertions into this block's subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    id: BlockId,
    depth: u64,
    parent: Option<BlockIndex>,
    leader: BlockIndex,
}

impl Block {
    /// Creates a parentless block at depth 0 which leads itself
    pub(crate) fn origin(id: BlockId, index: BlockIndex) -> Self {
        Self { id, depth: 0, parent: None, leader: index }
    }

    /// Creates a block one level below `parent`. A fresh block is always its own leader.
    pub(crate) fn new(id: BlockId, index: BlockIndex, parent: BlockIndex, parent_depth: u64) -> Self {
        Self { id, depth: parent_depth + 1, parent: Some(parent), leader: index }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn is_origin(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent_index(&self) -> Option<BlockIndex> {
        self.parent
    }

    pub fn leader_index(&self) -> BlockIndex {
        self.leader
    }

    pub(crate) fn set_leader(&mut self, leader: BlockIndex) {
        self.leader = leader;
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "block {} (depth {})", self.id, self.depth)
    }
}
