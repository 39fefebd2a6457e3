use crate::model::block::BlockId;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("block {0} not found in tree")]
    UnknownBlock(BlockId),

    #[error("parent block {0} not found in tree")]
    UnknownParent(BlockId),

    /// Only returned under [`DuplicatePolicy::Reject`](crate::config::DuplicatePolicy::Reject)
    #[error("block {0} already exists in tree")]
    BlockAlreadyExists(BlockId),
}

impl TreeError {
    /// Returns `true` if this error names a block id which could not be resolved.
    pub fn is_unknown_reference(&self) -> bool {
        matches!(self, TreeError::UnknownBlock(_) | TreeError::UnknownParent(_))
    }
}

pub type TreeResult<T> = std::result::Result<T, TreeError>;
