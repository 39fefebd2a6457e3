use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Decides what [`BlockTree::insert`](crate::tree::BlockTree::insert) does with an id
/// which is already present in the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`TreeError::BlockAlreadyExists`](crate::errors::TreeError::BlockAlreadyExists)
    /// and leave the tree untouched
    #[default]
    Reject,

    /// Point the id at the new block. The displaced block stays in the arena, so blocks
    /// already linked to it as parent or leader keep resolving through it.
    Replace,
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "replace" => Ok(Self::Replace),
            _ => Err(format!("unknown duplicate policy '{s}' (expected 'reject' or 'replace')")),
        }
    }
}

impl Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TreeConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Arena capacity reserved up front
    pub initial_capacity: usize,
}

impl TreeConfig {
    pub fn with_duplicate_policy(mut self, duplicate_policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = duplicate_policy;
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
