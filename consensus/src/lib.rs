//! # Block tree and leader tracking
//!
//! A [`BlockTree`](tree::BlockTree) holds blocks which reference a single parent, seeded
//! with an origin block at depth 0. For every block the tree keeps a *leader* link: the
//! deepest block currently in its subtree, ties going to the block inserted first.
//!
//! ## Invariants
//!
//! - Every non-origin block was inserted under a parent already in the tree, and sits
//!   exactly one level below it. Cycles cannot form.
//! - After every insertion, each block's leader is the first-inserted block of maximal
//!   depth among the blocks whose parent chain passes through it.
//!
//! Inserting a block only walks the new block's ancestor chain, and stops at the first
//! ancestor whose leader is already at least as deep. Leader depth never decreases
//! going up a chain, so no ancestor above that point can need an update either.

pub mod config;
pub mod errors;
pub mod model;
pub mod processes;
pub mod test_helpers;
pub mod tree;
