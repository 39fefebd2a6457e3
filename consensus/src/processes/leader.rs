//!
//! Tree insertion and leader propagation
//!
use crate::{
    config::DuplicatePolicy,
    errors::TreeResult,
    model::{
        block::{BlockId, BlockIndex},
        stores::blocks::BlockStore,
    },
};
use kchain_core::{debug, trace};

/// Appends `id` under `parent` and makes the new block the leader of every ancestor
/// whose current leader is shallower than it.
///
/// Returns the arena index of the new block.
pub fn add_tree_block(store: &mut dyn BlockStore, id: BlockId, parent: BlockIndex, policy: DuplicatePolicy) -> TreeResult<BlockIndex> {
    let new_block = match policy {
        DuplicatePolicy::Reject => store.insert(id, parent)?,
        DuplicatePolicy::Replace => {
            let (new_block, displaced) = store.insert_or_replace(id, parent);
            if let Some(displaced) = displaced {
                debug!("Block {} re-bound from {} to {}", id, displaced, new_block);
            }
            new_block
        }
    };
    let updated = propagate_leader(store, new_block);
    trace!("Block {} added at depth {}, leading {} ancestors", id, store.get(new_block).depth(), updated);
    Ok(new_block)
}

/// Walks up from the parent of `new_block`, replacing leaders while they are strictly
/// shallower than `new_block`. Returns the number of ancestors updated.
///
/// Leader depth never decreases going up the chain, so the walk can stop at the first
/// ancestor whose leader is at least as deep. Stopping on equal depth keeps the
/// first-inserted block as leader on ties.
pub(crate) fn propagate_leader(store: &mut dyn BlockStore, new_block: BlockIndex) -> usize {
    let depth = store.get(new_block).depth();
    let mut updated = 0;
    let mut current = store.get(new_block).parent_index();
    while let Some(ancestor) = current {
        let block = store.get(ancestor);
        if store.get(block.leader_index()).depth() >= depth {
            break;
        }
        current = block.parent_index();
        store.set_leader(ancestor, new_block);
        updated += 1;
    }
    updated
}
