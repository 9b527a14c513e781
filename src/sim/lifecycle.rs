//! Disposal cascade and arena compaction
//!
//! Disposal is two-phase: anything whose parent is disposed becomes
//! disposed (iterated to a fixed point, since marking order is not
//! guaranteed), then the gaps are filled by swapping the last slot in.
//! Any parent reference to the moved slot is re-pointed first, so links
//! never dangle across a compaction.

use super::state::GameState;

/// Remove everything marked disposed. Runs once per frame before physics.
pub fn prune(state: &mut GameState) {
    for entity in &mut state.entities {
        if entity.disposed {
            continue;
        }

        // Cascade: a disposed parent takes its subtree with it
        loop {
            let mut changed = false;
            for i in 0..entity.parts.len() {
                let parent_index = entity.parts[i].parent_index;
                if !entity.parts[i].disposed && entity.parts[parent_index].disposed {
                    entity.parts[i].disposed = true;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Compact parts, re-pointing references to the slot being moved
        let mut i = 0;
        while i < entity.parts.len() {
            if !entity.parts[i].disposed {
                i += 1;
                continue;
            }
            let last = entity.parts.len() - 1;
            for part in &mut entity.parts {
                if part.parent_index == last {
                    part.parent_index = i;
                }
            }
            entity.parts.swap_remove(i);
        }
        for (index, part) in entity.parts.iter_mut().enumerate() {
            part.index = index;
        }

        if entity.parts.is_empty() {
            entity.disposed = true;
        }
    }

    // Same compaction one level up, for whole entities
    let mut i = 0;
    while i < state.entities.len() {
        if state.entities[i].disposed {
            state.entities.swap_remove(i);
        } else {
            i += 1;
        }
    }
    for (index, entity) in state.entities.iter_mut().enumerate() {
        entity.index = index;
    }
}
