// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

//! Ancestor chains for the administration picker.
//!
//! The picker stores one id per level (direct administrative assignment), so
//! unlike [`crate::cascade`] it never has to interpret legacy answer shapes.

use crate::cascade::Level;
use crate::hierarchy::{HierarchyError, HierarchyNode, HierarchyStore, NodeId};

/// Walks parent references up from `leaf_id` and returns the chain root first.
///
/// The walk is bounded by the store size; exceeding it means the parent
/// references loop and is reported as [`HierarchyError::CycleDetected`].
pub fn build_chain(
    store: &HierarchyStore,
    leaf_id: NodeId,
) -> Result<Vec<HierarchyNode>, HierarchyError> {
    let leaf = store
        .find_by_id(leaf_id)
        .ok_or(HierarchyError::NodeNotFound(leaf_id))?;

    let limit = store.len();
    let mut chain = vec![leaf.clone()];
    let mut current = leaf;

    while let Some(parent_id) = current.parent {
        if chain.len() > limit {
            return Err(HierarchyError::CycleDetected {
                leaf: leaf_id,
                limit,
            });
        }
        match store.find_by_id(parent_id) {
            Some(parent) => {
                chain.push(parent.clone());
                current = parent;
            }
            None => {
                log::warn!(
                    "[Hierarchy] Node {} points at missing parent {}; chain stops there",
                    current.id,
                    parent_id
                );
                break;
            }
        }
    }

    chain.reverse();
    Ok(chain)
}

/// Replaces the selection at `level_index` with `new_id`, dropping deeper levels.
///
/// `level_index` may be at most `chain.len()` (appending one level), and the
/// new node must hang under the selection one level up, or be a root at
/// level 0.
pub fn on_select(
    store: &HierarchyStore,
    chain: &[HierarchyNode],
    level_index: usize,
    new_id: NodeId,
) -> Result<Vec<HierarchyNode>, HierarchyError> {
    if level_index > chain.len() {
        return Err(HierarchyError::LevelOutOfRange {
            index: level_index,
            len: chain.len(),
        });
    }
    let node = store
        .find_by_id(new_id)
        .ok_or(HierarchyError::NodeNotFound(new_id))?;

    let expected = level_index.checked_sub(1).map(|above| chain[above].id);
    if node.parent != expected {
        return Err(HierarchyError::NotAChild {
            id: new_id,
            expected,
        });
    }

    let mut next: Vec<HierarchyNode> = chain.iter().take(level_index).cloned().collect();
    next.push(node.clone());
    Ok(next)
}

/// One select per chain entry, plus an empty trailing select when the last
/// chosen node still has children.
pub fn picker_levels(store: &HierarchyStore, chain: &[HierarchyNode]) -> Vec<Level> {
    let mut levels: Vec<Level> = chain
        .iter()
        .map(|node| {
            let options = store
                .children_of(node.parent)
                .into_iter()
                .cloned()
                .collect();
            Level::new(options, Some(node.id))
        })
        .collect();

    if let Some(last) = chain.last() {
        if store.has_children(last.id) {
            let options = store
                .children_of(Some(last.id))
                .into_iter()
                .cloned()
                .collect();
            levels.push(Level::new(options, None));
        }
    }

    levels
}

/// Human-readable path for `id`, e.g. "Kenya > Nairobi > Westlands".
pub fn full_path_label(
    store: &HierarchyStore,
    id: NodeId,
    separator: &str,
) -> Result<String, HierarchyError> {
    let chain = build_chain(store, id)?;
    Ok(chain
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join(separator))
}

/// Number of ancestors above `id` that are present in the store.
pub(crate) fn depth(store: &HierarchyStore, id: NodeId) -> Result<usize, HierarchyError> {
    build_chain(store, id).map(|chain| chain.len() - 1)
}
