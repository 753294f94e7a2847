// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

pub mod loader;

pub use loader::{load_rows, rows_from_csv, rows_from_json};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub type NodeId = i64;

#[derive(Error, Debug)]
pub enum HierarchyError {
    #[error("Expected exactly one root node, found {count}")]
    AmbiguousRoot { count: usize },
    #[error("Cycle detected above node {leaf}: walk exceeded {limit} steps")]
    CycleDetected { leaf: NodeId, limit: usize },
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),
    #[error("Node {id} is not a child of {expected:?}")]
    NotAChild {
        id: NodeId,
        expected: Option<NodeId>,
    },
    #[error("Level {index} out of range for a chain of {len}")]
    LevelOutOfRange { index: usize, len: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Unsupported hierarchy file format: {0}")]
    UnsupportedFormat(String),
}

/// One administrative region or cascade entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Entity kind for typed cascades; plain administrative regions have none.
    #[serde(default, rename = "entity", alias = "entity_type")]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub full_path_name: Option<String>,
}

impl HierarchyNode {
    pub fn new(id: NodeId, name: &str, parent: Option<NodeId>) -> Self {
        Self {
            id,
            name: name.to_string(),
            parent,
            entity_type: None,
            full_path_name: None,
        }
    }

    pub fn with_entity(mut self, entity: &str) -> Self {
        self.entity_type = Some(entity.to_string());
        self
    }

    pub fn with_full_path(mut self, path: &str) -> Self {
        self.full_path_name = Some(path.to_string());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn matches_entity(&self, entity: Option<&str>) -> bool {
        match entity {
            Some(e) => self.entity_type.as_deref() == Some(e),
            None => true,
        }
    }
}

/// Immutable snapshot of one field's hierarchy rows with id, parent and
/// entity-type indexes.
///
/// Sibling lists and entity lists are kept sorted by name (case-insensitive),
/// ties in row order.
#[derive(Debug, Clone, Default)]
pub struct HierarchyStore {
    nodes: Vec<HierarchyNode>,
    by_id: HashMap<NodeId, usize>,
    by_parent: HashMap<Option<NodeId>, Vec<usize>>,
    by_entity: HashMap<String, Vec<usize>>,
}

impl HierarchyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<HierarchyNode>) -> Self {
        let mut store = Self::new();
        store.load(rows);
        store
    }

    /// Replaces the whole node set and rebuilds the indexes.
    pub fn load(&mut self, rows: Vec<HierarchyNode>) {
        self.nodes.clear();
        self.by_id.clear();
        self.by_parent.clear();
        self.by_entity.clear();

        for row in rows {
            match self.by_id.get(&row.id) {
                Some(&existing) => {
                    log::warn!(
                        "[Hierarchy] Duplicate node id {} ('{}' replaces '{}')",
                        row.id,
                        row.name,
                        self.nodes[existing].name
                    );
                    self.nodes[existing] = row;
                }
                None => {
                    self.by_id.insert(row.id, self.nodes.len());
                    self.nodes.push(row);
                }
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            self.by_parent.entry(node.parent).or_default().push(i);
            if let Some(entity) = &node.entity_type {
                self.by_entity.entry(entity.clone()).or_default().push(i);
            }
        }

        let nodes = &self.nodes;
        for indices in self
            .by_parent
            .values_mut()
            .chain(self.by_entity.values_mut())
        {
            indices.sort_by_cached_key(|&i| nodes[i].name.to_lowercase());
        }

        log::debug!(
            "[Hierarchy] Loaded {} nodes ({} parent groups, {} entity types)",
            self.nodes.len(),
            self.by_parent.len(),
            self.by_entity.len()
        );
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in row order.
    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.nodes.iter()
    }

    pub fn find_by_id(&self, id: NodeId) -> Option<&HierarchyNode> {
        self.by_id.get(&id).map(|&i| &self.nodes[i])
    }

    /// Nodes whose parent is `parent`; `None` lists the roots.
    pub fn children_of(&self, parent: Option<NodeId>) -> Vec<&HierarchyNode> {
        self.indexed(self.by_parent.get(&parent))
    }

    pub fn has_children(&self, id: NodeId) -> bool {
        self.by_parent
            .get(&Some(id))
            .is_some_and(|children| !children.is_empty())
    }

    pub fn by_entity_type(&self, entity: &str) -> Vec<&HierarchyNode> {
        self.indexed(self.by_entity.get(entity))
    }

    /// The single parentless node. Zero or several roots is an error.
    pub fn find_root(&self) -> Result<&HierarchyNode, HierarchyError> {
        match self.by_parent.get(&None).map(Vec::as_slice) {
            Some([only]) => Ok(&self.nodes[*only]),
            other => Err(HierarchyError::AmbiguousRoot {
                count: other.map_or(0, <[usize]>::len),
            }),
        }
    }

    fn indexed(&self, indices: Option<&Vec<usize>>) -> Vec<&HierarchyNode> {
        indices
            .map(|idx| idx.iter().map(|&i| &self.nodes[i]).collect())
            .unwrap_or_default()
    }
}
