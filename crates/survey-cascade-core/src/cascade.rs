// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

//! Dependent-select resolution for cascade and administration questions.
//!
//! [`CascadeResolver::initialize`] rebuilds the selects a field shows from a
//! stored answer, whatever shape older forms saved it in. Matching order for
//! each level is fixed: exact id, then legacy name, then any id anywhere in
//! the answer, then (for unmatched ids only) the last option.
//! [`CascadeResolver::advance`] computes the next state after one selection.

use crate::ancestry;
use crate::answer::{Answer, AnswerValue};
use crate::hierarchy::{HierarchyError, HierarchyNode, HierarchyStore, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

pub const DEFAULT_LABEL_SEPARATOR: &str = " > ";

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Level {index} out of range ({len} levels)")]
    LevelOutOfRange { index: usize, len: usize },
    #[error("Node {id} is not an option at level {level}")]
    UnknownOption { level: usize, id: NodeId },
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),
}

/// One rendered select: sibling options and the chosen id, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub options: Vec<HierarchyNode>,
    pub selected: Option<NodeId>,
}

impl Level {
    /// A selection that is not among `options` is dropped.
    pub fn new(options: Vec<HierarchyNode>, selected: Option<NodeId>) -> Self {
        let selected = selected.filter(|id| options.iter().any(|o| o.id == *id));
        Self { options, selected }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.options.iter().any(|o| o.id == id)
    }

    pub fn selected_node(&self) -> Option<&HierarchyNode> {
        let id = self.selected?;
        self.options.iter().find(|o| o.id == id)
    }
}

/// Answer to another (administrator-scoped) question that the cascade
/// branches from instead of the global root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentSource {
    pub question: String,
    #[serde(default)]
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub parent_source: Option<ParentSource>,
    #[serde(default)]
    pub required_entity_type: Option<String>,
    #[serde(default = "default_separator")]
    pub label_separator: String,
}

fn default_separator() -> String {
    DEFAULT_LABEL_SEPARATOR.to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            parent_source: None,
            required_entity_type: None,
            label_separator: default_separator(),
        }
    }
}

impl ResolverConfig {
    pub fn with_entity_type(mut self, entity: &str) -> Self {
        self.required_entity_type = Some(entity.to_string());
        self
    }

    pub fn with_parent_source(mut self, question: &str, answer: Answer) -> Self {
        self.parent_source = Some(ParentSource {
            question: question.to_string(),
            answer,
        });
        self
    }
}

/// Value to write back into answer storage: the most specific id and its label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CommittedValue {
    pub value: Vec<NodeId>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    pub levels: Vec<Level>,
    pub final_value: Vec<NodeId>,
    pub final_label: String,
}

pub struct CascadeResolver<'a> {
    store: &'a HierarchyStore,
    config: &'a ResolverConfig,
}

impl<'a> CascadeResolver<'a> {
    pub fn new(store: &'a HierarchyStore, config: &'a ResolverConfig) -> Self {
        Self { store, config }
    }

    /// Rebuilds the levels for a stored answer. Never fails: unmatched or
    /// empty input degrades to unselected or missing levels.
    pub fn initialize(&self, prior: &Answer) -> Vec<Level> {
        match &self.config.parent_source {
            Some(source) => self.initialize_from_parent_source(source, prior),
            None => self.initialize_hierarchical(prior),
        }
    }

    /// Applies a selection at `level_index`. Deeper levels are discarded and,
    /// when the chosen node has children, one empty level is appended for them.
    /// `None` clears the selection at that level.
    pub fn advance(
        &self,
        levels: &[Level],
        level_index: usize,
        new_value: Option<NodeId>,
    ) -> Result<Advance, CascadeError> {
        let current = levels
            .get(level_index)
            .ok_or(CascadeError::LevelOutOfRange {
                index: level_index,
                len: levels.len(),
            })?;

        if let Some(id) = new_value {
            if !current.contains(id) {
                return Err(CascadeError::UnknownOption {
                    level: level_index,
                    id,
                });
            }
        }

        let mut next = levels[..level_index].to_vec();
        next.push(Level::new(current.options.clone(), new_value));

        if let Some(id) = new_value {
            let children = self.candidates(Some(id));
            if !children.is_empty() {
                next.push(Level::new(children, None));
            }
        }

        let committed = self.commit(&next);
        log::debug!(
            "[Cascade] Level {} set to {:?}; {} levels, committed {:?}",
            level_index,
            new_value,
            next.len(),
            committed.value
        );

        Ok(Advance {
            levels: next,
            final_value: committed.value,
            final_label: committed.label,
        })
    }

    /// The deepest selection across `levels`, with its display label.
    pub fn commit(&self, levels: &[Level]) -> CommittedValue {
        match levels.iter().rev().find_map(Level::selected_node) {
            Some(node) => CommittedValue {
                value: vec![node.id],
                label: self.label_for(node),
            },
            None => CommittedValue::default(),
        }
    }

    fn label_for(&self, node: &HierarchyNode) -> String {
        if let Some(path) = &node.full_path_name {
            return path.clone();
        }
        ancestry::full_path_label(self.store, node.id, &self.config.label_separator)
            .unwrap_or_else(|e| {
                log::warn!("[Cascade] No path label for node {}: {}", node.id, e);
                node.name.clone()
            })
    }

    fn entity(&self) -> Option<&str> {
        self.config.required_entity_type.as_deref()
    }

    /// Children of `parent` that pass the entity filter, in store order.
    fn candidates(&self, parent: Option<NodeId>) -> Vec<HierarchyNode> {
        self.store
            .children_of(parent)
            .into_iter()
            .filter(|n| n.matches_entity(self.entity()))
            .cloned()
            .collect()
    }

    fn initialize_from_parent_source(&self, source: &ParentSource, prior: &Answer) -> Vec<Level> {
        let Some(seed) = source.answer.last().and_then(|v| self.seed_id(v)) else {
            log::debug!(
                "[Cascade] Parent question '{}' has no usable answer",
                source.question
            );
            return Vec::new();
        };

        let options = self.candidates(Some(seed));
        if options.is_empty() {
            return Vec::new();
        }

        let selected = prior.first().and_then(|value| match_option(&options, value));
        vec![Level::new(options, selected)]
    }

    fn initialize_hierarchical(&self, prior: &Answer) -> Vec<Level> {
        let root_id = self.store.find_root().ok().map(|r| r.id);

        let mut seeds: Vec<NodeId> = Vec::new();
        for id in prior.ids() {
            if seeds.contains(&id) {
                continue;
            }
            // A stale id matches no node and parents none: re-select from the top.
            if self.store.find_by_id(id).is_none() && !self.store.has_children(id) {
                log::debug!("[Cascade] Answer id {} is not in the hierarchy; ignored", id);
                continue;
            }
            seeds.push(id);
        }
        if seeds.is_empty() {
            match root_id {
                Some(id) => seeds.push(id),
                None => {
                    log::debug!("[Cascade] No usable answer and no single root; nothing to render");
                    return Vec::new();
                }
            }
        }

        let wanted: HashSet<NodeId> = seeds.iter().copied().chain(prior.ids()).collect();
        let mut groups: Vec<Option<NodeId>> = Vec::new();
        for node in self.store.nodes().filter(|n| n.matches_entity(self.entity())) {
            let qualifies =
                wanted.contains(&node.id) || node.parent.is_some_and(|p| wanted.contains(&p));
            if qualifies && !groups.contains(&node.parent) {
                groups.push(node.parent);
            }
        }

        // A single root is the implicit national level, never a select of its own.
        if root_id.is_some() {
            groups.retain(Option::is_some);
        }
        groups.sort_by_key(|parent| (self.group_depth(*parent), *parent));

        if seeds.len() > 1 && groups.len() > 1 {
            if let Some(root) = root_id.filter(|r| groups.contains(&Some(*r))) {
                log::debug!(
                    "[Cascade] {} seed parents spread over {} groups; using the national branch",
                    seeds.len(),
                    groups.len()
                );
                groups = vec![Some(root)];
            }
        }

        groups
            .into_iter()
            .enumerate()
            .map(|(index, parent)| {
                let options = self.candidates(parent);
                let selected = resolve_positional(&options, prior, index);
                Level::new(options, selected)
            })
            .filter(|level| !level.options.is_empty())
            .collect()
    }

    /// Ids are taken as-is; a legacy name is looked up across the whole store.
    fn seed_id(&self, value: &AnswerValue) -> Option<NodeId> {
        if let Some(id) = value.as_id() {
            return Some(id);
        }
        let name = value.as_name()?;
        self.store.nodes().find(|n| n.name == name).map(|n| n.id)
    }

    fn group_depth(&self, parent: Option<NodeId>) -> usize {
        let Some(parent) = parent else {
            return 0;
        };
        match ancestry::depth(self.store, parent) {
            Ok(depth) => depth + 1,
            // Parent lives outside this store (e.g. entities under admin ids).
            Err(HierarchyError::NodeNotFound(_)) => 1,
            Err(e) => {
                log::warn!("[Cascade] Cannot order group under {}: {}", parent, e);
                usize::MAX
            }
        }
    }
}

/// Id match first, then legacy name match.
fn match_option(options: &[HierarchyNode], value: &AnswerValue) -> Option<NodeId> {
    if let Some(id) = value.as_id() {
        if options.iter().any(|o| o.id == id) {
            return Some(id);
        }
    }
    let name = value.as_name()?;
    options.iter().find(|o| o.name == name).map(|o| o.id)
}

fn resolve_positional(options: &[HierarchyNode], prior: &Answer, index: usize) -> Option<NodeId> {
    let entry = prior.get(index);

    if let Some(id) = entry.and_then(|value| match_option(options, value)) {
        return Some(id);
    }

    if let Some(option) = options.iter().find(|o| prior.contains_id(o.id)) {
        return Some(option.id);
    }

    match entry {
        Some(value) if value.as_id().is_some() => {
            let fallback = options.last().map(|o| o.id);
            log::warn!(
                "[Cascade] Stored id {:?} at level {} matches no option; falling back to {:?}",
                value,
                index,
                fallback
            );
            fallback
        }
        Some(value) => {
            log::debug!(
                "[Cascade] Legacy name {:?} at level {} matches no option",
                value,
                index
            );
            None
        }
        None => None,
    }
}

/// Field-scoped cascade state: the store snapshot, the stored answer and the
/// levels currently rendered.
#[derive(Debug, Clone)]
pub struct CascadeSession {
    store: HierarchyStore,
    config: ResolverConfig,
    prior_answer: Answer,
    levels: Vec<Level>,
}

impl CascadeSession {
    pub fn open(store: HierarchyStore, prior_answer: Answer, config: ResolverConfig) -> Self {
        let levels = CascadeResolver::new(&store, &config).initialize(&prior_answer);
        Self {
            store,
            config,
            prior_answer,
            levels,
        }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn store(&self) -> &HierarchyStore {
        &self.store
    }

    pub fn prior_answer(&self) -> &Answer {
        &self.prior_answer
    }

    /// Applies one selection and returns the value to persist.
    pub fn select(
        &mut self,
        level_index: usize,
        value: Option<NodeId>,
    ) -> Result<CommittedValue, CascadeError> {
        let advance =
            CascadeResolver::new(&self.store, &self.config).advance(&self.levels, level_index, value)?;
        self.levels = advance.levels;
        Ok(CommittedValue {
            value: advance.final_value,
            label: advance.final_label,
        })
    }

    pub fn committed(&self) -> CommittedValue {
        CascadeResolver::new(&self.store, &self.config).commit(&self.levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> HierarchyStore {
        HierarchyStore::from_rows(vec![
            HierarchyNode::new(1, "A", None),
            HierarchyNode::new(3, "C", Some(1)),
            HierarchyNode::new(2, "B", Some(1)),
        ])
    }

    fn option_ids(level: &Level) -> Vec<NodeId> {
        level.options.iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_initialize_by_id() {
        let store = abc();
        let config = ResolverConfig::default();
        let levels = CascadeResolver::new(&store, &config).initialize(&Answer::from_ids(&[2]));

        assert_eq!(levels.len(), 1);
        assert_eq!(option_ids(&levels[0]), vec![2, 3]);
        assert_eq!(levels[0].selected, Some(2));
    }

    #[test]
    fn test_initialize_by_legacy_name() {
        let store = abc();
        let config = ResolverConfig::default();
        let levels = CascadeResolver::new(&store, &config).initialize(&Answer::from("B"));

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].selected, Some(2));
    }

    #[test]
    fn test_initialize_null_seeds_root_children() {
        let store = abc();
        let config = ResolverConfig::default();
        let levels = CascadeResolver::new(&store, &config).initialize(&Answer::default());

        assert_eq!(levels.len(), 1);
        assert_eq!(option_ids(&levels[0]), vec![2, 3]);
        assert_eq!(levels[0].selected, None);
    }

    #[test]
    fn test_unmatched_legacy_name_stays_unselected() {
        let store = abc();
        let config = ResolverConfig::default();
        let levels = CascadeResolver::new(&store, &config).initialize(&Answer::from("Zanzibar"));

        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].selected, None);
    }

    #[test]
    fn test_numeric_string_matches_by_id() {
        let store = abc();
        let config = ResolverConfig::default();
        let levels = CascadeResolver::new(&store, &config).initialize(&Answer::from("3"));

        assert_eq!(levels[0].selected, Some(3));
    }

    #[test]
    fn test_advance_on_leaf_keeps_length() {
        let store = abc();
        let config = ResolverConfig::default();
        let resolver = CascadeResolver::new(&store, &config);
        let levels = resolver.initialize(&Answer::from_ids(&[2]));

        let next = resolver.advance(&levels, 0, Some(3)).unwrap();
        assert_eq!(next.levels.len(), levels.len());
        assert_eq!(next.final_value, vec![3]);
        assert_eq!(next.final_label, "A > C");
    }

    #[test]
    fn test_advance_rejects_bad_input() {
        let store = abc();
        let config = ResolverConfig::default();
        let resolver = CascadeResolver::new(&store, &config);
        let levels = resolver.initialize(&Answer::default());

        assert!(matches!(
            resolver.advance(&levels, 4, Some(2)),
            Err(CascadeError::LevelOutOfRange { index: 4, len: 1 })
        ));
        assert!(matches!(
            resolver.advance(&levels, 0, Some(1)),
            Err(CascadeError::UnknownOption { level: 0, id: 1 })
        ));
    }

    #[test]
    fn test_level_new_drops_foreign_selection() {
        let level = Level::new(vec![HierarchyNode::new(5, "E", Some(1))], Some(6));
        assert_eq!(level.selected, None);
        assert!(level.selected_node().is_none());
    }
}
