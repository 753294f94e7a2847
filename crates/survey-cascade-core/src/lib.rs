// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

//! Cascading hierarchy resolution for survey form fields.
//!
//! Hierarchy rows (administrative regions or typed cascade entities) are loaded
//! into a [`hierarchy::HierarchyStore`]; a [`cascade::CascadeResolver`] turns a
//! previously stored answer into the dependent selects a form renders, and
//! [`ancestry`] backs the administration picker.

pub mod ancestry;
pub mod answer;
pub mod cascade;
pub mod hierarchy;
pub mod settings;

pub use answer::{Answer, AnswerValue};
pub use cascade::{
    Advance, CascadeError, CascadeResolver, CascadeSession, CommittedValue, Level, ParentSource,
    ResolverConfig,
};
pub use hierarchy::{HierarchyError, HierarchyNode, HierarchyStore, NodeId};
pub use settings::{Settings, SettingsError};

use std::path::PathBuf;

/// Platform config directory for the cascade tools (falls back to the working directory).
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "survey-cascade", "survey-cascade")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
