// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use super::{HierarchyError, HierarchyNode};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Reads a JSON array of hierarchy rows.
pub fn rows_from_json<R: Read>(reader: R) -> Result<Vec<HierarchyNode>, HierarchyError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Reads headered CSV rows (`id,name,parent,entity,full_path_name`).
/// Empty `parent` or `entity` cells are read as absent.
pub fn rows_from_csv<R: Read>(reader: R) -> Result<Vec<HierarchyNode>, HierarchyError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in rdr.deserialize::<HierarchyNode>() {
        let mut row = record?;
        if row.entity_type.as_deref() == Some("") {
            row.entity_type = None;
        }
        if row.full_path_name.as_deref() == Some("") {
            row.full_path_name = None;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Loads rows from a `.json` or `.csv` file.
pub fn load_rows<P: AsRef<Path>>(path: P) -> Result<Vec<HierarchyNode>, HierarchyError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let rows = match ext.as_str() {
        "json" => rows_from_json(BufReader::new(File::open(path)?))?,
        "csv" => rows_from_csv(BufReader::new(File::open(path)?))?,
        _ => return Err(HierarchyError::UnsupportedFormat(path.display().to_string())),
    };

    log::info!(
        "[Hierarchy] Read {} rows from {}",
        rows.len(),
        path.display()
    );
    Ok(rows)
}
