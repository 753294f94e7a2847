// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Survey Cascade Contributors

use crate::LatLon;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum GeoError {
    #[error("Parse error at point {index}: {message}")]
    Parse { index: usize, message: String },
    #[error("Point {index} out of range: lat={lat}, lon={lon}")]
    OutOfRange { index: usize, lat: f64, lon: f64 },
}

/// Reads the points of a geotrace or geoshape answer.
///
/// Accepts a JSON array of `[lat, lon]` pairs, or the semicolon-separated
/// `"lat lon [alt acc]; ..."` text mobile clients store. Altitude and accuracy
/// are ignored. Blank input yields no points.
pub fn parse_points(text: &str) -> Result<Vec<LatLon>, GeoError> {
    let trimmed = text.trim();
    let points = if trimmed.starts_with('[') {
        parse_json(trimmed)?
    } else {
        parse_delimited(trimmed)?
    };

    for (index, &[lat, lon]) in points.iter().enumerate() {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::OutOfRange { index, lat, lon });
        }
    }
    Ok(points)
}

fn parse_json(text: &str) -> Result<Vec<LatLon>, GeoError> {
    let raw: Vec<Vec<f64>> = serde_json::from_str(text).map_err(|e| GeoError::Parse {
        index: 0,
        message: e.to_string(),
    })?;

    raw.into_iter()
        .enumerate()
        .map(|(index, coords)| match coords.as_slice() {
            [lat, lon, ..] => Ok([*lat, *lon]),
            _ => Err(GeoError::Parse {
                index,
                message: format!("expected [lat, lon], got {} values", coords.len()),
            }),
        })
        .collect()
}

fn parse_delimited(text: &str) -> Result<Vec<LatLon>, GeoError> {
    text.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .enumerate()
        .map(|(index, chunk)| {
            let mut fields = chunk
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|f| !f.is_empty());
            let mut next = |what: &str| -> Result<f64, GeoError> {
                let field = fields.next().ok_or_else(|| GeoError::Parse {
                    index,
                    message: format!("missing {}", what),
                })?;
                field.parse::<f64>().map_err(|_| GeoError::Parse {
                    index,
                    message: format!("invalid {} '{}'", what, field),
                })
            };
            Ok([next("latitude")?, next("longitude")?])
        })
        .collect()
}
