//! tuneq - Parametric EQ curves from manual edits or LLM filter directives
//!
//! Copyright (C) 2025 Pierre Aubert pierre(at)spinorama(dot)org
//!
//! This program is free software: you can redistribute it and/or modify
//! it under the terms of the GNU General Public License as published by
//! the Free Software Foundation, either version 3 of the License, or
//! (at your option) any later version.
//!
//! This program is distributed in the hope that it will be useful,
//! but WITHOUT ANY WARRANTY; without even the implied warranty of
//! MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//! GNU General Public License for more details.
//!
//! You should have received a copy of the GNU General Public License
//! along with this program.  If not, see <https://www.gnu.org/licenses/>.

use super::ReadError;
use crate::curve::{RawRow, default_header};
use crate::validate::cell_text;
use serde_json::{Map, Value};

/// Column a JSON object key is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Frequency,
    Level,
}

/// How a key name is matched (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPattern {
    Contains(&'static str),
    Equals(&'static str),
}

impl KeyPattern {
    pub fn matches(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        match self {
            KeyPattern::Contains(needle) => key.contains(needle),
            KeyPattern::Equals(name) => key == *name,
        }
    }
}

/// Candidate key patterns for one normalized field
#[derive(Debug, Clone, Copy)]
pub struct KeyStrategy {
    pub field: Field,
    pub patterns: &'static [KeyPattern],
}

/// Key detection table for object-array datasets, e.g. `[{"x": 20, "y": 1.5}]`.
pub const KEY_STRATEGIES: &[KeyStrategy] = &[
    KeyStrategy {
        field: Field::Frequency,
        patterns: &[
            KeyPattern::Contains("freq"),
            KeyPattern::Equals("x"),
            KeyPattern::Equals("hz"),
        ],
    },
    KeyStrategy {
        field: Field::Level,
        patterns: &[
            KeyPattern::Contains("db"),
            KeyPattern::Contains("spl"),
            KeyPattern::Equals("y"),
            KeyPattern::Equals("level"),
        ],
    },
];

/// First key (in document order) matching any pattern of `field`.
fn find_key<'a>(keys: &[&'a str], field: Field) -> Option<&'a str> {
    let strategy = KEY_STRATEGIES.iter().find(|s| s.field == field)?;
    keys.iter()
        .copied()
        .find(|key| strategy.patterns.iter().any(|p| p.matches(key)))
}

/// Keys used for (frequency, level) in an object of the dataset.
///
/// Falls back to the first two keys when detection fails.
pub fn detect_keys(object: &Map<String, Value>) -> Result<(String, String), ReadError> {
    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    match (find_key(&keys, Field::Frequency), find_key(&keys, Field::Level)) {
        (Some(freq), Some(level)) => Ok((freq.to_string(), level.to_string())),
        _ if keys.len() >= 2 => {
            log::debug!("using default key mapping {} -> freq, {} -> level", keys[0], keys[1]);
            Ok((keys[0].to_string(), keys[1].to_string()))
        }
        _ => Err(ReadError::Format(
            "cannot determine frequency and SPL keys".to_string(),
        )),
    }
}

/// Whether a row looks like a column header.
pub fn looks_like_header(row: &RawRow) -> bool {
    let first = row[0].as_str();
    first == "Freq(Hz)"
        || first == "Frequency(Hz)"
        || first == "Frequency"
        || first.to_lowercase().contains("freq")
}

/// Normalize a JSON dataset into raw rows with a header.
///
/// Accepts arrays of arrays (first two values of each row) and arrays of
/// objects (keys detected through [`KEY_STRATEGIES`]).
pub fn rows_from_json(data: &Value) -> Result<Vec<RawRow>, ReadError> {
    let items = data
        .as_array()
        .ok_or_else(|| ReadError::Format("JSON must be an array".to_string()))?;

    let rows = match items.first() {
        Some(Value::Array(_)) => rows_from_arrays(items)?,
        Some(Value::Object(first)) => rows_from_objects(items, first)?,
        _ => return Err(ReadError::Format("unsupported JSON array format".to_string())),
    };

    if rows.len() < 2 {
        return Err(ReadError::Format(
            "data must contain a header row and at least one data point".to_string(),
        ));
    }
    Ok(rows)
}

fn rows_from_arrays(items: &[Value]) -> Result<Vec<RawRow>, ReadError> {
    let mut rows = Vec::with_capacity(items.len() + 1);
    for item in items {
        match item.as_array() {
            Some(row) if row.len() >= 2 => rows.push([cell_text(&row[0]), cell_text(&row[1])]),
            _ => {
                return Err(ReadError::Format(
                    "invalid row in JSON array, every row needs at least two elements"
                        .to_string(),
                ));
            }
        }
    }
    if !looks_like_header(&rows[0]) {
        log::debug!("no header row detected, adding one");
        rows.insert(0, default_header());
    }
    Ok(rows)
}

fn rows_from_objects(items: &[Value], first: &Map<String, Value>) -> Result<Vec<RawRow>, ReadError> {
    let (freq_key, level_key) = detect_keys(first)?;
    let cell = |item: &Value, key: &str| item.get(key).map(cell_text).unwrap_or_default();
    Ok(std::iter::once(default_header())
        .chain(
            items
                .iter()
                .map(|item| [cell(item, &freq_key), cell(item, &level_key)]),
        )
        .collect())
}
