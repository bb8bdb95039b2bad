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

use super::read_json::rows_from_json;
use super::read_text::parse_frequency_response_text;
use crate::curve::RawRow;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading a frequency response dataset
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset: {0}")]
    Format(String),
    #[error("no valid frequency response data found")]
    NoData,
}

fn looks_like_json(content: &str) -> bool {
    let trimmed = content.trim();
    (trimmed.starts_with('[') && trimmed.ends_with(']'))
        || (trimmed.starts_with('{') && trimmed.ends_with('}'))
}

/// Normalize a dataset into raw rows, header first.
///
/// Content is treated as JSON when `json_hint` is set or when it looks like
/// a JSON array or object. JSON that fails to parse or normalize is retried
/// as delimited text.
pub fn parse_frequency_response(content: &str, json_hint: bool) -> Result<Vec<RawRow>, ReadError> {
    if json_hint || looks_like_json(content) {
        let parsed = serde_json::from_str::<serde_json::Value>(content)
            .map_err(ReadError::from)
            .and_then(|value| rows_from_json(&value));
        match parsed {
            Ok(rows) => return Ok(rows),
            Err(e) => log::warn!("JSON parse failed, trying as text: {}", e),
        }
    }

    let rows = parse_frequency_response_text(content);
    if rows.is_empty() {
        return Err(ReadError::NoData);
    }
    Ok(rows)
}

/// Read and normalize a dataset file; a `.json` extension forces JSON first.
pub fn load_frequency_response_rows(path: &Path) -> Result<Vec<RawRow>, ReadError> {
    let content = fs::read_to_string(path)?;
    let json_hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    log::debug!("reading {} (json: {})", path.display(), json_hint);
    parse_frequency_response(&content, json_hint)
}
