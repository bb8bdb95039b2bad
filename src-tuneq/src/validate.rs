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

use crate::curve::parse_leading_f64;
use serde::Serialize;
use serde_json::Value;
use tuneq_env::{MIN_VALID_POINTS, ORDER_TOLERANCE};

/// Reasons a dataset is refused before entering the pipeline
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Data must be an array with at least 2 rows (header + data)")]
    NotAnArray,

    #[error("Data must be an array with at least 2 rows (header + data)")]
    TooFewRows,

    #[error("Row {row} is not an array")]
    RowNotArray { row: usize },

    #[error("Row {row} has less than 2 elements")]
    RowTooShort { row: usize },

    #[error("Header row must provide a label for both columns")]
    MissingHeader,

    #[error(
        "Data must contain at least {required} valid frequency response data points (found {found})"
    )]
    TooFewPoints { found: usize, required: usize },
}

/// Statistics of a dataset that passed validation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    /// Data rows whose two values parsed as numbers
    pub valid_points: usize,
    /// Data rows that were skipped because a value did not parse
    pub skipped_rows: usize,
    /// Rows whose frequency fell below the ordering tolerance
    pub out_of_order: usize,
}

/// Pass/fail result with a human readable reason, for hosts that expect
/// a `{ valid, error }` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<Result<ValidationSummary, ValidationError>> for Validation {
    fn from(result: Result<ValidationSummary, ValidationError>) -> Self {
        match result {
            Ok(_) => Validation {
                valid: true,
                error: None,
            },
            Err(e) => Validation {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Validate frequency response rows (header first).
///
/// Rows that fail to parse are skipped and frequencies going down are only
/// reported; the dataset is refused when it is structurally broken or has
/// fewer than [`MIN_VALID_POINTS`] parsed points.
///
/// # Arguments
/// * `rows` - Header row followed by (frequency, SPL) text rows
///
/// # Returns
/// * Summary of the accepted dataset, or the first rule it breaks
pub fn validate_frequency_data<R, S>(rows: &[R]) -> Result<ValidationSummary, ValidationError>
where
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    log::debug!("validating frequency response data, {} rows", rows.len());
    if rows.len() < 2 {
        log::error!("validation failed: fewer than 2 rows");
        return Err(ValidationError::TooFewRows);
    }
    for (i, row) in rows.iter().enumerate() {
        if row.as_ref().len() < 2 {
            log::error!("validation failed: row {} has less than 2 elements", i);
            return Err(ValidationError::RowTooShort { row: i });
        }
    }
    count_points(rows.iter().skip(1).map(|row| {
        let row = row.as_ref();
        (row[0].as_ref(), row[1].as_ref())
    }))
}

/// Validate rows given as untyped JSON, where rows may not be arrays and
/// header cells may be `null`.
pub fn validate_json_rows(data: &Value) -> Result<ValidationSummary, ValidationError> {
    let rows = data.as_array().ok_or_else(|| {
        log::error!("validation failed: data is not an array");
        ValidationError::NotAnArray
    })?;
    if rows.len() < 2 {
        log::error!("validation failed: fewer than 2 rows");
        return Err(ValidationError::TooFewRows);
    }

    let mut cells = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let Some(row) = row.as_array() else {
            log::error!("validation failed: row {} is not an array", i);
            return Err(ValidationError::RowNotArray { row: i });
        };
        if row.len() < 2 {
            log::error!("validation failed: row {} has less than 2 elements", i);
            return Err(ValidationError::RowTooShort { row: i });
        }
        cells.push([&row[0], &row[1]]);
    }

    if cells[0].iter().any(|cell| cell.is_null()) {
        log::error!("validation failed: header row is incomplete");
        return Err(ValidationError::MissingHeader);
    }

    let texts: Vec<[String; 2]> = cells
        .iter()
        .skip(1)
        .map(|[f, s]| [cell_text(f), cell_text(s)])
        .collect();
    count_points(texts.iter().map(|[f, s]| (f.as_str(), s.as_str())))
}

/// Text of a JSON cell as it would be stringified by a host.
pub(crate) fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn count_points<'a>(
    data_rows: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<ValidationSummary, ValidationError> {
    let mut summary = ValidationSummary::default();
    let mut prev_freq = -1.0_f64;

    // data rows start at index 1, after the header
    for (i, (freq_text, spl_text)) in data_rows.enumerate().map(|(i, r)| (i + 1, r)) {
        let Some(freq) = parse_leading_f64(freq_text) else {
            log::warn!("row {}: frequency '{}' is not a number, skipped", i, freq_text);
            summary.skipped_rows += 1;
            continue;
        };
        let Some(_spl) = parse_leading_f64(spl_text) else {
            log::warn!("row {}: SPL '{}' is not a number, skipped", i, spl_text);
            summary.skipped_rows += 1;
            continue;
        };

        summary.valid_points += 1;

        if freq < prev_freq * ORDER_TOLERANCE {
            log::warn!(
                "row {}: frequency {} is lower than the previous frequency {}",
                i,
                freq,
                prev_freq
            );
            summary.out_of_order += 1;
        }
        prev_freq = freq;
    }

    log::debug!("valid data points: {}", summary.valid_points);

    if summary.valid_points < MIN_VALID_POINTS {
        log::error!(
            "validation failed: {} valid data points, {} required",
            summary.valid_points,
            MIN_VALID_POINTS
        );
        return Err(ValidationError::TooFewPoints {
            found: summary.valid_points,
            required: MIN_VALID_POINTS,
        });
    }

    Ok(summary)
}
