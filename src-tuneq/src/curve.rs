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

use crate::validate::{ValidationError, ValidationSummary, validate_frequency_data};
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tuneq_env::{DEFAULT_FREQ_LABEL, DEFAULT_SPL_LABEL};

/// A row of raw curve data: frequency text and SPL text.
pub type RawRow = [String; 2];

static LEADING_FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid float regex")
});

/// Parse the leading number of `text`, ignoring surrounding whitespace and
/// any trailing characters ("100Hz" gives 100). Returns `None` when the text
/// does not start with digits or overflows, so "Infinity", "NaN" and
/// "1e999" are not numbers.
pub fn parse_leading_f64(text: &str) -> Option<f64> {
    let m = LEADING_FLOAT.find(text.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// One (frequency, SPL) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyPoint {
    /// Frequency in Hz
    pub freq: f64,
    /// Sound pressure level in dB
    pub spl: f64,
}

impl FrequencyPoint {
    /// Parse a raw row, `None` if either value is not a number.
    pub fn parse(row: &RawRow) -> Option<Self> {
        Some(FrequencyPoint {
            freq: parse_leading_f64(&row[0])?,
            spl: parse_leading_f64(&row[1])?,
        })
    }
}

/// A frequency response curve as raw text rows plus a header.
///
/// The text of every value is kept so that frequencies are reproduced
/// exactly in processed curves. Serialized as an array of two-element
/// arrays whose first element is the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<RawRow>", try_from = "Vec<RawRow>")]
pub struct Curve {
    header: RawRow,
    rows: Vec<RawRow>,
}

impl Curve {
    /// Build a curve from a header and data rows without validation.
    pub fn new(header: RawRow, rows: Vec<RawRow>) -> Self {
        Curve { header, rows }
    }

    /// Build a curve from rows whose first element is the header, after
    /// running the dataset validator on them. Extra columns are dropped.
    pub fn from_rows<R, S>(rows: &[R]) -> Result<(Self, ValidationSummary), ValidationError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let summary = validate_frequency_data(rows)?;
        let mut raw = rows.iter().map(|row| {
            let row = row.as_ref();
            [row[0].as_ref().to_string(), row[1].as_ref().to_string()]
        });
        // validation guarantees at least two rows of two elements
        let header = raw.next().ok_or(ValidationError::TooFewRows)?;
        Ok((Curve::new(header, raw.collect()), summary))
    }

    /// Build a curve with the default header from numeric points.
    pub fn from_points(points: &[FrequencyPoint]) -> Self {
        Curve::new(
            default_header(),
            points
                .iter()
                .map(|p| [p.freq.to_string(), p.spl.to_string()])
                .collect(),
        )
    }

    pub fn header(&self) -> &RawRow {
        &self.header
    }

    /// Data rows, header excluded.
    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parsed points; rows that do not parse are skipped.
    pub fn points(&self) -> impl Iterator<Item = FrequencyPoint> + '_ {
        self.rows.iter().filter_map(FrequencyPoint::parse)
    }

    /// Frequencies of the parsed points.
    pub fn freqs(&self) -> Array1<f64> {
        self.points().map(|p| p.freq).collect()
    }

    /// SPL values of the parsed points.
    pub fn spl(&self) -> Array1<f64> {
        self.points().map(|p| p.spl).collect()
    }

    /// All rows, header first.
    pub fn to_rows(&self) -> Vec<RawRow> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }
}

impl From<Curve> for Vec<RawRow> {
    fn from(curve: Curve) -> Self {
        let mut rows = Vec::with_capacity(curve.rows.len() + 1);
        rows.push(curve.header);
        rows.extend(curve.rows);
        rows
    }
}

impl TryFrom<Vec<RawRow>> for Curve {
    type Error = String;

    fn try_from(mut rows: Vec<RawRow>) -> Result<Self, Self::Error> {
        if rows.is_empty() {
            return Err("a curve needs at least a header row".to_string());
        }
        let header = rows.remove(0);
        Ok(Curve::new(header, rows))
    }
}

/// Header used when a dataset comes without one.
pub fn default_header() -> RawRow {
    [DEFAULT_FREQ_LABEL.to_string(), DEFAULT_SPL_LABEL.to_string()]
}
