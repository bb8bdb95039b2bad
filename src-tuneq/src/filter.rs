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

use serde::{Deserialize, Serialize};
use std::fmt;
use tuneq_iir::{FilterType, ResponseModel, Stage};
use uuid::Uuid;

/// Identifier of a filter in the active set.
///
/// Generated from a random UUID when the filter is created; never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterId(String);

impl FilterId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        FilterId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterId {
    fn from(value: &str) -> Self {
        FilterId(value.to_string())
    }
}

impl From<String> for FilterId {
    fn from(value: String) -> Self {
        FilterId(value)
    }
}

impl PartialEq<str> for FilterId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// One parametric EQ stage of the active set.
///
/// `id` and `type` are fixed at creation; the other fields are only
/// changed through [`crate::FilterManager::edit_filter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    id: FilterId,
    #[serde(rename = "type")]
    filter_type: FilterType,
    freq: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    q_factor: Option<f64>,
}

impl Filter {
    pub(crate) fn create(params: NewFilter) -> Self {
        Filter {
            id: FilterId::generate(),
            filter_type: params.filter_type,
            freq: params.freq,
            gain: params.gain,
            q_factor: params.q_factor,
        }
    }

    pub fn id(&self) -> &FilterId {
        &self.id
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    pub fn gain(&self) -> Option<f64> {
        self.gain
    }

    pub fn q_factor(&self) -> Option<f64> {
        self.q_factor
    }

    /// Overwrite the parameters present in `patch`.
    pub(crate) fn apply_patch(&mut self, patch: &FilterPatch) {
        if let Some(freq) = patch.freq {
            self.freq = freq;
        }
        if let Some(gain) = patch.gain {
            self.gain = Some(gain);
        }
        if let Some(q) = patch.q_factor {
            self.q_factor = Some(q);
        }
    }

    /// Response parameters of this filter.
    pub fn stage(&self) -> Stage {
        Stage {
            filter_type: self.filter_type,
            freq: self.freq,
            gain: self.gain,
            q: self.q_factor,
        }
    }

    /// Contribution in dB at `freq`, `None` when a required parameter is missing.
    pub fn response(&self, freq: f64, model: ResponseModel) -> Option<f64> {
        self.stage().response(freq, model)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.1} Hz", self.filter_type.short_name(), self.freq)?;
        if let Some(gain) = self.gain {
            write!(f, " {:+.2} dB", gain)?;
        }
        if let Some(q) = self.q_factor {
            write!(f, " Q {:.2}", q)?;
        }
        Ok(())
    }
}

/// Parameters of a filter to add; the id is generated on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFilter {
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    pub freq: f64,
    #[serde(default)]
    pub gain: Option<f64>,
    #[serde(default)]
    pub q_factor: Option<f64>,
}

impl NewFilter {
    pub fn peaking(freq: f64, gain: f64, q_factor: f64) -> Self {
        NewFilter {
            filter_type: FilterType::Peaking,
            freq,
            gain: Some(gain),
            q_factor: Some(q_factor),
        }
    }

    pub fn low_shelf(freq: f64, gain: f64) -> Self {
        NewFilter {
            filter_type: FilterType::LowShelf,
            freq,
            gain: Some(gain),
            q_factor: None,
        }
    }

    pub fn high_shelf(freq: f64, gain: f64) -> Self {
        NewFilter {
            filter_type: FilterType::HighShelf,
            freq,
            gain: Some(gain),
            q_factor: None,
        }
    }

    pub fn lowpass(freq: f64, q_factor: f64) -> Self {
        NewFilter {
            filter_type: FilterType::Lowpass,
            freq,
            gain: None,
            q_factor: Some(q_factor),
        }
    }

    pub fn highpass(freq: f64, q_factor: f64) -> Self {
        NewFilter {
            filter_type: FilterType::Highpass,
            freq,
            gain: None,
            q_factor: Some(q_factor),
        }
    }
}

/// Partial update of a filter. There is no way to change the type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPatch {
    #[serde(default)]
    pub freq: Option<f64>,
    #[serde(default)]
    pub gain: Option<f64>,
    #[serde(default)]
    pub q_factor: Option<f64>,
}

impl FilterPatch {
    pub fn is_empty(&self) -> bool {
        self.freq.is_none() && self.gain.is_none() && self.q_factor.is_none()
    }
}
