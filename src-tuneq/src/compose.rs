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

use crate::curve::{Curve, FrequencyPoint, RawRow};
use crate::filter::Filter;
use ndarray::Array1;
use tuneq_env::SPL_DECIMALS;
use tuneq_iir::{ResponseModel, Stage, compute_stages_response};

/// Combined gain (dB) of all filters at `freq`, simplified model.
pub fn combined_response(freq: f64, filters: &[Filter]) -> f64 {
    combined_response_with(freq, filters, ResponseModel::Simplified)
}

/// Combined gain (dB) of all filters at `freq`.
///
/// A filter missing a parameter its type requires contributes nothing.
pub fn combined_response_with(freq: f64, filters: &[Filter], model: ResponseModel) -> f64 {
    filters
        .iter()
        .filter_map(|filter| filter.response(freq, model))
        .sum()
}

/// Combined gain (dB) of all filters on a frequency grid.
///
/// # Arguments
/// * `freqs` - Frequency points for evaluation (Hz)
/// * `filters` - Active filter set
/// * `model` - Response model used for every filter
///
/// # Returns
/// Summed gain in dB at each frequency point
pub fn combined_response_grid(
    freqs: &Array1<f64>,
    filters: &[Filter],
    model: ResponseModel,
) -> Array1<f64> {
    let stages: Vec<Stage> = filters.iter().map(Filter::stage).collect();
    compute_stages_response(freqs, &stages, model)
}

/// Apply all filters to the original curve with the simplified model.
pub fn compose_curve(original: &Curve, filters: &[Filter]) -> Curve {
    compose_curve_with(original, filters, ResponseModel::Simplified)
}

/// Apply all filters to the original curve.
///
/// The header and the frequency text of every row are kept; each SPL value
/// becomes the original SPL plus the combined filter gain, formatted with
/// two decimals. Rows that do not parse as numbers are copied unchanged.
/// The result has exactly as many rows as the input.
pub fn compose_curve_with(original: &Curve, filters: &[Filter], model: ResponseModel) -> Curve {
    let rows: Vec<RawRow> = original
        .rows()
        .iter()
        .map(|row| match FrequencyPoint::parse(row) {
            Some(point) => {
                let gain = combined_response_with(point.freq, filters, model);
                [
                    row[0].clone(),
                    format!("{:.*}", SPL_DECIMALS, point.spl + gain),
                ]
            }
            None => row.clone(),
        })
        .collect();
    Curve::new(original.header().clone(), rows)
}
