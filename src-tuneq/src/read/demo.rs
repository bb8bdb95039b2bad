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

use crate::curve::{Curve, FrequencyPoint};

/// Bundled measurement used when no file is loaded: (frequency Hz, SPL dB)
pub const DEMO_DATA: [(f64, f64); 32] = [
    (20.0, 0.0),
    (30.0, 0.5),
    (40.0, 1.0),
    (50.0, 1.2),
    (60.0, 1.5),
    (70.0, 1.7),
    (80.0, 1.9),
    (90.0, 2.0),
    (100.0, 2.2),
    (200.0, 2.5),
    (300.0, 2.3),
    (400.0, 2.0),
    (500.0, 1.5),
    (600.0, 1.0),
    (700.0, 0.5),
    (800.0, 0.0),
    (900.0, -0.5),
    (1000.0, -1.0),
    (2000.0, -2.0),
    (3000.0, -1.0),
    (4000.0, 0.0),
    (5000.0, 1.0),
    (6000.0, 2.0),
    (7000.0, 3.0),
    (8000.0, 4.0),
    (9000.0, 3.0),
    (10000.0, 2.0),
    (12000.0, 1.0),
    (14000.0, 0.0),
    (16000.0, -1.0),
    (18000.0, -2.0),
    (20000.0, -3.0),
];

/// The demo measurement as a curve with the default header.
pub fn demo_curve() -> Curve {
    let points: Vec<FrequencyPoint> = DEMO_DATA
        .iter()
        .map(|&(freq, spl)| FrequencyPoint { freq, spl })
        .collect();
    Curve::from_points(&points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate_frequency_data;

    #[test]
    fn demo_curve_is_valid() {
        let curve = demo_curve();
        assert_eq!(curve.len(), 32);
        let summary = validate_frequency_data(&curve.to_rows()).unwrap();
        assert_eq!(summary.valid_points, 32);
        assert_eq!(summary.out_of_order, 0);
    }
}
