//! tuneq - Parametric EQ curves from manual edits or LLM filter directives
//! Command-line interface definitions for the tuneq binary
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

use crate::filter::NewFilter;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tuneq_iir::{DEFAULT_Q_HIGH_LOW_PASS, FilterType, ResponseModel};

/// Q used for a peaking filter given without one
pub const DEFAULT_PEAKING_Q: f64 = 1.0;

/// CLI arguments for the tuneq binary.
#[derive(Parser, Debug, Clone)]
#[command(author, about, long_about = None)]
pub struct Args {
    /// Path to the measured curve (CSV, TSV, whitespace separated text or JSON).
    #[arg(short, long)]
    pub curve: Option<PathBuf>,

    /// Use the bundled demo measurement instead of a file.
    #[arg(long, default_value_t = false)]
    pub demo: bool,

    /// Filter to apply, may be repeated.
    /// Format: type:freq[:gain][:q], e.g. peaking:1000:-3:2, low_shelf:100:4, highpass:80:0.7
    #[arg(short, long = "filter", value_parser = parse_filter_spec)]
    pub filters: Vec<NewFilter>,

    /// Text file holding an LLM reply with <freq_manipulation> directives.
    #[arg(short, long)]
    pub directives: Option<PathBuf>,

    /// Output CSV file for the processed curve.
    /// Defaults to $TUNEQ_DIR/data_generated/processed.csv, or stdout when TUNEQ_DIR is not set.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the final state (original data, filters, processed curve) as JSON.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Use the exact biquad magnitude for shelves and pass filters.
    #[arg(long, default_value_t = false)]
    pub exact: bool,

    /// Print the filter context block used in LLM prompts and exit.
    #[arg(long, default_value_t = false)]
    pub print_context: bool,
}

impl Args {
    pub fn response_model(&self) -> ResponseModel {
        if self.exact {
            ResponseModel::Exact
        } else {
            ResponseModel::Simplified
        }
    }
}

/// Validate CLI arguments
pub fn validate_args(args: &Args) -> Result<(), String> {
    match (&args.curve, args.demo) {
        (Some(_), true) => Err("--curve and --demo are mutually exclusive".to_string()),
        (None, false) => Err("either --curve or --demo is required".to_string()),
        _ => Ok(()),
    }
}

/// Validate arguments and exit with error if validation fails
pub fn validate_args_or_exit(args: &Args) {
    if let Err(error) = validate_args(args) {
        eprintln!("Validation Error: {}", error);
        process::exit(1);
    }
}

/// Parse a filter given as `type:freq[:gain][:q]`.
///
/// Gain is required for peaking and shelf filters. Pass filters take no
/// gain, so their third field is the Q.
pub fn parse_filter_spec(s: &str) -> Result<NewFilter, String> {
    let fields: Vec<&str> = s.split(':').map(str::trim).collect();
    if fields.len() < 2 {
        return Err(format!("invalid filter '{s}': expected type:freq[:gain][:q]"));
    }
    let filter_type: FilterType = fields[0].parse().map_err(|e| format!("{e}"))?;
    let freq = parse_strictly_positive_f64(fields[1])?;
    let rest = &fields[2..];

    match filter_type {
        FilterType::Peaking => {
            let [gain, q @ ..] = rest else {
                return Err(format!("peaking filter '{s}' needs a gain"));
            };
            let q = match q {
                [] => DEFAULT_PEAKING_Q,
                [q] => parse_strictly_positive_f64(q)?,
                _ => return Err(format!("too many fields in '{s}'")),
            };
            Ok(NewFilter::peaking(freq, parse_f64(gain)?, q))
        }
        FilterType::LowShelf | FilterType::HighShelf => {
            let [gain] = rest else {
                return Err(format!("shelf filter '{s}' needs exactly a gain"));
            };
            let gain = parse_f64(gain)?;
            Ok(if filter_type == FilterType::LowShelf {
                NewFilter::low_shelf(freq, gain)
            } else {
                NewFilter::high_shelf(freq, gain)
            })
        }
        FilterType::Lowpass | FilterType::Highpass => {
            let q = match rest {
                [] => DEFAULT_Q_HIGH_LOW_PASS,
                [q] => parse_strictly_positive_f64(q)?,
                _ => return Err(format!("pass filter '{s}' takes at most a Q")),
            };
            Ok(if filter_type == FilterType::Lowpass {
                NewFilter::lowpass(freq, q)
            } else {
                NewFilter::highpass(freq, q)
            })
        }
    }
}

fn parse_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|_| format!("invalid float: {s}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("value must be finite: {s}"))
    }
}

// Custom value parser to enforce strictly positive f64 (> 0)
fn parse_strictly_positive_f64(s: &str) -> Result<f64, String> {
    let v = parse_f64(s)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err("value must be strictly positive (> 0)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let args = Args::parse_from(["tuneq-test", "--demo"]);
        assert!(args.demo);
        assert!(args.filters.is_empty());
        assert_eq!(args.response_model(), ResponseModel::Simplified);
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn repeated_filters_keep_order() {
        let args = Args::parse_from([
            "tuneq-test",
            "--demo",
            "--filter",
            "peaking:1000:-3:2",
            "-f",
            "LS:100:4",
            "--filter",
            "highpass:80",
        ]);
        assert_eq!(
            args.filters,
            vec![
                NewFilter::peaking(1_000.0, -3.0, 2.0),
                NewFilter::low_shelf(100.0, 4.0),
                NewFilter::highpass(80.0, DEFAULT_Q_HIGH_LOW_PASS),
            ]
        );
    }

    #[test]
    fn filter_spec_defaults_and_errors() {
        assert_eq!(
            parse_filter_spec("peaking:500:2").unwrap(),
            NewFilter::peaking(500.0, 2.0, DEFAULT_PEAKING_Q)
        );
        assert_eq!(
            parse_filter_spec("lowpass:8000:0.5").unwrap(),
            NewFilter::lowpass(8_000.0, 0.5)
        );
        assert!(parse_filter_spec("peaking:500").is_err());
        assert!(parse_filter_spec("high_shelf:5000").is_err());
        assert!(parse_filter_spec("notch:500:1").is_err());
        assert!(parse_filter_spec("peaking:0:1").is_err());
        assert!(parse_filter_spec("lowpass:8000:-1").is_err());
        assert!(parse_filter_spec("peaking:500:nan").is_err());
    }

    #[test]
    fn bad_filter_is_rejected_by_clap() {
        let res = Args::try_parse_from(["tuneq-test", "--demo", "--filter", "peaking:abc:1"]);
        assert!(res.is_err());
    }

    #[test]
    fn curve_and_demo_are_exclusive() {
        let both = Args::parse_from(["tuneq-test", "--demo", "--curve", "x.csv"]);
        assert!(validate_args(&both).is_err());
        let none = Args::parse_from(["tuneq-test"]);
        assert!(validate_args(&none).is_err());
    }

    #[test]
    fn exact_flag_selects_model() {
        let args = Args::parse_from(["tuneq-test", "--demo", "--exact"]);
        assert_eq!(args.response_model(), ResponseModel::Exact);
    }
}
