//! tuneq - Parametric EQ curves from manual edits or LLM filter directives
//!
//! This crate turns a measured frequency response into a processed curve by
//! summing the contributions of a set of parametric filters. It integrates:
//!
//! - `tuneq_iir`: filter types and per-filter gain calculations
//! - `tuneq_env`: shared constants and environment handling
//!
//! The filter set is owned by a [`FilterManager`], which recomputes the
//! processed curve after every mutation. Filters can also be driven by
//! directives embedded in LLM replies (see [`directive`]).

// Re-export external crate functionality
pub use tuneq_env as env;
pub use tuneq_iir as iir;

pub use tuneq_iir::{FilterType, ResponseModel};

/// Routing of parsed directives to a filter host
pub mod adapter;
/// Common CLI argument definitions
pub mod cli;
/// Composition of filter responses into processed curves
pub mod compose;
/// Frequency response curves
pub mod curve;
/// Extraction of directives embedded in LLM text
pub mod directive;
/// Processed curve export
pub mod export;
/// Filter model
pub mod filter;
/// Owner of the active filter set
pub mod manager;
/// Dataset reading and normalization
pub mod read;
/// Dataset validation
pub mod validate;

// Re-export commonly used items
pub use adapter::{FilterHost, ManipulationOutcome, apply_manipulation, apply_manipulations};
pub use compose::{combined_response, compose_curve, compose_curve_with};
pub use curve::{Curve, FrequencyPoint, RawRow};
pub use directive::{
    FilterManipulation, ManipulationParams, ManipulationType, SegmentCoverData,
    SegmentCoverItem, filter_context, parse_manipulation_tags, parse_segment_cover_tag,
    strip_manipulation_tags,
};
pub use filter::{Filter, FilterId, FilterPatch, NewFilter};
pub use manager::{FilterManager, FilterState, SharedFilterManager, SharedState};
pub use validate::{Validation, ValidationError, ValidationSummary, validate_frequency_data};
