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

mod demo;
mod read_file;
mod read_json;
mod read_text;

// Re-export commonly used functions
pub use demo::{DEMO_DATA, demo_curve};
pub use read_file::{ReadError, load_frequency_response_rows, parse_frequency_response};
pub use read_json::{
    Field, KEY_STRATEGIES, KeyPattern, KeyStrategy, detect_keys, looks_like_header, rows_from_json,
};
pub use read_text::parse_frequency_response_text;
