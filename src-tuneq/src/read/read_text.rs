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

use crate::curve::{RawRow, default_header, parse_leading_f64};
use regex::Regex;
use std::sync::LazyLock;

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\t ]+").expect("valid separator regex"));

/// Parse a CSV, TSV or whitespace separated frequency response.
///
/// Lines whose first two fields both start with a number are kept with
/// their original text; everything else (headers, comments, blank lines)
/// is dropped. A default header is prepended when at least one line is
/// kept, otherwise the result is empty.
pub fn parse_frequency_response_text(content: &str) -> Vec<RawRow> {
    let data: Vec<RawRow> = content
        .trim()
        .lines()
        .filter_map(|line| {
            let mut parts = SEPARATOR.split(line.trim());
            let freq = parts.next()?;
            let spl = parts.next()?;
            parse_leading_f64(freq)?;
            parse_leading_f64(spl)?;
            Some([freq.to_string(), spl.to_string()])
        })
        .collect();

    if data.is_empty() {
        return data;
    }
    std::iter::once(default_header()).chain(data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_separators_are_accepted() {
        let content = "Frequency,SPL\n20,1.5\n30\t2.0\n40   -0.5\r\n50, 0\n";
        let rows = parse_frequency_response_text(content);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], default_header());
        assert_eq!(rows[1], ["20".to_string(), "1.5".to_string()]);
        assert_eq!(rows[3], ["40".to_string(), "-0.5".to_string()]);
        assert_eq!(rows[4], ["50".to_string(), "0".to_string()]);
    }

    #[test]
    fn extra_columns_and_comments_are_ignored() {
        let content = "* REW export\n# comment\n100 80.2 -45\n200 81.0 -30\nonly\n";
        let rows = parse_frequency_response_text(content);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], ["200".to_string(), "81.0".to_string()]);
    }

    #[test]
    fn no_numeric_line_gives_nothing() {
        assert!(parse_frequency_response_text("hello\nworld").is_empty());
        assert!(parse_frequency_response_text("").is_empty());
    }
}
