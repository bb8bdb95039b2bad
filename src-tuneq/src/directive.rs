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
//!
//! Directives are JSON objects wrapped in tags inside free-form LLM text:
//!
//! ```text
//! Boosting the bass a little.
//! <freq_manipulation>
//! {"manipulationType": "add", "filterParams": {"filterType": "low_shelf", "freq": 100, "gain": 3}}
//! </freq_manipulation>
//! ```
//!
//! Tags are flat (no nesting, no escaping), so a non-greedy regex per tag
//! kind is enough.

use crate::filter::{Filter, FilterPatch};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tuneq_iir::FilterType;

static MANIPULATION_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<freq_manipulation>(.*?)</freq_manipulation>")
        .expect("valid manipulation tag regex")
});

static SEGMENT_COVER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<segment_cover>(.*?)</segment_cover>").expect("valid segment cover regex")
});

/// Kind of change a directive asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulationType {
    Add,
    Edit,
    Delete,
}

/// Filter parameters carried by a directive; every field is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_type: Option<FilterType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_factor: Option<f64>,
}

impl ManipulationParams {
    /// The editable part of the parameters; `filter_type` is dropped.
    pub fn patch(&self) -> FilterPatch {
        FilterPatch {
            freq: self.freq,
            gain: self.gain,
            q_factor: self.q_factor,
        }
    }
}

/// One `<freq_manipulation>` directive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterManipulation {
    pub manipulation_type: ManipulationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_params: Option<ManipulationParams>,
}

/// One suggested product covering a frequency segment.
///
/// Every field is optional on input; a missing range reads as `[0, 0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCoverItem {
    #[serde(default)]
    pub frequency_range: [f64; 2],
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default, rename = "dataGroup")]
    pub data_group: String,
}

/// Content of a `<segment_cover>` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSegmentCoverData")]
pub struct SegmentCoverData {
    pub data_list: Vec<SegmentCoverItem>,
}

/// Wire form of a segment cover body; either list name may be present.
#[derive(Deserialize)]
struct RawSegmentCoverData {
    #[serde(default)]
    data_list: Option<Vec<SegmentCoverItem>>,
    #[serde(default, rename = "dataList")]
    data_list_camel: Option<Vec<SegmentCoverItem>>,
}

impl TryFrom<RawSegmentCoverData> for SegmentCoverData {
    type Error = String;

    /// `data_list` wins when both names are given.
    fn try_from(raw: RawSegmentCoverData) -> Result<Self, Self::Error> {
        raw.data_list
            .or(raw.data_list_camel)
            .map(|data_list| SegmentCoverData { data_list })
            .ok_or_else(|| "segment cover needs a data_list or dataList array".to_string())
    }
}

/// Extract every `<freq_manipulation>` directive of `content`, in document order.
///
/// A tag whose body is not a valid directive is logged and dropped; the
/// remaining tags are still returned.
pub fn parse_manipulation_tags(content: &str) -> Vec<FilterManipulation> {
    MANIPULATION_TAG
        .captures_iter(content)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str().trim();
            match serde_json::from_str::<FilterManipulation>(body) {
                Ok(manipulation) => Some(manipulation),
                Err(e) => {
                    log::error!("Error parsing manipulation tag JSON: {} ({})", e, body);
                    None
                }
            }
        })
        .collect()
}

/// Extract the first `<segment_cover>` tag of `content`.
///
/// Accepts `data_list` or `dataList`. Returns `None` when there is no tag
/// or its body is invalid.
pub fn parse_segment_cover_tag(content: &str) -> Option<SegmentCoverData> {
    let caps = SEGMENT_COVER_TAG.captures(content)?;
    let body = caps.get(1)?.as_str().trim();
    match serde_json::from_str::<SegmentCoverData>(body) {
        Ok(data) => Some(data),
        Err(e) => {
            log::error!("Error parsing segment cover tag JSON: {}", e);
            None
        }
    }
}

/// Text of `content` with every `<freq_manipulation>` tag removed.
pub fn strip_manipulation_tags(content: &str) -> String {
    MANIPULATION_TAG.replace_all(content, "").trim().to_string()
}

/// Describe the active filters for inclusion in an LLM prompt.
///
/// The listed ids are the ones a directive must use to edit or delete a filter.
pub fn filter_context(filters: &[Filter]) -> String {
    if filters.is_empty() {
        return "No filters are currently applied.".to_string();
    }

    let lines: Vec<String> = filters
        .iter()
        .map(|filter| {
            let mut parts = vec![
                format!("- id: \"{}\", type: \"{}\"", filter.id(), filter.filter_type()),
                format!("freq: {}", filter.freq()),
            ];
            if let Some(gain) = filter.gain() {
                parts.push(format!("gain: {}", gain));
            }
            if let Some(q) = filter.q_factor() {
                parts.push(format!("qFactor: {}", q));
            }
            parts.join(", ")
        })
        .collect();

    format!(
        "Current active filters:\n{}\n(Use the 'id' listed above when you suggest editing or deleting a filter.)",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::NewFilter;

    #[test]
    fn two_good_tags_and_one_malformed() {
        let text = r#"Here is my suggestion.
<freq_manipulation>
{"manipulationType": "add", "filterParams": {"filterType": "peaking", "freq": 1000, "gain": -3, "qFactor": 2}}
</freq_manipulation>
Something in between.
<freq_manipulation>{"manipulationType": "edit", "filterId": oops}</freq_manipulation>
<freq_manipulation>{"manipulationType": "delete", "filterId": "abc"}</freq_manipulation>
Done."#;
        let parsed = parse_manipulation_tags(text);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].manipulation_type, ManipulationType::Add);
        let params = parsed[0].filter_params.unwrap();
        assert_eq!(params.filter_type, Some(FilterType::Peaking));
        assert_eq!(params.freq, Some(1_000.0));
        assert_eq!(params.gain, Some(-3.0));
        assert_eq!(params.q_factor, Some(2.0));
        assert_eq!(parsed[1].manipulation_type, ManipulationType::Delete);
        assert_eq!(parsed[1].filter_id.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_manipulation_type_is_dropped() {
        let text = r#"<freq_manipulation>{"manipulationType": "rotate"}</freq_manipulation>"#;
        assert!(parse_manipulation_tags(text).is_empty());
    }

    #[test]
    fn text_without_tags_has_no_directives() {
        assert!(parse_manipulation_tags("just chatting about bass").is_empty());
        assert!(parse_segment_cover_tag("nothing here").is_none());
    }

    #[test]
    fn tags_are_not_greedy() {
        let text = "<freq_manipulation>{\"manipulationType\":\"delete\",\"filterId\":\"a\"}</freq_manipulation> and <freq_manipulation>{\"manipulationType\":\"delete\",\"filterId\":\"b\"}</freq_manipulation>";
        let ids: Vec<_> = parse_manipulation_tags(text)
            .into_iter()
            .filter_map(|m| m.filter_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn segment_cover_accepts_both_list_names() {
        let snake = r#"<segment_cover>{"data_list": [{"frequency_range": [20, 200], "name": "Sub", "uuid": "u1", "dataGroup": "g"}]}</segment_cover>"#;
        let camel = r#"<segment_cover>{"dataList": [{"frequency_range": [20, 200], "name": "Sub", "uuid": "u1", "dataGroup": "g"}]}</segment_cover>"#;
        let a = parse_segment_cover_tag(snake).unwrap();
        let b = parse_segment_cover_tag(camel).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.data_list[0].frequency_range, [20.0, 200.0]);
        assert_eq!(a.data_list[0].data_group, "g");
    }

    #[test]
    fn segment_cover_with_both_list_names() {
        let text = r#"<segment_cover>{"data_list": [{"frequency_range": [20, 200], "name": "Sub"}], "dataList": [{"frequency_range": [2000, 8000], "name": "Tweeter"}]}</segment_cover>"#;
        let data = parse_segment_cover_tag(text).unwrap();
        assert_eq!(data.data_list.len(), 1);
        assert_eq!(data.data_list[0].name, "Sub");

        let text = r#"<segment_cover>{"data_list": null, "dataList": [{"name": "Mid"}]}</segment_cover>"#;
        assert_eq!(parse_segment_cover_tag(text).unwrap().data_list[0].name, "Mid");
    }

    #[test]
    fn segment_cover_item_without_range() {
        let text = r#"<segment_cover>{"dataList": [{"name": "Any"}, {"frequency_range": [100, 300]}]}</segment_cover>"#;
        let data = parse_segment_cover_tag(text).unwrap();
        assert_eq!(data.data_list.len(), 2);
        assert_eq!(data.data_list[0].frequency_range, [0.0, 0.0]);
        assert_eq!(data.data_list[1].frequency_range, [100.0, 300.0]);
    }

    #[test]
    fn segment_cover_without_list_is_rejected() {
        assert!(parse_segment_cover_tag("<segment_cover>{\"data_list\": 3}</segment_cover>").is_none());
        assert!(parse_segment_cover_tag("<segment_cover>{}</segment_cover>").is_none());
    }

    #[test]
    fn strip_removes_directives_only() {
        let text = "Try this:\n<freq_manipulation>{}</freq_manipulation>\n";
        assert_eq!(strip_manipulation_tags(text), "Try this:");
    }

    #[test]
    fn params_patch_drops_type() {
        let params = ManipulationParams {
            filter_type: Some(FilterType::Highpass),
            freq: Some(80.0),
            gain: None,
            q_factor: Some(0.5),
        };
        let patch = params.patch();
        assert_eq!(patch.freq, Some(80.0));
        assert_eq!(patch.q_factor, Some(0.5));
        assert!(patch.gain.is_none());
    }

    #[test]
    fn context_lists_filters() {
        assert_eq!(filter_context(&[]), "No filters are currently applied.");
        let shelf = Filter::create(NewFilter::low_shelf(100.0, 3.0));
        let text = filter_context(std::slice::from_ref(&shelf));
        assert!(text.contains(&format!(
            "- id: \"{}\", type: \"low_shelf\", freq: 100, gain: 3",
            shelf.id()
        )));
        assert!(!text.contains("qFactor"));
    }
}
