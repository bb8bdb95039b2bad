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

use crate::directive::{FilterManipulation, ManipulationParams, ManipulationType};
use crate::filter::{Filter, FilterId};

/// Mutation callbacks a host exposes to directives coming from an LLM.
///
/// None of the callbacks may panic on bad input: a rejected directive is
/// reported through the return value.
pub trait FilterHost {
    /// Filters currently applied.
    fn applied_filters(&self) -> Vec<Filter>;

    /// Add a filter; `None` when the parameters are incomplete or no curve
    /// is loaded.
    fn add_filter_from_llm(&mut self, params: Option<&ManipulationParams>) -> Option<FilterId>;

    /// Edit `freq`, `gain` and `qFactor` of filter `id`; any filter type in
    /// `params` is ignored.
    fn edit_filter_from_llm(&mut self, id: &str, params: Option<&ManipulationParams>) -> bool;

    /// Delete filter `id`, `false` when it does not exist.
    fn delete_filter_from_llm(&mut self, id: &str) -> bool;
}

/// What happened to one directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManipulationOutcome {
    Added(FilterId),
    Edited(FilterId),
    Deleted(FilterId),
    Rejected(String),
}

impl ManipulationOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, ManipulationOutcome::Rejected(_))
    }
}

/// Route one directive to the matching host callback.
pub fn apply_manipulation<H: FilterHost + ?Sized>(
    host: &mut H,
    manipulation: &FilterManipulation,
) -> ManipulationOutcome {
    let params = manipulation.filter_params.as_ref();
    let id = manipulation.filter_id.as_deref().filter(|id| !id.is_empty());

    match manipulation.manipulation_type {
        ManipulationType::Add => {
            if params.is_none() {
                return ManipulationOutcome::Rejected("add without filterParams".to_string());
            }
            match host.add_filter_from_llm(params) {
                Some(new_id) => ManipulationOutcome::Added(new_id),
                None => ManipulationOutcome::Rejected("filter could not be added".to_string()),
            }
        }
        ManipulationType::Edit => {
            let (Some(id), Some(_)) = (id, params) else {
                return ManipulationOutcome::Rejected(
                    "edit needs filterId and filterParams".to_string(),
                );
            };
            if host.edit_filter_from_llm(id, params) {
                ManipulationOutcome::Edited(FilterId::from(id))
            } else {
                ManipulationOutcome::Rejected(format!("no filter with id {}", id))
            }
        }
        ManipulationType::Delete => {
            let Some(id) = id else {
                return ManipulationOutcome::Rejected("delete without filterId".to_string());
            };
            if host.delete_filter_from_llm(id) {
                ManipulationOutcome::Deleted(FilterId::from(id))
            } else {
                ManipulationOutcome::Rejected(format!("no filter with id {}", id))
            }
        }
    }
}

/// Apply a batch of directives in order. A rejected directive does not stop
/// the ones after it.
pub fn apply_manipulations<H: FilterHost + ?Sized>(
    host: &mut H,
    manipulations: &[FilterManipulation],
) -> Vec<ManipulationOutcome> {
    manipulations
        .iter()
        .map(|manipulation| {
            let outcome = apply_manipulation(host, manipulation);
            if let ManipulationOutcome::Rejected(reason) = &outcome {
                log::warn!("directive {:?} rejected: {}", manipulation.manipulation_type, reason);
            }
            outcome
        })
        .collect()
}
