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

use crate::adapter::{FilterHost, ManipulationOutcome, apply_manipulation, apply_manipulations};
use crate::compose::compose_curve_with;
use crate::curve::Curve;
use crate::directive::{FilterManipulation, ManipulationParams};
use crate::filter::{Filter, FilterId, FilterPatch, NewFilter};
use crate::validate::{ValidationError, ValidationSummary};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tuneq_iir::ResponseModel;

/// Snapshot of the shared state handed to hosts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedState {
    pub original_data_source: Option<Curve>,
    pub applied_filters: Vec<Filter>,
    pub current_processed_curve: Option<Curve>,
}

/// State owned by a [`FilterManager`]
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    original: Option<Curve>,
    filters: Vec<Filter>,
    processed: Option<Curve>,
    global_error: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State restored from a snapshot. The processed curve is not trusted
    /// and will be recomputed by the manager. Filters reusing an id already
    /// seen are dropped.
    pub fn from_snapshot(snapshot: SharedState) -> Self {
        let mut seen = HashSet::new();
        let filters = snapshot
            .applied_filters
            .into_iter()
            .filter(|filter| {
                let fresh = seen.insert(filter.id().clone());
                if !fresh {
                    log::warn!("dropping filter with duplicate id {} from snapshot", filter.id());
                }
                fresh
            })
            .collect();
        FilterState {
            original: snapshot.original_data_source,
            filters,
            processed: None,
            global_error: None,
        }
    }
}

/// Owner of the active filter set.
///
/// Every mutation recomputes the processed curve in full from the
/// original curve and the filter set before returning.
#[derive(Debug, Clone, Default)]
pub struct FilterManager {
    state: FilterState,
    model: ResponseModel,
}

impl FilterManager {
    /// Manager with an empty state.
    pub fn new() -> Self {
        Self::with_state(FilterState::new())
    }

    /// Manager owning `state`.
    pub fn with_state(state: FilterState) -> Self {
        let mut manager = FilterManager {
            state,
            model: ResponseModel::default(),
        };
        manager.recompute();
        manager
    }

    /// Use `model` for every recomputation.
    pub fn with_model(mut self, model: ResponseModel) -> Self {
        self.model = model;
        self.recompute();
        self
    }

    pub fn model(&self) -> ResponseModel {
        self.model
    }

    pub fn original_curve(&self) -> Option<&Curve> {
        self.state.original.as_ref()
    }

    pub fn processed_curve(&self) -> Option<&Curve> {
        self.state.processed.as_ref()
    }

    pub fn filters(&self) -> &[Filter] {
        &self.state.filters
    }

    pub fn filter(&self, id: &FilterId) -> Option<&Filter> {
        self.state.filters.iter().find(|f| f.id() == id)
    }

    /// Last dataset error, cleared by a successful load.
    pub fn global_error(&self) -> Option<&str> {
        self.state.global_error.as_deref()
    }

    pub fn snapshot(&self) -> SharedState {
        SharedState {
            original_data_source: self.state.original.clone(),
            applied_filters: self.state.filters.clone(),
            current_processed_curve: self.state.processed.clone(),
        }
    }

    /// Validate `rows` (header first) and make them the original curve.
    ///
    /// On success the filter set is cleared and the processed curve equals
    /// the original. On failure the current state is kept and the reason is
    /// stored as the global error.
    pub fn set_original_data<R, S>(&mut self, rows: &[R]) -> Result<ValidationSummary, ValidationError>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        match Curve::from_rows(rows) {
            Ok((curve, summary)) => {
                self.set_original_curve(curve);
                Ok(summary)
            }
            Err(e) => {
                self.state.global_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replace the original curve with an already validated one.
    pub fn set_original_curve(&mut self, curve: Curve) {
        log::info!("loaded original curve with {} rows", curve.len());
        // no filters yet: processed is the original, text included
        self.state.processed = Some(curve.clone());
        self.state.original = Some(curve);
        self.state.filters.clear();
        self.state.global_error = None;
    }

    /// Forget the curve, the filters and any error.
    pub fn reset(&mut self) {
        self.state = FilterState::new();
    }

    /// Add a filter and return its id; `None` when no curve is loaded.
    pub fn add_filter(&mut self, params: NewFilter) -> Option<FilterId> {
        if self.state.original.is_none() {
            log::warn!("cannot add a filter before a curve is loaded");
            return None;
        }
        let filter = Filter::create(params);
        let id = filter.id().clone();
        log::debug!("add filter {} ({})", id, filter);
        self.state.filters.push(filter);
        self.recompute();
        Some(id)
    }

    /// Remove filter `id` if present.
    pub fn delete_filter(&mut self, id: &FilterId) {
        let before = self.state.filters.len();
        self.state.filters.retain(|f| f.id() != id);
        if self.state.filters.len() != before {
            log::debug!("deleted filter {}", id);
        }
        self.recompute();
    }

    /// Update frequency, gain and/or Q of filter `id`.
    ///
    /// Returns `false` when no curve is loaded or the id is unknown.
    pub fn edit_filter(&mut self, id: &FilterId, patch: &FilterPatch) -> bool {
        if self.state.original.is_none() {
            return false;
        }
        let Some(filter) = self.state.filters.iter_mut().find(|f| f.id() == id) else {
            return false;
        };
        filter.apply_patch(patch);
        log::debug!("edited filter {} ({})", id, filter);
        self.recompute();
        true
    }

    /// Add a filter described by an LLM directive.
    ///
    /// Parameters without a filter type or frequency are logged and ignored.
    pub fn add_filter_from_llm(&mut self, params: Option<&ManipulationParams>) -> Option<FilterId> {
        let Some(params) = params else {
            log::error!("missing filter parameters from LLM");
            return None;
        };
        let (Some(filter_type), Some(freq)) = (params.filter_type, params.freq) else {
            log::error!("invalid filter parameters from LLM: {:?}", params);
            return None;
        };
        self.add_filter(NewFilter {
            filter_type,
            freq,
            gain: params.gain,
            q_factor: params.q_factor,
        })
    }

    /// Edit a filter from an LLM directive; the filter type is never changed.
    pub fn edit_filter_from_llm(&mut self, id: &str, params: Option<&ManipulationParams>) -> bool {
        let Some(params) = params else {
            return false;
        };
        if id.is_empty() {
            return false;
        }
        self.edit_filter(&FilterId::from(id), &params.patch())
    }

    /// Delete a filter from an LLM directive; `false` when it does not exist.
    pub fn delete_filter_from_llm(&mut self, id: &str) -> bool {
        let id = FilterId::from(id);
        if self.filter(&id).is_none() {
            log::warn!("LLM tried to delete unknown filter id: {}", id);
            return false;
        }
        self.delete_filter(&id);
        true
    }

    /// Apply one parsed directive.
    pub fn apply_manipulation(&mut self, manipulation: &FilterManipulation) -> ManipulationOutcome {
        apply_manipulation(self, manipulation)
    }

    /// Apply parsed directives in document order.
    pub fn apply_manipulations(
        &mut self,
        manipulations: &[FilterManipulation],
    ) -> Vec<ManipulationOutcome> {
        apply_manipulations(self, manipulations)
    }

    fn recompute(&mut self) {
        self.state.processed = self
            .state
            .original
            .as_ref()
            .map(|original| compose_curve_with(original, &self.state.filters, self.model));
    }
}

impl FilterHost for FilterManager {
    fn applied_filters(&self) -> Vec<Filter> {
        self.state.filters.clone()
    }

    fn add_filter_from_llm(&mut self, params: Option<&ManipulationParams>) -> Option<FilterId> {
        FilterManager::add_filter_from_llm(self, params)
    }

    fn edit_filter_from_llm(&mut self, id: &str, params: Option<&ManipulationParams>) -> bool {
        FilterManager::edit_filter_from_llm(self, id, params)
    }

    fn delete_filter_from_llm(&mut self, id: &str) -> bool {
        FilterManager::delete_filter_from_llm(self, id)
    }
}

/// Handle to a [`FilterManager`] shared between threads.
///
/// Each mutation holds the lock for the whole recomputation, so concurrent
/// writers never work on a stale copy of the filter set.
#[derive(Debug, Clone, Default)]
pub struct SharedFilterManager {
    inner: Arc<Mutex<FilterManager>>,
}

impl SharedFilterManager {
    pub fn new(manager: FilterManager) -> Self {
        SharedFilterManager {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with<T>(&self, f: impl FnOnce(&mut FilterManager) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn snapshot(&self) -> SharedState {
        self.inner.lock().snapshot()
    }

    pub fn add_filter(&self, params: NewFilter) -> Option<FilterId> {
        self.inner.lock().add_filter(params)
    }

    pub fn delete_filter(&self, id: &FilterId) {
        self.inner.lock().delete_filter(id)
    }

    pub fn edit_filter(&self, id: &FilterId, patch: &FilterPatch) -> bool {
        self.inner.lock().edit_filter(id, patch)
    }

    /// Apply a batch of directives atomically with respect to other writers.
    pub fn apply_manipulations(&self, manipulations: &[FilterManipulation]) -> Vec<ManipulationOutcome> {
        self.inner.lock().apply_manipulations(manipulations)
    }
}

impl FilterHost for SharedFilterManager {
    fn applied_filters(&self) -> Vec<Filter> {
        self.inner.lock().applied_filters()
    }

    fn add_filter_from_llm(&mut self, params: Option<&ManipulationParams>) -> Option<FilterId> {
        self.inner.lock().add_filter_from_llm(params)
    }

    fn edit_filter_from_llm(&mut self, id: &str, params: Option<&ManipulationParams>) -> bool {
        self.inner.lock().edit_filter_from_llm(id, params)
    }

    fn delete_filter_from_llm(&mut self, id: &str) -> bool {
        self.inner.lock().delete_filter_from_llm(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuneq_iir::FilterType;

    fn flat_rows(n: usize) -> Vec<[String; 2]> {
        let mut rows = vec![["Freq(Hz)".to_string(), "SPL(dB)".to_string()]];
        for i in 1..=n {
            rows.push([(i * 100).to_string(), "0".to_string()]);
        }
        rows
    }

    fn loaded() -> FilterManager {
        let mut manager = FilterManager::new();
        manager.set_original_data(&flat_rows(12)).unwrap();
        manager
    }

    #[test]
    fn add_requires_a_loaded_curve() {
        let mut manager = FilterManager::new();
        assert!(manager.add_filter(NewFilter::peaking(1_000.0, 6.0, 1.0)).is_none());
        assert!(manager.filters().is_empty());
        assert!(manager.processed_curve().is_none());
    }

    #[test]
    fn loading_a_curve_sets_processed_to_original() {
        let manager = loaded();
        assert_eq!(manager.processed_curve(), manager.original_curve());
        assert!(manager.global_error().is_none());
    }

    #[test]
    fn loading_keeps_original_text() {
        let mut manager = FilterManager::new();
        let mut rows = flat_rows(11);
        rows[1][1] = "1.5".to_string();
        manager.set_original_data(&rows).unwrap();
        let processed = manager.processed_curve().unwrap();
        assert_eq!(processed.rows()[0][1], "1.5");
        assert_eq!(processed.rows()[1][1], "0");
    }

    #[test]
    fn snapshot_with_duplicate_ids_keeps_first() {
        let manager = loaded();
        let mut snapshot = manager.snapshot();
        let first = Filter::create(NewFilter::low_shelf(100.0, 3.0));
        let twin: Filter = serde_json::from_value(serde_json::json!({
            "id": first.id().as_str(),
            "type": "peaking",
            "freq": 1000.0,
            "gain": 6.0,
            "qFactor": 1.0
        }))
        .unwrap();
        snapshot.applied_filters = vec![first.clone(), twin];

        let restored = FilterManager::with_state(FilterState::from_snapshot(snapshot));
        assert_eq!(restored.filters(), std::slice::from_ref(&first));
    }

    #[test]
    fn invalid_data_keeps_previous_state() {
        let mut manager = loaded();
        manager.add_filter(NewFilter::low_shelf(150.0, 2.0)).unwrap();
        let before = manager.snapshot();
        let err = manager.set_original_data(&flat_rows(3)).unwrap_err();
        assert!(matches!(err, ValidationError::TooFewPoints { found: 3, .. }));
        assert_eq!(manager.snapshot(), before);
        assert!(manager.global_error().unwrap().contains("at least 10"));
    }

    #[test]
    fn replacing_the_curve_clears_filters() {
        let mut manager = loaded();
        manager.add_filter(NewFilter::low_shelf(150.0, 2.0)).unwrap();
        manager.set_original_data(&flat_rows(20)).unwrap();
        assert!(manager.filters().is_empty());
        assert_eq!(manager.processed_curve().unwrap().len(), 20);
    }

    #[test]
    fn every_mutation_recomputes() {
        let mut manager = loaded();
        let id = manager.add_filter(NewFilter::low_shelf(300.0, 3.0)).unwrap();
        let processed = manager.processed_curve().unwrap();
        assert_eq!(processed.rows()[0][1], "3.00");

        assert!(manager.edit_filter(
            &id,
            &FilterPatch {
                gain: Some(-2.0),
                ..Default::default()
            }
        ));
        assert_eq!(manager.processed_curve().unwrap().rows()[0][1], "-2.00");

        manager.delete_filter(&id);
        assert_eq!(manager.processed_curve().unwrap().rows()[0][1], "0.00");
        assert!(manager.filters().is_empty());
    }

    #[test]
    fn deleting_unknown_id_is_a_no_op() {
        let mut manager = loaded();
        manager.add_filter(NewFilter::peaking(1_000.0, 6.0, 1.0)).unwrap();
        let before = manager.snapshot();
        manager.delete_filter(&FilterId::generate());
        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn edit_unknown_id_fails() {
        let mut manager = loaded();
        assert!(!manager.edit_filter(&FilterId::generate(), &FilterPatch::default()));
    }

    #[test]
    fn llm_edit_never_changes_type() {
        let mut manager = loaded();
        let id = manager.add_filter(NewFilter::peaking(1_000.0, 6.0, 1.0)).unwrap();
        let params = ManipulationParams {
            filter_type: Some(FilterType::Lowpass),
            freq: Some(2_000.0),
            gain: None,
            q_factor: None,
        };
        assert!(manager.edit_filter_from_llm(id.as_str(), Some(&params)));
        let filter = manager.filter(&id).unwrap();
        assert_eq!(filter.filter_type(), FilterType::Peaking);
        assert_eq!(filter.freq(), 2_000.0);
        assert_eq!(filter.gain(), Some(6.0));
    }

    #[test]
    fn llm_add_requires_type_and_freq() {
        let mut manager = loaded();
        let missing_type = ManipulationParams {
            freq: Some(100.0),
            gain: Some(3.0),
            ..Default::default()
        };
        assert!(manager.add_filter_from_llm(Some(&missing_type)).is_none());
        let missing_freq = ManipulationParams {
            filter_type: Some(FilterType::LowShelf),
            gain: Some(3.0),
            ..Default::default()
        };
        assert!(manager.add_filter_from_llm(Some(&missing_freq)).is_none());
        assert!(manager.add_filter_from_llm(None).is_none());
        assert!(manager.filters().is_empty());

        let ok = ManipulationParams {
            filter_type: Some(FilterType::LowShelf),
            freq: Some(100.0),
            gain: Some(3.0),
            q_factor: None,
        };
        let id = manager.add_filter_from_llm(Some(&ok)).unwrap();
        assert_eq!(manager.filter(&id).unwrap().filter_type(), FilterType::LowShelf);
    }

    #[test]
    fn llm_delete_reports_unknown_ids() {
        let mut manager = loaded();
        assert!(!manager.delete_filter_from_llm("nope"));
        let id = manager.add_filter(NewFilter::highpass(80.0, 0.7)).unwrap();
        assert!(manager.delete_filter_from_llm(id.as_str()));
        assert!(manager.filters().is_empty());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut manager = loaded();
        manager.add_filter(NewFilter::highpass(80.0, 0.7)).unwrap();
        manager.reset();
        assert!(manager.original_curve().is_none());
        assert!(manager.processed_curve().is_none());
        assert!(manager.filters().is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_state() {
        let mut manager = loaded();
        manager.add_filter(NewFilter::low_shelf(250.0, 1.5)).unwrap();
        let snapshot = manager.snapshot();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("originalDataSource").is_some());
        assert_eq!(json["appliedFilters"][0]["type"], "low_shelf");

        let restored: SharedState = serde_json::from_value(json).unwrap();
        let manager2 = FilterManager::with_state(FilterState::from_snapshot(restored));
        assert_eq!(manager2.snapshot(), snapshot);
    }

    #[test]
    fn exact_model_changes_shelf_values() {
        let mut manager = loaded().with_model(ResponseModel::Exact);
        manager.add_filter(NewFilter::low_shelf(300.0, 3.0)).unwrap();
        // simplified model gives exactly 3.00 at 100 Hz
        assert_ne!(manager.processed_curve().unwrap().rows()[0][1], "3.00");
    }

    #[test]
    fn shared_manager_serializes_concurrent_adds() {
        let shared = SharedFilterManager::new(loaded());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        let freq = 100.0 + (i * 10 + j) as f64;
                        shared.add_filter(NewFilter::peaking(freq, 1.0, 1.0)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(shared.snapshot().applied_filters.len(), 80);
    }
}
