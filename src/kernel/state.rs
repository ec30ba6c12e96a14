use crate::catalog::{Candidate, CandidateId};
use super::filter::FilterCriteria;

/// Strict state delta. This is the only way session state mutates.
#[derive(Debug, Clone)]
pub enum StateDelta {
    CatalogReplaced(Vec<Candidate>),
    HistoryLoaded,
    CriteriaChanged(FilterCriteria),
    /// Something the queue derives from changed (e.g. a rollback).
    RecomputeRequested,
    /// The queue was rebuilt from the current inputs.
    Recomputed,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    catalog: Vec<Candidate>,
    criteria: FilterCriteria,
    // Latest criteria not yet applied to the queue.
    pending_criteria: Option<FilterCriteria>,
    catalog_loaded: bool,
    history_loaded: bool,
    recompute_pending: bool,
    // Monotonic, bumped on every reduction.
    pub version: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(&mut self, delta: StateDelta) {
        self.version += 1;

        match delta {
            StateDelta::CatalogReplaced(candidates) => {
                self.catalog = candidates;
                self.catalog_loaded = true;
                self.recompute_pending = true;
            }
            StateDelta::HistoryLoaded => {
                self.history_loaded = true;
                self.recompute_pending = true;
            }
            StateDelta::CriteriaChanged(criteria) => {
                self.pending_criteria = Some(criteria);
                self.recompute_pending = true;
            }
            StateDelta::RecomputeRequested => {
                self.recompute_pending = true;
            }
            StateDelta::Recomputed => {
                if let Some(criteria) = self.pending_criteria.take() {
                    self.criteria = criteria;
                }
                self.recompute_pending = false;
            }
        }
    }

    pub fn catalog(&self) -> &[Candidate] {
        &self.catalog
    }

    pub fn candidate(&self, id: &CandidateId) -> Option<&Candidate> {
        self.catalog.iter().find(|c| &c.id == id)
    }

    /// Criteria the current queue was computed with.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn pending_criteria(&self) -> Option<&FilterCriteria> {
        self.pending_criteria.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog_loaded && self.history_loaded
    }

    pub fn recompute_pending(&self) -> bool {
        self.recompute_pending
    }
}
