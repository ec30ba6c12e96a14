//! Decision recorder: exactly-once bookkeeping in front of the external
//! decision log.
//!
//! A commit is applied optimistically (the candidate leaves the queue at
//! once) and only becomes `Recorded` when the log confirms it. A failed
//! write removes the optimistic entry again, so a decision is always either
//! fully visible or fully absent.

use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::filter::DecisionIndex;
use super::time::Tick;
use crate::catalog::{Candidate, CandidateId};
use crate::decisions::{Decision, Direction, SubjectId};

/// Instruction for the driver to write one decision to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistRequest {
    pub request_id: Uuid,
    pub subject: SubjectId,
    pub candidate: CandidateId,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressedCommit {
    InFlight(Direction),
    Recorded(Direction),
}

impl SuppressedCommit {
    pub fn direction(self) -> Direction {
        match self {
            Self::InFlight(d) | Self::Recorded(d) => d,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Issued(PersistRequest),
    /// Duplicate commit. Resolves to the earlier decision; nothing is written.
    Suppressed(SuppressedCommit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStatus {
    Undecided,
    InFlight(Direction),
    Recorded(Direction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub decision: Decision,
    pub latency_ticks: u64,
}

/// Result of merging a listed history into the recorder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryMerge {
    /// Entries that were not known before.
    pub merged: usize,
    /// Decisions that settled one of this session's own in-flight commits.
    /// Their write completion will resolve as a duplicate.
    pub resolved: Vec<Decision>,
}

#[derive(Debug, Clone)]
struct InFlight {
    request_id: Uuid,
    direction: Direction,
    issued_at: Tick,
}

#[derive(Debug, Clone)]
pub struct DecisionRecorder {
    subject: SubjectId,
    recorded: HashMap<CandidateId, Decision>,
    in_flight: HashMap<CandidateId, InFlight>,
}

impl DecisionRecorder {
    pub fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            recorded: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    pub fn status(&self, candidate: &CandidateId) -> DecisionStatus {
        if let Some(decision) = self.recorded.get(candidate) {
            return DecisionStatus::Recorded(decision.direction);
        }
        if let Some(pending) = self.in_flight.get(candidate) {
            return DecisionStatus::InFlight(pending.direction);
        }
        DecisionStatus::Undecided
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn recorded_count(&self) -> usize {
        self.recorded.len()
    }

    /// Applies the decision locally and asks for exactly one write.
    pub fn commit(&mut self, candidate: CandidateId, direction: Direction, now: Tick) -> CommitOutcome {
        match self.status(&candidate) {
            DecisionStatus::Recorded(prior) => {
                debug!("Commit for {} suppressed: already recorded", candidate);
                return CommitOutcome::Suppressed(SuppressedCommit::Recorded(prior));
            }
            DecisionStatus::InFlight(prior) => {
                debug!("Commit for {} suppressed: write in flight", candidate);
                return CommitOutcome::Suppressed(SuppressedCommit::InFlight(prior));
            }
            DecisionStatus::Undecided => {}
        }

        let request_id = Uuid::new_v4();
        self.in_flight.insert(
            candidate.clone(),
            InFlight {
                request_id,
                direction,
                issued_at: now,
            },
        );
        info!("Commit issued: {} -> {}", candidate, direction.as_str());

        CommitOutcome::Issued(PersistRequest {
            request_id,
            subject: self.subject.clone(),
            candidate,
            direction,
        })
    }

    /// The log accepted the write. Durable facts are always merged, even for
    /// a request that is no longer tracked. Returns `None` when the
    /// candidate was already recorded.
    pub fn confirm(&mut self, request_id: Uuid, decision: Decision, now: Tick) -> Option<Confirmation> {
        if decision.subject != self.subject {
            warn!("Ignoring confirmation for foreign subject {}", decision.subject);
            return None;
        }

        let candidate = decision.candidate_id.clone();
        let latency_ticks = match self.in_flight.get(&candidate) {
            Some(pending) if pending.request_id == request_id => {
                let latency = now.since(pending.issued_at);
                self.in_flight.remove(&candidate);
                latency
            }
            _ => 0,
        };

        if self.recorded.contains_key(&candidate) {
            return None;
        }

        info!("Decision confirmed: {} -> {}", candidate, decision.direction.as_str());
        self.recorded.insert(candidate, decision.clone());
        Some(Confirmation {
            decision,
            latency_ticks,
        })
    }

    /// The write failed. Reverts the optimistic entry if `request_id` is the
    /// one in flight; stale failures are ignored. Returns the rolled-back
    /// direction.
    pub fn fail(&mut self, candidate: &CandidateId, request_id: Uuid) -> Option<Direction> {
        match self.in_flight.get(candidate) {
            Some(pending) if pending.request_id == request_id => {
                let direction = pending.direction;
                self.in_flight.remove(candidate);
                warn!("Decision for {} rolled back", candidate);
                Some(direction)
            }
            _ => {
                debug!("Ignoring stale failure for {}", candidate);
                None
            }
        }
    }

    /// Merges decisions listed by the log. Other subjects are ignored, the
    /// earliest entry per candidate wins.
    pub fn load_history(&mut self, decisions: Vec<Decision>) -> HistoryMerge {
        let mut sorted: Vec<Decision> =
            decisions.into_iter().filter(|d| d.subject == self.subject).collect();
        sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut result = HistoryMerge::default();
        for decision in sorted {
            if self.recorded.contains_key(&decision.candidate_id) {
                continue;
            }
            if self.in_flight.remove(&decision.candidate_id).is_some() {
                debug!("History settled in-flight commit for {}", decision.candidate_id);
                result.resolved.push(decision.clone());
            }
            self.recorded.insert(decision.candidate_id.clone(), decision);
            result.merged += 1;
        }
        result
    }

    /// Everything the queue must exclude: recorded plus in-flight.
    pub fn decided(&self) -> DecisionIndex {
        let mut index: DecisionIndex = self
            .recorded
            .iter()
            .map(|(id, d)| (id.clone(), d.direction))
            .collect();
        for (id, pending) in &self.in_flight {
            index.entry(id.clone()).or_insert(pending.direction);
        }
        index
    }

    /// Accepted candidates in catalog order, derived from the current
    /// decisions on every call.
    pub fn accepted(&self, all: &[Candidate]) -> Vec<Candidate> {
        let decided = self.decided();
        all.iter()
            .filter(|c| decided.get(&c.id) == Some(&Direction::Accept))
            .cloned()
            .collect()
    }
}
