use tracing::{debug, info, warn};

use super::event::{Event, GestureInput, SideEffect};
use super::filter::{FilterPipeline, Queue};
use super::gesture::{CommitTrigger, GestureInterpreter, GestureOutcome, GestureRejection};
use super::recorder::{CommitOutcome, DecisionRecorder, DecisionStatus, PersistRequest};
use super::stack::{StackController, StackStatus, ViewportWindow};
use super::state::{SessionState, StateDelta};
use super::telemetry::event::{RejectionKind, TelemetryEvent};
use super::telemetry::recorder::TelemetryRecorder;
use super::time::Tick;
use crate::catalog::{normalize_catalog, Candidate, CandidateId};
use crate::config::EngineConfig;
use crate::decisions::{Decision, Direction, SubjectId};
use crate::error::EngineError;

impl From<&GestureRejection> for RejectionKind {
    fn from(rejection: &GestureRejection) -> Self {
        match rejection {
            GestureRejection::AlreadyDragging { .. } | GestureRejection::CommitInFlight { .. } => {
                RejectionKind::GestureActive
            }
            GestureRejection::NotDragging => RejectionKind::NoActiveGesture,
        }
    }
}

/// Sole owner of mutable session state. Single-threaded and free of I/O:
/// every step consumes events and returns side effects for the driver.
pub struct Reactor {
    pub config: EngineConfig,
    pub state: SessionState,
    pub pipeline: FilterPipeline,
    pub gesture: GestureInterpreter,
    pub stack: StackController,
    pub recorder: DecisionRecorder,
    pub telemetry: TelemetryRecorder,
    pub tick: Tick,
    last_status: StackStatus,
}

impl Reactor {
    pub fn new(subject: SubjectId, config: EngineConfig) -> Self {
        Self {
            pipeline: FilterPipeline::new(config.filter.keyword_mode),
            gesture: GestureInterpreter::new(config.gesture.clone()),
            stack: StackController::new(config.stack.clone()),
            recorder: DecisionRecorder::new(subject),
            state: SessionState::new(),
            telemetry: TelemetryRecorder::new(),
            tick: Tick::new(),
            last_status: StackStatus::Loading,
            config,
        }
    }

    /// Advances the tick, then applies `events` in order.
    /// MUST NOT await I/O or timers.
    pub fn tick_step(&mut self, events: Vec<Event>) -> Vec<SideEffect> {
        self.tick = self.tick.next();
        let mut effects = Vec::new();

        for event in events {
            self.handle(event, &mut effects);
        }

        effects
    }

    /// Recorder contract for callers that bypass the gesture layer.
    /// Any candidate of the catalog may be committed, not only the top card.
    /// Refused until the decision history is loaded.
    pub fn commit_decision(
        &mut self,
        candidate: CandidateId,
        direction: Direction,
    ) -> Result<(CommitOutcome, Vec<SideEffect>), EngineError> {
        if !self.state.is_loaded() {
            return Err(EngineError::Load("catalog or decision history not loaded yet".into()));
        }
        if self.state.candidate(&candidate).is_none() {
            return Err(EngineError::Validation(format!("unknown candidate '{}'", candidate)));
        }

        self.tick = self.tick.next();
        let mut effects = Vec::new();

        if self.gesture.is_dragging() && self.gesture.active_candidate() == Some(&candidate) {
            if let Some(outcome) = self.gesture.interrupt() {
                self.apply_outcome(outcome, &mut effects);
            }
        }

        let outcome = self.apply_commit(candidate, direction, CommitTrigger::Direct, &mut effects);
        Ok((outcome, effects))
    }

    pub fn status(&self) -> StackStatus {
        self.stack.status()
    }

    pub fn queue(&self) -> &Queue {
        self.stack.queue()
    }

    pub fn window(&self) -> &ViewportWindow {
        self.stack.window()
    }

    pub fn current_top(&self) -> Option<&Candidate> {
        self.stack.current_top()
    }

    pub fn accepted(&self) -> Vec<Candidate> {
        self.recorder.accepted(self.state.catalog())
    }

    fn handle(&mut self, event: Event, effects: &mut Vec<SideEffect>) {
        match event {
            Event::CatalogLoaded(candidates) => {
                let candidates = normalize_catalog(candidates);
                info!("Catalog loaded: {} candidates", candidates.len());
                self.state.reduce(StateDelta::CatalogReplaced(candidates));
                self.refresh(effects);
            }
            Event::HistoryLoaded(decisions) => {
                let merge = self.recorder.load_history(decisions);
                info!("Decision history loaded: {} new entries", merge.merged);
                // The later write completion is a duplicate, so announce here.
                for decision in merge.resolved {
                    self.announce_confirmed(&decision, effects);
                }
                self.state.reduce(StateDelta::HistoryLoaded);
                self.refresh(effects);
            }
            Event::FilterChanged(criteria) => {
                self.state.reduce(StateDelta::CriteriaChanged(criteria));
                self.refresh(effects);
            }
            Event::Gesture(input) => self.handle_gesture(input, effects),
            Event::Button { candidate, direction } => {
                self.handle_button(candidate, direction, effects)
            }
            Event::PersistCompleted { request, result } => match result {
                Ok(decision) => self.handle_confirmed(request, decision, effects),
                Err(reason) => self.handle_failed(request, reason, effects),
            },
        }
    }

    fn handle_gesture(&mut self, input: GestureInput, effects: &mut Vec<SideEffect>) {
        match input {
            GestureInput::Begin { candidate } => {
                if self.stack.status() == StackStatus::Loading {
                    self.reject(Some(candidate), RejectionKind::StackLoading, effects);
                    return;
                }
                if !self.stack.is_interactive(&candidate) {
                    self.reject(Some(candidate), RejectionKind::NotTopOfStack, effects);
                    return;
                }
                match self.gesture.begin(candidate.clone()) {
                    Ok(()) => self.telemetry.record(TelemetryEvent::GestureStarted {
                        candidate,
                        tick: self.tick,
                    }),
                    Err(rejection) => {
                        self.reject(Some(candidate), RejectionKind::from(&rejection), effects)
                    }
                }
            }
            GestureInput::Move { offset, velocity } => {
                match self.gesture.update(offset, velocity) {
                    Ok(Some(hint)) => {
                        if let Some(candidate) = self.gesture.active_candidate() {
                            effects.push(SideEffect::Hint {
                                candidate: candidate.clone(),
                                hint,
                            });
                        }
                    }
                    Ok(None) => {}
                    // Stray moves after a release are routine; not worth a rejection.
                    Err(_) => debug!("Move without active gesture ignored"),
                }
            }
            GestureInput::Release { offset, velocity } => {
                match self.gesture.release(offset, velocity) {
                    Ok(outcome) => self.apply_outcome(outcome, effects),
                    Err(rejection) => self.reject(None, RejectionKind::from(&rejection), effects),
                }
            }
            GestureInput::Interrupt => {
                if let Some(outcome) = self.gesture.interrupt() {
                    self.apply_outcome(outcome, effects);
                }
            }
        }
    }

    fn handle_button(
        &mut self,
        candidate: CandidateId,
        direction: Direction,
        effects: &mut Vec<SideEffect>,
    ) {
        if self.stack.status() == StackStatus::Loading {
            self.reject(Some(candidate), RejectionKind::StackLoading, effects);
            return;
        }
        if !self.stack.is_interactive(&candidate) {
            // A second tap on a card that already left the stack.
            if self.recorder.status(&candidate) != DecisionStatus::Undecided {
                debug!("Button on decided candidate {} suppressed", candidate);
                self.telemetry
                    .record(TelemetryEvent::DuplicateSuppressed { candidate });
            } else {
                self.reject(Some(candidate), RejectionKind::NotTopOfStack, effects);
            }
            return;
        }

        match self.gesture.press(candidate.clone(), direction) {
            Ok(pending) => {
                self.apply_commit(pending.candidate, pending.direction, pending.trigger, effects);
            }
            Err(rejection) => {
                self.reject(Some(candidate), RejectionKind::from(&rejection), effects)
            }
        }
    }

    fn apply_outcome(&mut self, outcome: GestureOutcome, effects: &mut Vec<SideEffect>) {
        match outcome {
            GestureOutcome::Commit(pending) => {
                self.apply_commit(pending.candidate, pending.direction, pending.trigger, effects);
            }
            GestureOutcome::Cancel { candidate } => {
                debug!("Gesture on {} cancelled", candidate);
                self.telemetry.record(TelemetryEvent::GestureCancelled {
                    candidate: candidate.clone(),
                });
                effects.push(SideEffect::ResetCard { candidate });
                // Anything postponed during the drag applies now.
                self.refresh(effects);
            }
        }
    }

    /// Records the decision optimistically, advances the stack and settles
    /// the gesture, all within the current step.
    fn apply_commit(
        &mut self,
        candidate: CandidateId,
        direction: Direction,
        trigger: CommitTrigger,
        effects: &mut Vec<SideEffect>,
    ) -> CommitOutcome {
        let outcome = self.recorder.commit(candidate.clone(), direction, self.tick);

        match &outcome {
            CommitOutcome::Issued(request) => {
                self.telemetry.record(TelemetryEvent::Committed {
                    candidate: candidate.clone(),
                    direction,
                    trigger,
                });
                effects.push(SideEffect::ExitCard {
                    candidate: candidate.clone(),
                    direction,
                });
                effects.push(SideEffect::Persist(request.clone()));
            }
            CommitOutcome::Suppressed(_) => {
                self.telemetry.record(TelemetryEvent::DuplicateSuppressed {
                    candidate: candidate.clone(),
                });
            }
        }

        let advanced = self.stack.advance(&candidate);
        self.gesture.settle(&candidate);

        if !self.refresh(effects) && advanced {
            self.announce_stack(effects);
        }

        outcome
    }

    fn handle_confirmed(
        &mut self,
        request: PersistRequest,
        decision: Decision,
        effects: &mut Vec<SideEffect>,
    ) {
        let Some(confirmation) = self.recorder.confirm(request.request_id, decision, self.tick) else {
            return;
        };
        let candidate = confirmation.decision.candidate_id.clone();

        self.telemetry.record(TelemetryEvent::PersistConfirmed {
            candidate: candidate.clone(),
            latency_ticks: confirmation.latency_ticks,
        });

        if confirmation.decision.direction != request.direction {
            warn!(
                "Log kept {} for {} (requested {})",
                confirmation.decision.direction.as_str(),
                candidate,
                request.direction.as_str()
            );
        }

        self.announce_confirmed(&confirmation.decision, effects);

        // Untracked confirmations may concern a card still on screen.
        if self.stack.queue().position(&candidate).is_some() {
            self.state.reduce(StateDelta::RecomputeRequested);
            self.refresh(effects);
        }
    }

    /// Downstream flows hang off confirmed accepts only.
    fn announce_confirmed(&self, decision: &Decision, effects: &mut Vec<SideEffect>) {
        if decision.direction != Direction::Accept {
            return;
        }
        if let Some(accepted) = self.state.candidate(&decision.candidate_id) {
            effects.push(SideEffect::Accepted(accepted.clone()));
        }
    }

    fn handle_failed(&mut self, request: PersistRequest, reason: String, effects: &mut Vec<SideEffect>) {
        let Some(direction) = self.recorder.fail(&request.candidate, request.request_id) else {
            return;
        };

        self.telemetry.record(TelemetryEvent::RolledBack {
            candidate: request.candidate.clone(),
        });
        effects.push(SideEffect::CommitFailed {
            direction,
            error: EngineError::Persistence {
                candidate: request.candidate,
                reason,
            },
        });

        self.state.reduce(StateDelta::RecomputeRequested);
        self.refresh(effects);
    }

    /// Rebuilds the queue if an input changed. Postponed while a drag is in
    /// progress so the dragged card never changes under the pointer.
    /// Returns whether the queue was rebuilt.
    fn refresh(&mut self, effects: &mut Vec<SideEffect>) -> bool {
        if !self.state.recompute_pending() {
            return false;
        }
        if self.gesture.is_dragging() {
            debug!("Recompute deferred until the active gesture ends");
            self.telemetry.record(TelemetryEvent::RecomputeDeferred);
            return false;
        }

        self.state.reduce(StateDelta::Recomputed);
        let queue = self.pipeline.compute_queue(
            self.state.catalog(),
            &self.recorder.decided(),
            self.state.criteria(),
        );
        self.telemetry.record(TelemetryEvent::FilterApplied {
            queue_len: queue.len(),
        });
        self.stack.replace(queue, self.state.is_loaded());
        self.announce_stack(effects);
        true
    }

    fn announce_stack(&mut self, effects: &mut Vec<SideEffect>) {
        let status = self.stack.status();
        if status == StackStatus::Exhausted && self.last_status != StackStatus::Exhausted {
            info!("Stack exhausted");
            self.telemetry.record(TelemetryEvent::Exhausted);
        }
        self.last_status = status;
        effects.push(SideEffect::StackChanged {
            status,
            window: self.stack.window().ids(),
        });
    }

    fn reject(
        &mut self,
        candidate: Option<CandidateId>,
        reason: RejectionKind,
        effects: &mut Vec<SideEffect>,
    ) {
        debug!("Input rejected: {:?} ({:?})", reason, candidate);
        self.telemetry.record(TelemetryEvent::GestureRejected { reason });
        effects.push(SideEffect::InputRejected { candidate, reason });
    }
}
