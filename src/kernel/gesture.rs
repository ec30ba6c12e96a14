//! Gesture interpreter: turns a continuous drag signal into discrete
//! commit / cancel outcomes.
//!
//! ```text
//! Idle --begin--> Dragging --release (over threshold)--> Committing --settle--> Idle
//!                    |--release (under threshold)/interrupt--> Idle
//! Idle --press(direction)--> Committing
//! ```
//!
//! `Committing` ends on a logical `settle`, never on an animation timer.

use serde::{Deserialize, Serialize};

use crate::catalog::CandidateId;
use crate::config::GestureConfig;
use crate::decisions::Direction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// What pushed a gesture over the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitTrigger {
    Distance,
    Velocity,
    Button,
    /// Recorder called directly, bypassing the gesture layer.
    Direct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragTrack {
    pub candidate: CandidateId,
    pub offset: Vector2,
    pub velocity: Vector2,
    pub hint: Option<Direction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingCommit {
    pub candidate: CandidateId,
    pub direction: Direction,
    pub trigger: CommitTrigger,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Dragging(DragTrack),
    /// Held only between `release`/`press` and `settle`. The reactor settles
    /// within the same step, so reactor callers never observe it.
    Committing(PendingCommit),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Commit(PendingCommit),
    /// Released under threshold or interrupted. The card goes back to the
    /// origin and nothing is recorded.
    Cancel { candidate: CandidateId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GestureRejection {
    #[error("a gesture on {active} is already in progress")]
    AlreadyDragging { active: CandidateId },
    /// Only reachable when driving the interpreter without `settle`.
    #[error("commit for {candidate} is still in flight")]
    CommitInFlight { candidate: CandidateId },
    #[error("no gesture in progress")]
    NotDragging,
}

#[derive(Debug, Clone)]
pub struct GestureInterpreter {
    config: GestureConfig,
    state: GestureState,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging(_))
    }

    /// Candidate currently being dragged or committed, if any.
    pub fn active_candidate(&self) -> Option<&CandidateId> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging(track) => Some(&track.candidate),
            GestureState::Committing(pending) => Some(&pending.candidate),
        }
    }

    pub fn hint_for(&self, offset_x: f32) -> Option<Direction> {
        if offset_x.abs() > self.config.hint_threshold {
            Some(Direction::from_sign(offset_x))
        } else {
            None
        }
    }

    pub fn begin(&mut self, candidate: CandidateId) -> Result<(), GestureRejection> {
        match &self.state {
            GestureState::Dragging(track) => {
                return Err(GestureRejection::AlreadyDragging {
                    active: track.candidate.clone(),
                })
            }
            GestureState::Committing(pending) => {
                return Err(GestureRejection::CommitInFlight {
                    candidate: pending.candidate.clone(),
                })
            }
            GestureState::Idle => {}
        }

        self.state = GestureState::Dragging(DragTrack {
            candidate,
            offset: Vector2::ZERO,
            velocity: Vector2::ZERO,
            hint: None,
        });
        Ok(())
    }

    /// Tracks the drag. Returns `Some(new_hint)` only when the hint changed.
    pub fn update(
        &mut self,
        offset: Vector2,
        velocity: Vector2,
    ) -> Result<Option<Option<Direction>>, GestureRejection> {
        let hint = self.hint_for(offset.x);
        let GestureState::Dragging(track) = &mut self.state else {
            return Err(GestureRejection::NotDragging);
        };

        track.offset = offset;
        track.velocity = velocity;
        if track.hint == hint {
            return Ok(None);
        }
        track.hint = hint;
        Ok(Some(hint))
    }

    pub fn release(
        &mut self,
        offset: Vector2,
        velocity: Vector2,
    ) -> Result<GestureOutcome, GestureRejection> {
        let GestureState::Dragging(track) = &self.state else {
            return Err(GestureRejection::NotDragging);
        };
        let candidate = track.candidate.clone();

        let trigger = if offset.x.abs() > self.config.commit_threshold {
            Some(CommitTrigger::Distance)
        } else if velocity.x.abs() > self.config.velocity_threshold {
            Some(CommitTrigger::Velocity)
        } else {
            None
        };

        let Some(trigger) = trigger else {
            self.state = GestureState::Idle;
            return Ok(GestureOutcome::Cancel { candidate });
        };

        // A flick released exactly at the origin has no offset sign to go by.
        let direction = if offset.x == 0.0 {
            Direction::from_sign(velocity.x)
        } else {
            Direction::from_sign(offset.x)
        };

        let pending = PendingCommit {
            candidate,
            direction,
            trigger,
        };
        self.state = GestureState::Committing(pending.clone());
        Ok(GestureOutcome::Commit(pending))
    }

    /// Pointer lost. Cancels a drag; anything else is left untouched.
    pub fn interrupt(&mut self) -> Option<GestureOutcome> {
        let GestureState::Dragging(track) = &self.state else {
            return None;
        };
        let candidate = track.candidate.clone();
        self.state = GestureState::Idle;
        Some(GestureOutcome::Cancel { candidate })
    }

    /// Discrete accept/reject button. Only valid from `Idle`.
    pub fn press(
        &mut self,
        candidate: CandidateId,
        direction: Direction,
    ) -> Result<PendingCommit, GestureRejection> {
        match &self.state {
            GestureState::Dragging(track) => Err(GestureRejection::AlreadyDragging {
                active: track.candidate.clone(),
            }),
            GestureState::Committing(pending) => Err(GestureRejection::CommitInFlight {
                candidate: pending.candidate.clone(),
            }),
            GestureState::Idle => {
                let pending = PendingCommit {
                    candidate,
                    direction,
                    trigger: CommitTrigger::Button,
                };
                self.state = GestureState::Committing(pending.clone());
                Ok(pending)
            }
        }
    }

    /// Logical completion of the `Committing` transition for `candidate`.
    pub fn settle(&mut self, candidate: &CandidateId) -> bool {
        match &self.state {
            GestureState::Committing(pending) if &pending.candidate == candidate => {
                self.state = GestureState::Idle;
                true
            }
            _ => false,
        }
    }
}
