use crate::catalog::{Candidate, CandidateId};
use crate::decisions::{Decision, Direction};
use crate::error::EngineError;
use super::filter::FilterCriteria;
use super::gesture::Vector2;
use super::recorder::PersistRequest;
use super::stack::StackStatus;
use super::telemetry::event::RejectionKind;

/// Everything that can reach the reactor. Events are applied strictly in
/// the order they are handed to `tick_step`.
#[derive(Debug, Clone)]
pub enum Event {
    CatalogLoaded(Vec<Candidate>),
    /// Result of `list_decisions` for the session subject.
    HistoryLoaded(Vec<Decision>),
    Gesture(GestureInput),
    /// Discrete accept/reject affordance on the top card.
    Button { candidate: CandidateId, direction: Direction },
    /// Already validated criteria.
    FilterChanged(FilterCriteria),
    /// Outcome of a `SideEffect::Persist`, fed back by the driver.
    PersistCompleted {
        request: PersistRequest,
        result: Result<Decision, String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureInput {
    Begin { candidate: CandidateId },
    Move { offset: Vector2, velocity: Vector2 },
    Release { offset: Vector2, velocity: Vector2 },
    /// Pointer lost or gesture interrupted by the host.
    Interrupt,
}

/// Work for the driver. The reactor never performs I/O itself.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Write one decision to the log and report back with
    /// `Event::PersistCompleted`.
    Persist(PersistRequest),
    /// Advisory direction preview changed for the dragged card.
    Hint { candidate: CandidateId, hint: Option<Direction> },
    /// Gesture cancelled; the card returns to the origin.
    ResetCard { candidate: CandidateId },
    /// Card leaves the stack. Presentation only, gates nothing.
    ExitCard { candidate: CandidateId, direction: Direction },
    StackChanged { status: StackStatus, window: Vec<CandidateId> },
    /// Confirmed accept. Downstream booking flows hang off this.
    Accepted(Candidate),
    /// Write failed and was rolled back. Retryable.
    CommitFailed { direction: Direction, error: EngineError },
    InputRejected { candidate: Option<CandidateId>, reason: RejectionKind },
}
