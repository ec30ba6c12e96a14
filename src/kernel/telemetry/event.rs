use serde::{Deserialize, Serialize};

use crate::catalog::CandidateId;
use crate::decisions::Direction;
use crate::kernel::gesture::CommitTrigger;
use crate::kernel::time::Tick;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    GestureStarted {
        candidate: CandidateId,
        tick: Tick,
    },

    GestureCancelled {
        candidate: CandidateId,
    },

    GestureRejected {
        reason: RejectionKind,
    },

    Committed {
        candidate: CandidateId,
        direction: Direction,
        trigger: CommitTrigger,
    },

    DuplicateSuppressed {
        candidate: CandidateId,
    },

    PersistConfirmed {
        candidate: CandidateId,
        latency_ticks: u64,
    },

    RolledBack {
        candidate: CandidateId,
    },

    FilterApplied {
        queue_len: usize,
    },

    /// A recompute was postponed until the active drag ends.
    RecomputeDeferred,

    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionKind {
    /// Catalog or decision history still loading.
    StackLoading,
    NotTopOfStack,
    GestureActive,
    NoActiveGesture,
}
