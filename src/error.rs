use crate::catalog::CandidateId;

/// Errors the engine propagates to its caller for user-facing messaging.
///
/// Empty queues and duplicate commits are not errors and never appear here.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed filter criteria. The previous criteria stay in force.
    #[error("validation error: {0}")]
    Validation(String),
    /// The decision log rejected a write. The optimistic update has been
    /// rolled back and the same commit may be retried.
    #[error("could not record decision for {candidate}: {reason}")]
    Persistence { candidate: CandidateId, reason: String },
    /// Fetching the catalog or the decision history failed.
    #[error("load error: {0}")]
    Load(String),
    #[error("config error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::Load(_))
    }
}
