use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::catalog::CandidateId;

/// The end user performing swipes; owner of the decision log entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Accept,
    Reject,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
        }
    }

    /// Positive x is a swipe to the right, i.e. accept.
    pub fn from_sign(x: f32) -> Self {
        if x > 0.0 {
            Self::Accept
        } else {
            Self::Reject
        }
    }
}

/// Immutable fact: `subject` decided `direction` on `candidate_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub subject: SubjectId,
    pub candidate_id: CandidateId,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

impl Decision {
    pub fn new(subject: SubjectId, candidate_id: CandidateId, direction: Direction) -> Self {
        Self {
            subject,
            candidate_id,
            direction,
            created_at: Utc::now(),
        }
    }
}

/// Failure reported by an external collaborator (catalog or decision log).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("request error: {0}")]
    Http(#[from] reqwest::Error),
}
