use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use tracing::warn;

/// Stable identifier of a swipeable candidate, as issued by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl CandidateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CandidateId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    Teacher,
    Classroom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    /// Case-insensitive parse. Surrounding whitespace is ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Level::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown level '{}'", raw)))
    }
}

/// A teacher or classroom record eligible for swiping.
///
/// Only `id`, `price`, `level` and the searchable fields take part in
/// filtering. Everything the cards merely display lives in `payload` and is
/// never inspected by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    /// Display-only; absent in some catalogs.
    #[serde(default)]
    pub kind: Option<CandidateKind>,
    pub price: f64,
    pub level: Level,
    #[serde(default)]
    pub searchable_text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Candidate {
    pub fn new(id: impl Into<String>, kind: CandidateKind, price: f64, level: Level) -> Self {
        Self {
            id: CandidateId::new(id),
            kind: Some(kind),
            price,
            level,
            searchable_text: String::new(),
            tags: Vec::new(),
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.searchable_text = text.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Case-insensitive substring match against the free text and every tag.
    /// `needle` must already be lower-cased.
    pub fn mentions(&self, needle: &str) -> bool {
        if self.searchable_text.to_lowercase().contains(needle) {
            return true;
        }
        self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }

    fn defect(&self) -> Option<&'static str> {
        if self.id.0.trim().is_empty() {
            return Some("empty id");
        }
        if !self.price.is_finite() {
            return Some("non-finite price");
        }
        if self.price < 0.0 {
            return Some("negative price");
        }
        None
    }
}

/// Decodes a raw catalog record by record. A record that does not decode is
/// dropped with a warning instead of failing the whole catalog.
pub fn decode_catalog(records: Vec<serde_json::Value>) -> Vec<Candidate> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Candidate>(record) {
            Ok(candidate) => Some(candidate),
            Err(e) => {
                warn!("Dropping catalog record #{}: {}", index, e);
                None
            }
        })
        .collect()
}

/// Drops malformed records and duplicate ids (first occurrence wins),
/// preserving catalog order.
pub fn normalize_catalog(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if let Some(reason) = candidate.defect() {
            warn!("Dropping catalog record {:?}: {}", candidate.id, reason);
            continue;
        }
        if !seen.insert(candidate.id.clone()) {
            warn!("Dropping duplicate catalog record {}", candidate.id);
            continue;
        }
        kept.push(candidate);
    }

    kept
}
