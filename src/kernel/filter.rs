//! Filter pipeline: derives the swipe queue from the catalog, the decisions
//! taken so far and the current filter criteria.
//!
//! Everything here is a pure function of its arguments. Identical inputs
//! always produce an identical queue, in catalog order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::catalog::{Candidate, CandidateId, Level};
use crate::config::{FilterConfig, KeywordMode};
use crate::decisions::Direction;
use crate::error::EngineError;

pub const LOW_PRICE_MAX: f64 = 500.0;
pub const MEDIUM_PRICE_MAX: f64 = 1500.0;

/// Candidate id -> direction for every candidate the subject has decided,
/// confirmed or still in flight.
pub type DecisionIndex = HashMap<CandidateId, Direction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBucket {
    #[default]
    Any,
    /// price <= 500
    Low,
    /// 500 < price <= 1500
    Medium,
    /// price > 1500
    High,
}

impl PriceBucket {
    pub fn contains(self, price: f64) -> bool {
        match self {
            Self::Any => true,
            Self::Low => price <= LOW_PRICE_MAX,
            Self::Medium => price > LOW_PRICE_MAX && price <= MEDIUM_PRICE_MAX,
            Self::High => price > MEDIUM_PRICE_MAX,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Some(Self::Any),
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelFilter {
    #[default]
    Any,
    Only(Level),
}

impl LevelFilter {
    pub fn matches(self, level: Level) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == level,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("any") {
            return Some(Self::Any);
        }
        Level::parse(trimmed).map(Self::Only)
    }
}

/// Filter input exactly as the UI hands it over, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFilter {
    pub keywords: Vec<String>,
    pub price_bucket: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Lower-cased, trimmed, non-empty.
    pub keywords: BTreeSet<String>,
    pub price_bucket: PriceBucket,
    pub level: LevelFilter,
}

impl FilterCriteria {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_price(mut self, bucket: PriceBucket) -> Self {
        self.price_bucket = bucket;
        self
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Validates UI input. Unknown enum values and, when a vocabulary is
    /// configured, unknown keywords are rejected. Blank keywords are dropped.
    pub fn from_raw(raw: &RawFilter, config: &FilterConfig) -> Result<Self, EngineError> {
        let price_bucket = PriceBucket::parse(&raw.price_bucket).ok_or_else(|| {
            EngineError::Validation(format!("unknown price bucket '{}'", raw.price_bucket))
        })?;
        let level = LevelFilter::parse(&raw.level)
            .ok_or_else(|| EngineError::Validation(format!("unknown level '{}'", raw.level)))?;

        let criteria = Self::any()
            .with_keywords(&raw.keywords)
            .with_price(price_bucket)
            .with_level(level);

        if !config.vocabulary.is_empty() {
            let known: BTreeSet<String> =
                config.vocabulary.iter().map(|k| k.trim().to_lowercase()).collect();
            if let Some(unknown) = criteria.keywords.iter().find(|k| !known.contains(*k)) {
                return Err(EngineError::Validation(format!("unknown keyword '{}'", unknown)));
            }
        }

        Ok(criteria)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    entries: Vec<Candidate>,
}

impl Queue {
    pub fn new(entries: Vec<Candidate>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&Candidate> {
        self.entries.first()
    }

    pub fn position(&self, id: &CandidateId) -> Option<usize> {
        self.entries.iter().position(|c| &c.id == id)
    }

    pub fn ids(&self) -> Vec<CandidateId> {
        self.entries.iter().map(|c| c.id.clone()).collect()
    }

    /// Removes `id` from this snapshot. Returns whether it was present.
    pub fn remove(&mut self, id: &CandidateId) -> bool {
        match self.position(id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPipeline {
    keyword_mode: KeywordMode,
}

impl FilterPipeline {
    pub fn new(keyword_mode: KeywordMode) -> Self {
        Self { keyword_mode }
    }

    pub fn keyword_mode(&self) -> KeywordMode {
        self.keyword_mode
    }

    pub fn matches(&self, candidate: &Candidate, criteria: &FilterCriteria) -> bool {
        criteria.price_bucket.contains(candidate.price)
            && criteria.level.matches(candidate.level)
            && self.keywords_match(candidate, &criteria.keywords)
    }

    fn keywords_match(&self, candidate: &Candidate, keywords: &BTreeSet<String>) -> bool {
        if keywords.is_empty() {
            return true;
        }
        match self.keyword_mode {
            KeywordMode::Any => keywords.iter().any(|k| candidate.mentions(k)),
            KeywordMode::All => keywords.iter().all(|k| candidate.mentions(k)),
        }
    }

    /// Catalog minus decided candidates minus non-matching ones, in catalog
    /// order. An empty result is a valid queue.
    pub fn compute_queue(
        &self,
        all: &[Candidate],
        decided: &DecisionIndex,
        criteria: &FilterCriteria,
    ) -> Queue {
        Queue::new(
            all.iter()
                .filter(|c| !decided.contains_key(&c.id))
                .filter(|c| self.matches(c, criteria))
                .cloned()
                .collect(),
        )
    }
}
