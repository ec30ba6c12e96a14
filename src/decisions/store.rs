use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::types::{Decision, Direction, StoreError, SubjectId};
use crate::catalog::CandidateId;

/// Boundary to the durable, append-only decision log.
///
/// A successful `record_decision` MUST be durable. Recording a pair that
/// already exists returns the stored decision rather than a second entry.
#[async_trait]
pub trait DecisionLog: Send + Sync {
    async fn record_decision(
        &self,
        subject: &SubjectId,
        candidate: &CandidateId,
        direction: Direction,
    ) -> Result<Decision, StoreError>;

    async fn list_decisions(&self, subject: &SubjectId) -> Result<Vec<Decision>, StoreError>;
}

fn existing<'a>(
    entries: &'a [Decision],
    subject: &SubjectId,
    candidate: &CandidateId,
) -> Option<&'a Decision> {
    entries
        .iter()
        .find(|d| &d.subject == subject && &d.candidate_id == candidate)
}

/// In-memory log. Behaves like a table with a unique (subject, candidate)
/// constraint.
#[derive(Debug, Default)]
pub struct InMemoryDecisionLog {
    entries: Mutex<Vec<Decision>>,
    write_calls: Mutex<u64>,
}

impl InMemoryDecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<Decision>) -> Self {
        Self {
            entries: Mutex::new(entries),
            write_calls: Mutex::new(0),
        }
    }

    pub async fn entries(&self) -> Vec<Decision> {
        self.entries.lock().await.clone()
    }

    /// Number of `record_decision` calls received, including ones that hit
    /// an existing entry.
    pub async fn write_calls(&self) -> u64 {
        *self.write_calls.lock().await
    }
}

#[async_trait]
impl DecisionLog for InMemoryDecisionLog {
    async fn record_decision(
        &self,
        subject: &SubjectId,
        candidate: &CandidateId,
        direction: Direction,
    ) -> Result<Decision, StoreError> {
        *self.write_calls.lock().await += 1;

        let mut entries = self.entries.lock().await;
        if let Some(found) = existing(&entries, subject, candidate) {
            return Ok(found.clone());
        }
        let decision = Decision::new(subject.clone(), candidate.clone(), direction);
        entries.push(decision.clone());
        Ok(decision)
    }

    async fn list_decisions(&self, subject: &SubjectId) -> Result<Vec<Decision>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().filter(|d| &d.subject == subject).cloned().collect())
    }
}

/// JSON-lines log on disk. One decision per line, appended and synced
/// before `record_decision` returns.
#[derive(Debug)]
pub struct FileDecisionLog {
    path: PathBuf,
    entries: Mutex<Vec<Decision>>,
}

impl FileDecisionLog {
    /// Opens the log, loading any existing lines. A missing file is an
    /// empty log.
    pub async fn open(path: PathBuf) -> Result<Self, StoreError> {
        let entries = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| {
                    serde_json::from_str::<Decision>(line)
                        .map_err(|e| StoreError::Serialization(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()?
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl DecisionLog for FileDecisionLog {
    async fn record_decision(
        &self,
        subject: &SubjectId,
        candidate: &CandidateId,
        direction: Direction,
    ) -> Result<Decision, StoreError> {
        // Held across the write so two appends can never interleave.
        let mut entries = self.entries.lock().await;
        if let Some(found) = existing(&entries, subject, candidate) {
            return Ok(found.clone());
        }

        let decision = Decision::new(subject.clone(), candidate.clone(), direction);
        let mut line = serde_json::to_string(&decision)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.sync_data().await?;

        entries.push(decision.clone());
        Ok(decision)
    }

    async fn list_decisions(&self, subject: &SubjectId) -> Result<Vec<Decision>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().filter(|d| &d.subject == subject).cloned().collect())
    }
}
