use async_trait::async_trait;
use std::path::PathBuf;

use super::types::{decode_catalog, Candidate};
use crate::decisions::StoreError;

/// Boundary to the hosted catalog. Consumed once per session and
/// re-fetchable; no pagination is assumed.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, StoreError>;
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    candidates: Vec<Candidate>,
}

impl StaticCatalog {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        Ok(self.candidates.clone())
    }
}

/// Catalog read from a JSON array on disk, re-read on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CatalogSource for JsonFileCatalog {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<serde_json::Value> = serde_json::from_str(&content)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(decode_catalog(records))
    }
}
