use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::{decode_catalog, Candidate, CandidateId, CatalogSource};
use crate::config::BackendConfig;
use crate::decisions::{Decision, DecisionLog, Direction, StoreError, SubjectId};

/// Hosted backend speaking plain JSON over HTTP.
///
/// - `GET  {base}/candidates`
/// - `GET  {base}/decisions?subject=<id>`
/// - `POST {base}/decisions` with `{subject, candidate_id, direction}`
///
/// The backend holds a unique (subject, candidate_id) constraint and answers
/// `409 Conflict` for a second write; that is resolved by reading back the
/// stored decision.
#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct RecordRequest<'a> {
    subject: &'a SubjectId,
    candidate_id: &'a CandidateId,
    direction: Direction,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn fetch_decisions(&self, subject: &SubjectId) -> Result<Vec<Decision>, StoreError> {
        let response = self
            .authorize(self.client.get(self.endpoint("decisions")))
            .query(&[("subject", subject.0.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Backend(format!("list decisions: {}", response.status())));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogSource for RestBackend {
    async fn fetch_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let response = self
            .authorize(self.client.get(self.endpoint("candidates")))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Backend(format!("fetch candidates: {}", response.status())));
        }
        let records: Vec<serde_json::Value> = response.json().await?;
        Ok(decode_catalog(records))
    }
}

#[async_trait]
impl DecisionLog for RestBackend {
    async fn record_decision(
        &self,
        subject: &SubjectId,
        candidate: &CandidateId,
        direction: Direction,
    ) -> Result<Decision, StoreError> {
        let body = RecordRequest {
            subject,
            candidate_id: candidate,
            direction,
        };
        let response = self
            .authorize(self.client.post(self.endpoint("decisions")))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::CONFLICT => {
                debug!("Decision for {} already stored, reading it back", candidate);
                self.fetch_decisions(subject)
                    .await?
                    .into_iter()
                    .find(|d| &d.candidate_id == candidate)
                    .ok_or_else(|| {
                        StoreError::Backend(format!("conflict for {} but no stored decision", candidate))
                    })
            }
            status => {
                warn!("Backend refused decision for {}: {}", candidate, status);
                Err(StoreError::Backend(format!("record decision: {}", status)))
            }
        }
    }

    async fn list_decisions(&self, subject: &SubjectId) -> Result<Vec<Decision>, StoreError> {
        self.fetch_decisions(subject).await
    }
}
