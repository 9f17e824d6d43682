use std::future::Future;

use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use super::normalize::RawScoringResponse;
use crate::config::Config;
use crate::payload::ScoringRequest;

/// How a submission attempt failed. Exactly one request is made per
/// submission; retrying is a user action (restart), never automatic.
#[derive(Debug, Clone, Error)]
pub enum SubmitFailure {
    #[error("could not reach the scoring service: {0}")]
    Network(String),
    #[error("scoring service error (status {status}){}", .detail.as_deref().map(|d| format!(": {}", d)).unwrap_or_default())]
    Server { status: u16, detail: Option<String> },
    #[error("the scoring service returned an unreadable response")]
    Parse,
}

/// Seam for the single network round trip, so tests and drivers can
/// substitute deterministic fakes per failure kind.
pub trait ScoringClient {
    fn submit(
        &self,
        request: ScoringRequest,
    ) -> impl Future<Output = Result<RawScoringResponse, SubmitFailure>> + Send;
}

/// Production client. Holds no state between calls beyond the connection
/// pool inside reqwest.
#[derive(Debug, Clone)]
pub struct HttpScoringClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl ScoringClient for HttpScoringClient {
    fn submit(
        &self,
        request: ScoringRequest,
    ) -> impl Future<Output = Result<RawScoringResponse, SubmitFailure>> + Send {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        async move {
            let response = client
                .post(&endpoint)
                .json(&request)
                .send()
                .await
                .map_err(|e| SubmitFailure::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|body| extract_detail(&body));
                return Err(SubmitFailure::Server {
                    status: status.as_u16(),
                    detail,
                });
            }

            let body: Value = response.json().await.map_err(|_| SubmitFailure::Parse)?;
            match body {
                Value::Object(map) => Ok(map),
                _ => Err(SubmitFailure::Parse),
            }
        }
    }
}

/// Error bodies differ by backend revision: FastAPI uses `detail`, the
/// Flask revisions used `error` + `details`. Surfaced as-is.
fn extract_detail(body: &Value) -> Option<String> {
    for key in ["detail", "error", "details"] {
        if let Some(value) = body.get(key) {
            return match value.as_str() {
                Some(s) => Some(s.to_string()),
                None => Some(value.to_string()),
            };
        }
    }
    None
}
