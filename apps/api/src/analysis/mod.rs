//! Client for the item analysis service.
//!
//! The service takes a JSON array of catalog items and returns whatever analysis it
//! produces; this side treats the result as opaque JSON.

pub mod handlers;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogItem;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Total calls per batch, the first one included.
const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Analysis service returned status {status}: {message}")]
    Api { status: u16, message: String },
}

/// Outcome of one failed call: worth retrying or not.
#[derive(Debug)]
enum Failure {
    Retryable(AnalysisError),
    Fatal(AnalysisError),
}

#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(&self, items: &[CatalogItem]) -> Result<Value, AnalysisError>;
}

#[derive(Clone)]
pub struct HttpAnalysisClient {
    client: Client,
    endpoint: String,
}

impl HttpAnalysisClient {
    pub fn new(endpoint: String) -> Result<Self, AnalysisError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint,
        })
    }

    async fn call_once(&self, items: &[CatalogItem]) -> Result<Value, Failure> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(items)
            .send()
            .await
            .map_err(|e| Failure::Retryable(AnalysisError::Http(e)))?;

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("Analysis service returned {}: {}", status, body);
            return Err(Failure::Retryable(AnalysisError::Api {
                status: status.as_u16(),
                message: body,
            }));
        }

        if !status.is_success() {
            return Err(Failure::Fatal(AnalysisError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }));
        }

        response
            .json()
            .await
            .map_err(|e| Failure::Fatal(AnalysisError::Http(e)))
    }
}

/// Exponential backoff after failed attempt `attempt` (1-based): 1s, 2s, 4s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(1000 * (1 << (attempt.saturating_sub(1)).min(6)))
}

/// Runs `call` up to `MAX_ATTEMPTS` times, backing off between retryable failures.
/// Returns the first success, the first fatal error, or the last retryable error.
async fn with_retries<T, F, Fut>(mut call: F) -> Result<T, AnalysisError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Failure>>,
{
    let mut attempt = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(Failure::Fatal(err)) => return Err(err),
            Err(Failure::Retryable(err)) if attempt >= MAX_ATTEMPTS => {
                warn!("Analysis call failed after {attempt} attempts: {err}");
                return Err(err);
            }
            Err(Failure::Retryable(err)) => {
                let delay = backoff_delay(attempt);
                warn!(
                    "Analysis call attempt {} failed ({}), retrying after {}ms...",
                    attempt,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisClient {
    /// Retries transport errors, 429 and 5xx with exponential backoff; other statuses
    /// fail at once.
    async fn analyze(&self, items: &[CatalogItem]) -> Result<Value, AnalysisError> {
        let analysis = with_retries(|| self.call_once(items)).await?;
        debug!("Analysis succeeded for {} items", items.len());
        Ok(analysis)
    }
}
