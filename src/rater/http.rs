//! HTTP adapter for out-of-process raters.
//!
//! POSTs the artifact as JSON and expects the rater's rating vector back.
//! Only the response shape is contractual; rater internals stay opaque.
//! Transient failures are retried with exponential backoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::axes::State;
use crate::types::{Artifact, AxisRating, Confidence, ContextTag, RaterAssessment, RatingVector};

use super::error::{ErrorContext, RaterError};
use super::Rater;

/// Retry and timeout policy for one HTTP rater.
#[derive(Debug, Clone)]
pub struct HttpRaterConfig {
    /// Per-request timeout enforced by the HTTP client.
    pub request_timeout: Duration,
    /// Retries after the first attempt, for retryable failures only.
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for HttpRaterConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

/// A rater reachable over HTTP.
pub struct HttpRater {
    id: String,
    endpoint: String,
    client: reqwest::Client,
    config: HttpRaterConfig,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct AssessRequest<'a> {
    artifact_id: &'a str,
    content_snapshot: &'a str,
    context_tag: ContextTag,
}

#[derive(Debug, Deserialize)]
struct AssessResponse {
    #[serde(default)]
    refused: bool,
    #[serde(default)]
    message: Option<String>,
    vector: Option<WireVector>,
}

#[derive(Debug, Deserialize)]
struct WireVector {
    expressiveness: WireAxisRating,
    dependency_flow: WireAxisRating,
    error_surface: WireAxisRating,
}

#[derive(Debug, Deserialize)]
struct WireAxisRating {
    state: u8,
    #[serde(default)]
    confidence: Option<Confidence>,
    #[serde(default)]
    rationale: Option<String>,
}

impl WireAxisRating {
    fn into_axis_rating(self) -> Result<AxisRating, RaterError> {
        let state = State::new(self.state)
            .map_err(|e| RaterError::protocol(format!("state out of domain: {e}")))?;
        let mut rating = AxisRating::new(state);
        rating.confidence = self.confidence;
        rating.rationale = self.rationale;
        Ok(rating)
    }
}

// =============================================================================
// Adapter
// =============================================================================

impl HttpRater {
    pub fn new(id: impl Into<String>, endpoint: impl Into<String>) -> Result<Self, RaterError> {
        Self::with_config(id, endpoint, HttpRaterConfig::default())
    }

    pub fn with_config(
        id: impl Into<String>,
        endpoint: impl Into<String>,
        config: HttpRaterConfig,
    ) -> Result<Self, RaterError> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(RaterError::config(format!(
                "rater endpoint must be an http(s) URL, got {endpoint:?}"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            id: id.into(),
            endpoint,
            client,
            config,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, artifact: &Artifact) -> Result<RaterAssessment, RaterError> {
        let request = AssessRequest {
            artifact_id: artifact.id(),
            content_snapshot: artifact.content_snapshot(),
            context_tag: artifact.context_tag(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let mut context = ErrorContext::new().with_status(status.as_u16());
        if let Some(request_id) = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
        {
            context = context.with_request_id(request_id);
        }

        if !status.is_success() {
            let retryable = status.is_server_error() || status.as_u16() == 429;
            let body = response.text().await.unwrap_or_default();
            return Err(RaterError::upstream(
                format!("endpoint returned {status}: {}", body.trim()),
                retryable,
                context,
            ));
        }

        let parsed: AssessResponse = response
            .json()
            .await
            .map_err(|e| RaterError::protocol_with_context(e.to_string(), context.clone()))?;

        if parsed.refused {
            return Err(RaterError::refused(
                parsed.message.unwrap_or_else(|| "no reason given".to_string()),
            ));
        }
        let vector = parsed
            .vector
            .ok_or_else(|| RaterError::protocol_with_context("response carries no vector", context))?;

        let vector = RatingVector::new(
            vector.expressiveness.into_axis_rating()?,
            vector.dependency_flow.into_axis_rating()?,
            vector.error_surface.into_axis_rating()?,
        );
        Ok(RaterAssessment::new(self.id.clone(), artifact.id(), vector))
    }
}

#[async_trait::async_trait]
impl Rater for HttpRater {
    fn id(&self) -> &str {
        &self.id
    }

    async fn assess(&self, artifact: &Artifact) -> Result<RaterAssessment, RaterError> {
        let mut last_error: Option<RaterError> = None;

        for attempt in 0..=self.config.max_retries {
            match self.call(artifact).await {
                Ok(assessment) => return Ok(assessment),
                Err(err) => {
                    if !err.is_retryable() || attempt == self.config.max_retries {
                        return Err(err);
                    }
                    let delay = backoff_delay(self.config.retry_base_delay, attempt);
                    tracing::warn!(
                        rater = %self.id,
                        code = err.code(),
                        ?delay,
                        "retrying rater after error: {err}"
                    );
                    last_error = Some(err);
                    sleep(delay).await;
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RaterError::config("retry loop exited without an error")))
    }
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let multiplier = 2u64.pow(attempt.min(5));
    base * multiplier as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_must_be_http_urls() {
        assert!(HttpRater::new("r1", "ftp://rater.example").is_err());
        assert!(HttpRater::new("r1", "http://rater.example/assess").is_ok());
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 0), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(400));
    }
}
