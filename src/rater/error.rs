//! Error types for rater invocations.

use std::time::Duration;

use thiserror::Error;

use crate::error::EngineError;

/// Additional context from HTTP raters for debugging.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// HTTP status code returned by the rater endpoint.
    pub http_status: Option<u16>,
    /// Request ID echoed by the endpoint (x-request-id header).
    pub request_id: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// Errors a single rater invocation can produce.
///
/// A failed invocation invalidates only that rater's assessment; the
/// session decides whether enough raters remain.
#[derive(Debug, Error)]
pub enum RaterError {
    /// The rater did not respond within its window.
    #[error("rater timed out after {0:?}")]
    Timeout(Duration),

    /// The rater declined to assess this artifact - permanent.
    #[error("rater refused to assess: {message}")]
    Refused { message: String },

    /// The rater answered with something that is not a rating vector.
    #[error("malformed rater response: {message}")]
    Protocol {
        message: String,
        context: Option<ErrorContext>,
    },

    /// The rater endpoint reported a failure of its own.
    #[error("rater error: {message}")]
    Upstream {
        message: String,
        retryable: bool,
        context: Option<ErrorContext>,
    },

    /// HTTP/network error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error (bad endpoint, etc.).
    #[error("configuration error: {0}")]
    Config(String),

    /// An in-process rater's classification failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl RaterError {
    pub fn refused(message: impl Into<String>) -> Self {
        Self::Refused {
            message: message.into(),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            context: None,
        }
    }

    pub fn protocol_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::Protocol {
            message: message.into(),
            context: Some(context),
        }
    }

    pub fn upstream(message: impl Into<String>, retryable: bool, context: ErrorContext) -> Self {
        Self::Upstream {
            message: message.into(),
            retryable,
            context: Some(context),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether retrying the same rater could help.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Refused { .. } => false,
            Self::Protocol { .. } => false,
            Self::Upstream { retryable, .. } => *retryable,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Config(_) => false,
            Self::Engine(_) => false,
        }
    }

    /// Short error code for logging and failure records.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Refused { .. } => "refused",
            Self::Protocol { .. } => "protocol",
            Self::Upstream { .. } => "upstream",
            Self::Http(_) => "http",
            Self::Config(_) => "config",
            Self::Engine(_) => "engine",
        }
    }

    /// Attached HTTP context, if any.
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Protocol { context, .. } | Self::Upstream { context, .. } => context.as_ref(),
            _ => None,
        }
    }
}
