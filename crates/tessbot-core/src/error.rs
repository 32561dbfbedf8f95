//! API error types.
//!
//! Defined in `tessbot-core` so the oracle, runner and traversal can classify
//! failures without string matching: transient errors are retried by the client
//! and contained to a question or topic, fatal errors abort the run.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the quiz API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The connection failed before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The request timed out after the given per-call timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The API answered with a non-2xx status other than an auth rejection.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    /// The bearer token was rejected.
    #[error("authentication failed (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The response did not have the expected shape, or the score moved in a
    /// way that cannot be attributed to a single answer.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl ApiError {
    /// Returns `true` if the request may succeed when repeated.
    ///
    /// Client errors (4xx) are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Auth { .. } | ApiError::Protocol(_) => false,
        }
    }

    /// Returns `true` if no further result of the run can be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiError::Auth { .. } | ApiError::Protocol(_))
    }
}
