//! Endpoint availability checks

mod http;

pub use http::HttpChecker;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::Endpoint;

/// Result of probing one endpoint, after retries
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    /// Whether the endpoint answered with a 2xx status
    pub success: bool,
    /// Error of the final attempt
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Successful check
    pub fn up() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Failed check with its error message
    pub fn down(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Checks an endpoint with bounded retries
///
/// Check failures are part of the outcome, never an `Err`.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Check `endpoint`
    async fn check(&self, endpoint: &Endpoint) -> CheckOutcome;
}

/// Check errors, normalized to the messages shown in alerts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// Attempt exceeded the request timeout
    #[error("Request timed out")]
    Timeout,

    /// Could not connect, including DNS failures
    #[error("Connection error")]
    Connection,

    /// Server answered with a non-2xx status
    #[error("Expected status 2XX, got {0}")]
    BadStatus(u16),

    /// Anything else; not retried
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl CheckError {
    /// Whether another attempt may help
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Unexpected(_))
    }
}
