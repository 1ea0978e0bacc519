//! HTTP GET check with fixed-delay retries

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use super::{CheckError, CheckOutcome, Checker};
use crate::config::CheckerConfig;
use crate::error::{Error, Result};
use crate::models::Endpoint;

/// Checks endpoints with plain GET requests
pub struct HttpChecker {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpChecker {
    /// Create a checker from configuration
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            retries: config.retries.max(1),
            retry_delay: config.retry_delay,
        })
    }

    async fn attempt(&self, url: &str) -> std::result::Result<u16, CheckError> {
        let response = self.client.get(url).send().await.map_err(classify)?;
        let status = response.status();

        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(CheckError::BadStatus(status.as_u16()))
        }
    }
}

#[async_trait]
impl Checker for HttpChecker {
    async fn check(&self, endpoint: &Endpoint) -> CheckOutcome {
        for attempt in 1..=self.retries {
            match self.attempt(&endpoint.url).await {
                Ok(status) => {
                    info!(endpoint = %endpoint.name, status, "Endpoint OK");
                    return CheckOutcome::up();
                }
                Err(e) if !e.is_retryable() => {
                    warn!(endpoint = %endpoint.name, error = %e, "Endpoint check failed");
                    return CheckOutcome::down(e.to_string());
                }
                Err(e) if attempt < self.retries => {
                    debug!(
                        endpoint = %endpoint.name,
                        error = %e,
                        attempt,
                        retries = self.retries,
                        "Endpoint check failed, retrying"
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    warn!(
                        endpoint = %endpoint.name,
                        error = %e,
                        retries = self.retries,
                        "Endpoint check failed, all retries exhausted"
                    );
                    return CheckOutcome::down(e.to_string());
                }
            }
        }

        CheckOutcome::down("All retries exhausted")
    }
}

fn classify(err: reqwest::Error) -> CheckError {
    if err.is_timeout() {
        CheckError::Timeout
    } else if err.is_connect() {
        CheckError::Connection
    } else {
        CheckError::Unexpected(err.to_string())
    }
}
