//! Queued alert and recovery notices

use serde::Serialize;

use super::Endpoint;

/// Alert queued during a run, delivered after all endpoints are checked
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingAlert {
    /// The failing endpoint
    pub endpoint: Endpoint,
    /// Error reported by the checker
    pub error: Option<String>,
    /// Backoff reason, empty for the first alert of an outage
    pub reason: String,
}

impl PendingAlert {
    /// Chat message body
    pub fn message(&self) -> String {
        format!(
            "🚨 MONITOR ALERT: {} is down with error: {}\n  URL: {}\n  {}\n",
            self.endpoint.name,
            self.error.as_deref().unwrap_or("unknown error"),
            self.endpoint.url,
            self.reason
        )
    }
}

/// Recovery notice for an endpoint that came back up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingRecovery {
    /// The recovered endpoint
    pub endpoint: Endpoint,
    /// Outage length measured before the successful check was recorded
    pub outage_minutes: i64,
}

impl PendingRecovery {
    /// Chat message body
    pub fn message(&self) -> String {
        format!(
            "✅ MONITOR RECOVERY: {} is back up\n  URL: {}\n  Recovered after about {} min down\n",
            self.endpoint.name, self.endpoint.url, self.outage_minutes
        )
    }
}
