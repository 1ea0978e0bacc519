//! Notification delivery for alerts

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::NotifierConfig;

/// Result of sending a notification
#[derive(Debug, Clone)]
pub struct NotificationResult {
    /// Channel the message went through
    pub channel_type: String,
    /// Whether delivery succeeded
    pub success: bool,
    /// Delivery error, if any
    pub error: Option<String>,
    /// When delivery was attempted
    pub sent_at: DateTime<Utc>,
}

impl NotificationResult {
    fn from_outcome(channel_type: &str, outcome: Result<(), NotificationError>) -> Self {
        Self {
            channel_type: channel_type.to_string(),
            success: outcome.is_ok(),
            error: outcome.err().map(|e| e.to_string()),
            sent_at: Utc::now(),
        }
    }
}

/// Delivers a formatted message to a chat destination
///
/// Implementations never fail loudly; delivery problems are reported through
/// [`NotificationResult::success`].
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a single message
    async fn send(&self, message: &str) -> NotificationResult;
}

/// Posts messages into a Matrix room
pub struct MatrixNotifier {
    client: Client,
    homeserver: String,
    room_id: Option<String>,
    access_token: Option<String>,
}

impl MatrixNotifier {
    /// Create a notifier from configuration
    pub fn new(config: &NotifierConfig) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            homeserver: config.homeserver.trim_end_matches('/').to_string(),
            room_id: config.room_id.clone().filter(|s| !s.is_empty()),
            access_token: config.access_token.clone().filter(|s| !s.is_empty()),
        })
    }

    /// Whether room and token are both present
    pub fn is_configured(&self) -> bool {
        self.room_id.is_some() && self.access_token.is_some()
    }

    async fn send_matrix(&self, message: &str) -> Result<(), NotificationError> {
        let (Some(room_id), Some(token)) = (&self.room_id, &self.access_token) else {
            return Err(NotificationError::ConfigError(
                "Matrix credentials not configured".to_string(),
            ));
        };

        let url = format!(
            "{}/_matrix/client/r0/rooms/{}/send/m.room.message",
            self.homeserver, room_id
        );

        let payload = MatrixMessage {
            msgtype: "m.text",
            body: message,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::HttpError(format!(
                "Matrix returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for MatrixNotifier {
    async fn send(&self, message: &str) -> NotificationResult {
        debug!(message = %message, "Sending notification");

        let outcome = self.send_matrix(message).await;
        match &outcome {
            Ok(()) => {
                info!(preview = %preview(message), "Matrix notification sent");
            }
            Err(NotificationError::ConfigError(reason)) => {
                warn!(reason = %reason, "Notification not sent");
            }
            Err(e) => {
                error!(error = %e, "Failed to send Matrix notification");
            }
        }

        NotificationResult::from_outcome("matrix", outcome)
    }
}

/// Logs messages instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> NotificationResult {
        info!(message = %message.trim_end(), "Dry run, notification not delivered");
        NotificationResult::from_outcome("log", Ok(()))
    }
}

/// Notification errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Transport failure or non-2xx response
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Missing credentials or unusable client settings
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// Matrix m.room.message event content
#[derive(Debug, Serialize)]
struct MatrixMessage<'a> {
    msgtype: &'a str,
    body: &'a str,
}

fn preview(message: &str) -> String {
    message.chars().take(50).collect()
}
