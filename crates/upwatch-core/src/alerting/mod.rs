//! Alerting system for Upwatch
//!
//! Provides the backoff decision engine and notification delivery.

mod decision;
mod notifier;

pub use decision::{
    should_send_alert, should_send_alert_with_ceiling, AlertDecision,
    DEFAULT_REALERT_CEILING_SECS,
};
pub use notifier::{LogNotifier, MatrixNotifier, NotificationError, NotificationResult, Notifier};
