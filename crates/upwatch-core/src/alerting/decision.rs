//! Alert backoff decisions
//!
//! Repeated alerts for one outage are spaced by a window that grows with the
//! outage: the gap between the last success and the last alert becomes the
//! wait before the next alert, capped by a hard ceiling. Any recovery re-arms
//! the policy so the next failure alerts immediately.

use crate::models::{round_minutes, EndpointRecord, Timestamp};

/// Longest gap between two alerts for the same outage, in seconds
pub const DEFAULT_REALERT_CEILING_SECS: f64 = 3600.0;

/// Outcome of evaluating an endpoint that just failed
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    /// Send an alert now
    Send {
        /// Backoff context, empty for the first alert of an outage
        reason: String,
    },
    /// Stay quiet, the backoff window is still open
    Suppress {
        /// Seconds until the window closes
        remaining_secs: f64,
    },
}

impl AlertDecision {
    /// Whether an alert should go out
    pub fn should_send(&self) -> bool {
        matches!(self, Self::Send { .. })
    }

    /// Reason attached to the alert, empty when suppressed
    pub fn reason(&self) -> &str {
        match self {
            Self::Send { reason } => reason,
            Self::Suppress { .. } => "",
        }
    }

    fn immediate() -> Self {
        Self::Send {
            reason: String::new(),
        }
    }
}

/// Decide whether a failing endpoint should alert at `now`, using the
/// default one hour ceiling
pub fn should_send_alert(record: &EndpointRecord, now: Timestamp) -> AlertDecision {
    should_send_alert_with_ceiling(record, now, DEFAULT_REALERT_CEILING_SECS)
}

/// Decide whether a failing endpoint should alert at `now`
///
/// Pure over its inputs. `ceiling_secs` bounds the wait between two alerts
/// no matter how long the previous window was.
pub fn should_send_alert_with_ceiling(
    record: &EndpointRecord,
    now: Timestamp,
    ceiling_secs: f64,
) -> AlertDecision {
    let (Some(last_alert), Some(_)) = (record.last_alert_time, record.last_failure_time) else {
        return AlertDecision::immediate();
    };

    let time_since_alert = now - last_alert;

    let Some(last_success) = record.last_success_time else {
        // Never up: no recovery to anchor a window on, only the ceiling applies
        let remaining = ceiling_secs - time_since_alert;
        return if remaining <= 0.0 {
            AlertDecision::Send {
                reason: "Never seen up".to_string(),
            }
        } else {
            AlertDecision::Suppress {
                remaining_secs: remaining,
            }
        };
    };

    // Recovered since the last alert
    if last_alert < last_success {
        return AlertDecision::immediate();
    }

    let window = last_alert - last_success;
    let down_since = now - last_success;
    let remaining = (window - time_since_alert).min(ceiling_secs - time_since_alert);

    if remaining <= 0.0 {
        AlertDecision::Send {
            reason: format!("Last seen up {} min ago", round_minutes(down_since)),
        }
    } else {
        AlertDecision::Suppress {
            remaining_secs: remaining,
        }
    }
}
