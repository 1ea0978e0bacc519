//! Persisted per-endpoint status records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Seconds since the Unix epoch, fractional
pub type Timestamp = f64;

/// Last-known timing facts for one endpoint
///
/// Timestamps are written by the caller at update time and are never
/// back-dated by later checks. The down/up state is derived, not stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointRecord {
    /// Time of the most recent successful check
    pub last_success_time: Option<Timestamp>,

    /// Time of the most recent failed check
    pub last_failure_time: Option<Timestamp>,

    /// Time the most recent alert was delivered
    pub last_alert_time: Option<Timestamp>,

    /// Error of the most recent failure, cleared on success
    pub current_error: Option<String>,
}

impl EndpointRecord {
    /// Down when both a success and a failure are known and the failure is later
    pub fn is_down(&self) -> bool {
        matches!(
            (self.last_success_time, self.last_failure_time),
            (Some(success), Some(failure)) if success < failure
        )
    }

    /// Minutes since the last success, rounded, if the endpoint is down
    pub fn outage_minutes(&self, now: Timestamp) -> Option<i64> {
        if !self.is_down() {
            return None;
        }
        self.last_success_time
            .map(|success| round_minutes(now - success))
    }
}

/// On-disk layout of the status file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusFile {
    /// Records keyed by endpoint name
    pub endpoints: BTreeMap<String, EndpointRecord>,
}

/// Convert a span of seconds to whole minutes, rounding to nearest
///
/// Half-minute ties go to the even minute, so 150s is 2 minutes and 210s is 4.
pub fn round_minutes(seconds: f64) -> i64 {
    (seconds / 60.0).round_ties_even() as i64
}
