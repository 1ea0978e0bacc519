//! Wall-clock source for the monitor

use chrono::Utc;

use crate::models::Timestamp;

/// Supplies the current time as epoch seconds
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Timestamp;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().timestamp_millis() as f64 / 1000.0
    }
}
