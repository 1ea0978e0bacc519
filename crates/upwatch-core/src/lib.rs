//! # Upwatch
//!
//! Endpoint uptime monitor with backoff-suppressed chat alerts.
//!
//! Each invocation checks a fixed set of HTTP endpoints, records the results
//! in a JSON status file, and posts alert and recovery messages to a Matrix
//! room. Repeated alerts for one outage are spaced out by a window that grows
//! with the outage and is capped at one hour.
//!
//! ## Architecture
//!
//! - **Checker**: HTTP checks with bounded retries
//! - **Store**: JSON status file, rewritten after every change
//! - **Alerting**: pure backoff decisions and notification delivery
//! - **Monitor**: one run over all endpoints
//!
//! ## Quick Start
//!
//! ```bash
//! # One monitoring pass, typically from cron or a systemd timer
//! upwatch --config upwatch.toml run
//!
//! # Check only, no state and no notifications
//! upwatch --config upwatch.toml check
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod checker;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod store;

pub use crate::config::Config;
pub use error::{Error, Result};
pub use monitor::{Monitor, RunSummary};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{AlertDecision, Notifier};
    pub use crate::checker::{CheckOutcome, Checker};
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::monitor::{Monitor, RunSummary};
    pub use crate::store::StatusStore;
}
