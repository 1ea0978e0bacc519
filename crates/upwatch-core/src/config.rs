//! Configuration management for Upwatch
//!
//! The configuration is assembled once at startup from an optional TOML file
//! and `UPWATCH_<SECTION>__<KEY>` environment variables, then handed to the
//! monitor by value.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Endpoint;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "UPWATCH";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Monitored endpoints and state location
    pub monitor: MonitorConfig,

    /// Endpoint check configuration
    pub checker: CheckerConfig,

    /// Chat notification configuration
    pub notifier: NotifierConfig,

    /// Alert backoff configuration
    pub alerting: AlertingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading configuration file");
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the monitor cannot run with
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for endpoint in &self.monitor.endpoints {
            if endpoint.name.trim().is_empty() {
                return Err(Error::validation(format!(
                    "endpoint with url '{}' has an empty name",
                    endpoint.url
                )));
            }
            if !seen.insert(endpoint.name.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate endpoint name '{}'",
                    endpoint.name
                )));
            }
            url::Url::parse(&endpoint.url).map_err(|e| {
                Error::validation(format!(
                    "endpoint '{}' has an invalid url '{}': {e}",
                    endpoint.name, endpoint.url
                ))
            })?;
        }

        if self.checker.retries == 0 {
            return Err(Error::validation("checker.retries must be at least 1"));
        }

        Ok(())
    }
}

/// Monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Path of the persisted status file
    pub status_file: PathBuf,
    /// Endpoints checked on every run, in order
    pub endpoints: Vec<Endpoint>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            status_file: PathBuf::from("./tmp/monitor-status.json"),
            endpoints: Vec::new(),
        }
    }
}

/// Checker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Attempts per endpoint before it counts as failed
    pub retries: u32,
    /// Per-attempt request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Pause between attempts
    #[serde(with = "humantime_serde")]
    pub retry_delay: Duration,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            timeout: Duration::from_secs(10),
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Matrix notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Matrix homeserver base URL
    pub homeserver: String,
    /// Room the alerts are posted to
    pub room_id: Option<String>,
    /// Bot access token
    pub access_token: Option<String>,
    /// Delivery timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            homeserver: "https://matrix-client.matrix.org".to_string(),
            room_id: None,
            access_token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Alerting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertingConfig {
    /// Longest time an ongoing outage may go without a repeated alert
    #[serde(with = "humantime_serde")]
    pub max_realert_interval: Duration,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            max_realert_interval: Duration::from_secs(3600),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
