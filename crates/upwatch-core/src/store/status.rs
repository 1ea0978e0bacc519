//! JSON-file backed status store

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{EndpointRecord, StatusFile, Timestamp};

/// Durable mapping from endpoint name to its last-known timing facts
///
/// Every mutation rewrites the whole file. Persistence failures are logged
/// and swallowed; the in-memory copy stays authoritative for the run.
#[derive(Debug, Clone, Default)]
pub struct StatusStore {
    path: Option<PathBuf>,
    data: StatusFile,
}

impl StatusStore {
    /// Load the store from `path`, starting empty if it cannot be read
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let data = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<StatusFile>(&contents) {
                Ok(data) => {
                    debug!(
                        path = %path.display(),
                        endpoints = data.endpoints.len(),
                        "Loaded status file"
                    );
                    data
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Could not parse status file, starting fresh");
                    StatusFile::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No status file yet, starting fresh");
                StatusFile::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read status file, starting fresh");
                StatusFile::default()
            }
        };

        Self {
            path: Some(path),
            data,
        }
    }

    /// Create a store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Path the store persists to, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Record for an endpoint
    pub fn get(&self, name: &str) -> Option<&EndpointRecord> {
        self.data.endpoints.get(name)
    }

    /// All records, keyed by endpoint name
    pub fn records(&self) -> &StatusFile {
        &self.data
    }

    /// Record a check result at `now`
    pub fn update(&mut self, name: &str, success: bool, error: Option<String>, now: Timestamp) {
        let record = self.data.endpoints.entry(name.to_string()).or_default();

        if success {
            record.last_success_time = Some(now);
            record.current_error = None;
        } else {
            record.last_failure_time = Some(now);
            record.current_error = error;
        }

        self.persist();
    }

    /// Record that an alert for `name` was delivered at `now`
    pub fn record_alert_sent(&mut self, name: &str, now: Timestamp) {
        let Some(record) = self.data.endpoints.get_mut(name) else {
            warn!(endpoint = name, "Alert recorded for unknown endpoint, ignoring");
            return;
        };

        record.last_alert_time = Some(now);
        self.persist();
    }

    /// Outage length in minutes if `name` is currently down
    pub fn is_down(&self, name: &str, now: Timestamp) -> Option<i64> {
        self.get(name).and_then(|record| record.outage_minutes(now))
    }

    /// Write the full store, reporting failures to the caller
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&self.data)?;

        // Replace atomically so a crash mid-write never leaves a torn file
        let tmp_path = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.save() {
            warn!(
                path = ?self.path,
                error = %e,
                "Could not save status file"
            );
        }
    }
}
