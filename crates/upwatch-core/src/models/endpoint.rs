//! Monitored endpoint descriptor

use serde::{Deserialize, Serialize};

/// A named HTTP(S) target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Unique name, also the key in the status file
    pub name: String,

    /// URL fetched with a GET request
    pub url: String,
}

impl Endpoint {
    /// Create a new endpoint
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
