//! Session store configuration.

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Idle time in seconds before a session is dropped.
    pub ttl_seconds: u64,
    /// Interval in seconds between expiry sweeps.
    pub sweep_interval_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "burrow_session".to_string(),
            ttl_seconds: 300,
            sweep_interval_seconds: 60,
        }
    }
}
