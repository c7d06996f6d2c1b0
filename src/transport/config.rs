//! Transport configuration.
//!
//! This module defines configuration options for the default transport,
//! used by replay and by the ambient fetch slot.

use serde::{Deserialize, Serialize};

/// Configuration for the default transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportConfig {
    /// Request timeout in milliseconds.
    ///
    /// Maximum time to wait for a complete response (including connection,
    /// headers, and body download). Defaults to 30000ms (30 seconds).
    ///
    /// Must be greater than 0.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl TransportConfig {
    /// Creates a new TransportConfig with the given timeout in milliseconds.
    pub fn new(timeout: u64) -> Self {
        Self { timeout }
    }

    /// Returns the timeout as a `std::time::Duration`.
    pub fn timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout == 0 {
            return Err("transport.timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30000
}
