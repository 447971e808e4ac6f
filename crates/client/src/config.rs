// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! url = "wss://example.com/cable"
//! origin = "https://example.com"
//! log_ping = false
//! stale_threshold_secs = 6
//! monitor_interval_ms = 1000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Connection settings for a cable client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// URL of the cable server (`ws://` or `wss://`).
    pub url: String,
    /// Origin header sent with the handshake. May be overridden per connect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Log every received ping at debug level (default: false).
    #[serde(default)]
    pub log_ping: bool,
    /// Heartbeat age in seconds after which the connection is considered
    /// dead (default: 6). Must exceed the server heartbeat cadence (3s).
    #[serde(default = "default_stale_threshold_secs")]
    pub stale_threshold_secs: u64,
    /// Period of the liveness monitor in milliseconds (default: 1000).
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
}

fn default_stale_threshold_secs() -> u64 {
    cable_core::STALE_THRESHOLD.as_secs()
}

fn default_monitor_interval_ms() -> u64 {
    1000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: "ws://localhost:3000/cable".to_string(),
            origin: None,
            log_ping: false,
            stale_threshold_secs: default_stale_threshold_secs(),
            monitor_interval_ms: default_monitor_interval_ms(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given URL with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        ClientConfig {
            url: url.into(),
            ..ClientConfig::default()
        }
    }

    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_log_ping(mut self, log_ping: bool) -> Self {
        self.log_ping = log_ping;
        self
    }

    /// Parses and validates a TOML configuration.
    pub fn from_toml(s: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Checks that the URL is a WebSocket URL and the timings are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(Error::Config(format!(
                "invalid url '{}': must start with ws:// or wss://",
                self.url
            )));
        }
        if self.stale_threshold_secs == 0 {
            return Err(Error::Config(
                "stale_threshold_secs must be greater than 0".to_string(),
            ));
        }
        if self.monitor_interval_ms == 0 {
            return Err(Error::Config(
                "monitor_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_threshold_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
