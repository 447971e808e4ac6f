// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat records.
//!
//! The server sends a `ping` frame roughly every 3 seconds. Each one is
//! captured as an immutable [`HeartbeatRecord`]; health is recomputed on every
//! read from the age of the record. The default threshold of 6 seconds
//! tolerates a single missed server heartbeat.

use std::time::Duration;

use tokio::time::Instant;

/// Age at which a heartbeat is considered stale.
pub const STALE_THRESHOLD: Duration = Duration::from_secs(6);

/// A timestamped health marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatRecord {
    timestamp: Instant,
}

impl HeartbeatRecord {
    /// Captures a heartbeat at the current instant.
    pub fn new() -> Self {
        HeartbeatRecord {
            timestamp: Instant::now(),
        }
    }

    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Time elapsed since the heartbeat was captured.
    pub fn age(&self) -> Duration {
        self.timestamp.elapsed()
    }

    /// Healthy while younger than [`STALE_THRESHOLD`].
    pub fn is_healthy(&self) -> bool {
        self.is_healthy_within(STALE_THRESHOLD)
    }

    /// Healthy while younger than `threshold`.
    pub fn is_healthy_within(&self, threshold: Duration) -> bool {
        self.age() < threshold
    }
}

impl Default for HeartbeatRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
