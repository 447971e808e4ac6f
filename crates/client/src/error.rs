// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by construction-time APIs of the client.
///
/// Connection and subscription operations never return these: faults at
/// runtime degrade to logged state transitions instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cable_core::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
