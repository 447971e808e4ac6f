// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cable-core operations.

use thiserror::Error;

/// All possible errors that can occur while building or decoding frames.
#[derive(Debug, Error)]
pub enum Error {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid identifier: {0}\n  hint: identifiers are JSON objects such as {{\"channel\":\"ChatChannel\"}}")]
    InvalidIdentifier(String),

    #[error("invalid payload: {0}\n  hint: frame payloads must be JSON objects")]
    InvalidPayload(String),
}

/// A specialized Result type for cable-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
