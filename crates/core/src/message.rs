// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound channel messages.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Key the action name is merged under when a frame is serialized.
pub const ACTION_KEY: &str = "action";

/// An action performed on a channel, together with its payload.
///
/// On the wire the action name is merged into the payload under
/// [`ACTION_KEY`]; the action wins over a payload field of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundFrame {
    action: String,
    payload: Map<String, Value>,
}

impl OutboundFrame {
    /// Creates a frame with an empty payload.
    pub fn new(action: impl Into<String>) -> Self {
        OutboundFrame {
            action: action.into(),
            payload: Map::new(),
        }
    }

    /// Creates a frame from an existing payload object.
    pub fn with_payload(action: impl Into<String>, payload: Map<String, Value>) -> Self {
        OutboundFrame {
            action: action.into(),
            payload,
        }
    }

    /// Creates a frame from an arbitrary JSON value, which must be an object.
    pub fn from_value(action: impl Into<String>, payload: Value) -> Result<Self> {
        match payload {
            Value::Object(payload) => Ok(OutboundFrame::with_payload(action, payload)),
            other => Err(Error::InvalidPayload(other.to_string())),
        }
    }

    /// Adds (or replaces) a payload field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// The payload with the action merged in.
    pub fn message(&self) -> Map<String, Value> {
        let mut message = self.payload.clone();
        message.insert(ACTION_KEY.to_string(), Value::String(self.action.clone()));
        message
    }

    /// The merged message encoded as JSON, as carried in the `data` field of
    /// a `message` command.
    pub fn raw(&self) -> String {
        Value::Object(self.message()).to_string()
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
