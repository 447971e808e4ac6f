// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Channel identifiers.
//!
//! An identifier is the protocol-level correlation key between a client
//! subscription and the server-side channel. On the wire it travels as a
//! JSON-encoded string nested inside the frame, so it is encoded twice.
//!
//! Keys are held in a `BTreeMap`, which gives two properties:
//! - the encoding is canonical (keys sorted), so equal identifiers always
//!   produce the same string
//! - equality is structural over the decoded mapping, never a raw string
//!   comparison

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Key holding the channel name discriminator.
pub const CHANNEL_KEY: &str = "channel";

/// The identifier of a channel subscription.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier {
    fields: BTreeMap<String, Value>,
}

impl Identifier {
    /// Creates an identifier for the given channel name.
    pub fn new(channel: impl Into<String>) -> Self {
        Identifier::default().with(CHANNEL_KEY, channel.into())
    }

    /// Adds (or replaces) a field, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Adds (or replaces) a field.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the channel name, if present.
    pub fn channel(&self) -> Option<&str> {
        self.fields.get(CHANNEL_KEY).and_then(Value::as_str)
    }

    /// Returns a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields, sorted by key.
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Canonical JSON encoding (keys sorted).
    pub fn to_json(&self) -> String {
        let object: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        Value::Object(object).to_string()
    }

    /// Decodes an identifier from the JSON string carried in a frame.
    pub fn parse(s: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(s)? {
            Value::Object(object) => Ok(Identifier::from(object)),
            _ => Err(Error::InvalidIdentifier(s.to_string())),
        }
    }
}

impl From<Map<String, Value>> for Identifier {
    fn from(object: Map<String, Value>) -> Self {
        Identifier {
            fields: object.into_iter().collect(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json())
    }
}

#[cfg(test)]
#[path = "identifier_tests.rs"]
mod tests;
