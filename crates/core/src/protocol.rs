// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Action Cable wire frames.
//!
//! Every frame is a JSON object sent as one text message. The `identifier`
//! field is itself a JSON-encoded string, so it is decoded twice:
//!
//! - Client sends `subscribe`, `unsubscribe` and `message` commands
//! - Server sends `welcome`, `ping`, subscription confirmations/rejections,
//!   and channel broadcasts (`identifier` + `message`, no `type`)

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::identifier::Identifier;
use crate::message::OutboundFrame;

/// Commands sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Subscribe to the channel named by the identifier.
    Subscribe { identifier: String },

    /// Stop receiving broadcasts for the identifier.
    Unsubscribe { identifier: String },

    /// Perform an action on a subscribed channel.
    Message {
        identifier: String,
        /// The JSON-encoded message, see [`OutboundFrame::raw`].
        data: String,
    },
}

impl Command {
    /// Creates a Subscribe command.
    pub fn subscribe(identifier: &Identifier) -> Self {
        Command::Subscribe {
            identifier: identifier.to_json(),
        }
    }

    /// Creates an Unsubscribe command.
    pub fn unsubscribe(identifier: &Identifier) -> Self {
        Command::Unsubscribe {
            identifier: identifier.to_json(),
        }
    }

    /// Creates a Message command carrying the given frame.
    pub fn message(identifier: &Identifier, frame: &OutboundFrame) -> Self {
        Command::Message {
            identifier: identifier.to_json(),
            data: frame.raw(),
        }
    }

    /// The encoded identifier the command targets.
    pub fn identifier(&self) -> &str {
        match self {
            Command::Subscribe { identifier }
            | Command::Unsubscribe { identifier }
            | Command::Message { identifier, .. } => identifier,
        }
    }

    /// Serializes the command to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the command from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Recognized values of a server frame's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Welcome,
    Ping,
    ConfirmSubscription,
    RejectSubscription,
    /// Present but not one of the above.
    Unknown,
}

impl FrameType {
    fn parse(kind: &str) -> Self {
        match kind {
            "welcome" => FrameType::Welcome,
            "ping" => FrameType::Ping,
            "confirm_subscription" => FrameType::ConfirmSubscription,
            "reject_subscription" => FrameType::RejectSubscription,
            _ => FrameType::Unknown,
        }
    }
}

/// A frame sent from server to client.
///
/// Kept loosely typed: every field is optional and unknown fields are
/// preserved in `extra`, so frames from newer servers still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerFrame {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// JSON-encoded identifier of the channel the frame belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Broadcast payload (or the timestamp of a ping).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ServerFrame {
    /// Creates a welcome frame.
    pub fn welcome() -> Self {
        ServerFrame::typed("welcome")
    }

    /// Creates a ping frame carrying a server timestamp.
    pub fn ping(timestamp: u64) -> Self {
        ServerFrame {
            message: Some(Value::from(timestamp)),
            ..ServerFrame::typed("ping")
        }
    }

    /// Creates a subscription confirmation.
    pub fn confirm(identifier: &Identifier) -> Self {
        ServerFrame {
            identifier: Some(identifier.to_json()),
            ..ServerFrame::typed("confirm_subscription")
        }
    }

    /// Creates a subscription rejection.
    pub fn reject(identifier: &Identifier) -> Self {
        ServerFrame {
            identifier: Some(identifier.to_json()),
            ..ServerFrame::typed("reject_subscription")
        }
    }

    /// Creates a channel broadcast.
    pub fn broadcast(identifier: &Identifier, message: Value) -> Self {
        ServerFrame {
            identifier: Some(identifier.to_json()),
            message: Some(message),
            ..ServerFrame::default()
        }
    }

    fn typed(kind: &str) -> Self {
        ServerFrame {
            kind: Some(kind.to_string()),
            ..ServerFrame::default()
        }
    }

    /// The frame type, if the frame has one.
    pub fn frame_type(&self) -> Option<FrameType> {
        self.kind.as_deref().map(FrameType::parse)
    }

    /// Decodes the nested identifier, if the frame has one.
    pub fn decode_identifier(&self) -> Option<Result<Identifier>> {
        self.identifier.as_deref().map(Identifier::parse)
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the frame from JSON.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
