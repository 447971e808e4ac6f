// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection and subscription lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a cable connection.
///
/// ```text
/// disconnected --connect--> connecting --open--> connected
/// connected --close (requested)--> disconnected
/// connected --close (unrequested)--> uncontrolled_disconnected --reconnect--> connecting
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// A close was requested and is waiting for the transport to confirm it.
    Disconnecting,
    /// The transport closed or failed without being asked to.
    UncontrolledDisconnected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::UncontrolledDisconnected => "uncontrolled_disconnected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a channel subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Unsubscribed,
    /// Waiting for the connection before the subscribe command can be sent.
    ConnectionPending,
    /// Subscribe command sent, waiting for confirmation.
    Pending,
    Subscribed,
    Rejected,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Unsubscribed => "unsubscribed",
            SubscriptionState::ConnectionPending => "connection_pending",
            SubscriptionState::Pending => "pending",
            SubscriptionState::Subscribed => "subscribed",
            SubscriptionState::Rejected => "rejected",
        }
    }

    /// Outbound frames are queued rather than sent in these states.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SubscriptionState::Pending | SubscriptionState::ConnectionPending
        )
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
