// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cable: Action Cable client.
//!
//! Keeps one WebSocket session to a cable server, multiplexes channel
//! subscriptions over it, and recovers from silent transport death.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Subscription │────►│ Connection  │────►│  Session    │──► Transport
//! │  (queue)     │◄────│ (registry)  │◄────│  (task)     │◄── (trait)
//! └──────────────┘     └─────────────┘     └─────────────┘
//!                             ▲
//!                             │ reconnect when stale
//!                      ┌─────────────┐
//!                      │  Liveness   │
//!                      │  Monitor    │
//!                      └─────────────┘
//! ```
//!
//! # Features
//!
//! - Subscriptions created before the socket is up are sent on `welcome`
//! - Actions performed while pending are flushed in order on confirmation
//! - Server pings feed a heartbeat; a stale heartbeat forces a reconnect
//! - At most one session is open at any time, even across reconnects
//! - Injectable transport trait for testing
//!
//! # Example
//!
//! ```no_run
//! use cable::{Connection, Identifier, OutboundFrame, Subscription};
//!
//! # async fn example() -> cable::Result<()> {
//! let connection = Connection::new("ws://localhost:3000/cable")?;
//! let chat = Subscription::new(&connection, Identifier::new("ChatChannel").with("room", "lobby"));
//! chat.on_receive(|message| println!("{message}"));
//!
//! connection.connect(Some("http://localhost:3000"));
//! chat.create();
//! chat.send(OutboundFrame::new("speak").with("body", "hello"));
//! # Ok(())
//! # }
//! ```

mod config;
mod connection;
mod error;
mod monitor;
mod session;
mod subscription;
mod transport;

pub use config::ClientConfig;
pub use connection::Connection;
pub use error::{Error, Result};
pub use monitor::{LivenessMonitor, Monitored};
pub use subscription::{ReceiveCallback, Subscription};
pub use transport::{
    websocket_factory, Transport, TransportError, TransportFactory, TransportResult,
    WebSocketTransport,
};

pub use cable_core::{
    Command, ConnectionState, FrameType, HeartbeatRecord, Identifier, OutboundFrame, ServerFrame,
    SubscriptionState, STALE_THRESHOLD,
};

#[cfg(test)]
mod test_helpers;
