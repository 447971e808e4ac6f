// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! cable-core: Shared value types for the cable client.
//!
//! This crate provides the wire frames, channel identifiers, outbound
//! messages, heartbeat records and lifecycle states used by the `cable`
//! client library and binary.

pub mod error;
pub mod heartbeat;
pub mod identifier;
pub mod message;
pub mod protocol;
pub mod state;

pub use error::{Error, Result};
pub use heartbeat::{HeartbeatRecord, STALE_THRESHOLD};
pub use identifier::{Identifier, CHANNEL_KEY};
pub use message::{OutboundFrame, ACTION_KEY};
pub use protocol::{Command, FrameType, ServerFrame};
pub use state::{ConnectionState, SubscriptionState};
