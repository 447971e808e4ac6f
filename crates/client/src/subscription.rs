// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Channel subscriptions.
//!
//! A subscription moves through:
//!
//! ```text
//! unsubscribed --create (offline)--> connection_pending --welcome--> pending
//! unsubscribed --create (online)---> pending --confirm--> subscribed
//!                                    pending --reject---> rejected
//! subscribed --connection closed--> connection_pending
//! any --remove--> unsubscribed
//! ```
//!
//! Frames sent while pending are queued and flushed in order once the server
//! confirms the subscription. A rejection drops the queue for good; only a
//! new `create()` reopens it.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use cable_core::{Command, ConnectionState, FrameType, Identifier, OutboundFrame, ServerFrame, SubscriptionState};

use crate::connection::{Connection, ConnectionInner};

/// Callback receiving the `message` payload of channel broadcasts.
pub type ReceiveCallback = Arc<dyn Fn(Value) + Send + Sync>;

/// Handle to a channel subscription on a [`Connection`].
///
/// The subscription is registered with its connection at construction and
/// lives in the connection's registry; the handle only refers to the
/// connection weakly and becomes inert once the connection is gone.
#[derive(Clone)]
pub struct Subscription {
    core: Arc<SubscriptionCore>,
    connection: Weak<ConnectionInner>,
}

/// State shared between the handle and the connection's registry.
pub(crate) struct SubscriptionCore {
    id: Uuid,
    identifier: Identifier,
    slot: Mutex<Slot>,
}

struct Slot {
    state: SubscriptionState,
    queue: VecDeque<OutboundFrame>,
    callback: Option<ReceiveCallback>,
}

impl Subscription {
    /// Registers a subscription for `identifier` with `connection`.
    ///
    /// Nothing is sent until [`Subscription::create`] is called.
    pub fn new(connection: &Connection, identifier: Identifier) -> Self {
        let core = Arc::new(SubscriptionCore::new(identifier));
        connection.register(Arc::clone(&core));
        Subscription {
            core,
            connection: connection.downgrade(),
        }
    }

    /// Registers a subscription for a channel without extra identifier fields.
    pub fn for_channel(connection: &Connection, channel: &str) -> Self {
        Self::new(connection, Identifier::new(channel))
    }

    pub(crate) fn from_core(core: Arc<SubscriptionCore>, connection: Weak<ConnectionInner>) -> Self {
        Subscription { core, connection }
    }

    /// Local registry id. Not part of the protocol.
    pub fn id(&self) -> Uuid {
        self.core.id
    }

    pub fn identifier(&self) -> &Identifier {
        &self.core.identifier
    }

    pub fn state(&self) -> SubscriptionState {
        self.core.state()
    }

    /// Number of frames waiting for confirmation.
    pub fn queued(&self) -> usize {
        self.core.lock().queue.len()
    }

    /// Subscribe at the server, or defer until the connection is up.
    pub fn create(&self) {
        if let Some(connection) = self.connection() {
            self.core.create(&connection);
        }
    }

    /// Unsubscribe at the server.
    pub fn remove(&self) {
        if let Some(connection) = self.connection() {
            self.core.remove(&connection);
        }
    }

    /// Perform an action on the channel, queueing it while pending.
    pub fn send(&self, frame: OutboundFrame) {
        if let Some(connection) = self.connection() {
            self.core.send(&connection, frame);
        }
    }

    /// Register the callback for channel broadcasts, replacing any previous one.
    pub fn on_receive(&self, callback: impl Fn(Value) + Send + Sync + 'static) {
        self.core.lock().callback = Some(Arc::new(callback));
    }

    pub fn clear_receive_callback(&self) {
        self.core.lock().callback = None;
    }

    fn connection(&self) -> Option<Connection> {
        let connection = self.connection.upgrade().map(Connection::from_inner);
        if connection.is_none() {
            warn!("Connection for {} is gone, ignoring", self.core.identifier);
        }
        connection
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.core.id)
            .field("identifier", &self.core.identifier.to_json())
            .field("state", &self.core.state())
            .finish()
    }
}

impl SubscriptionCore {
    fn new(identifier: Identifier) -> Self {
        SubscriptionCore {
            id: Uuid::new_v4(),
            identifier,
            slot: Mutex::new(Slot {
                state: SubscriptionState::Unsubscribed,
                queue: VecDeque::new(),
                callback: None,
            }),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    pub(crate) fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub(crate) fn state(&self) -> SubscriptionState {
        self.lock().state
    }

    // Lock order is always subscription, then connection. The slot stays
    // locked while frames are handed to the connection so that a flush
    // cannot interleave with concurrent sends.
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn create(&self, connection: &Connection) {
        let mut slot = self.lock();
        if connection.state() != ConnectionState::Connected {
            debug!("Connection not ready, deferring subscription to {}", self.identifier);
            slot.state = SubscriptionState::ConnectionPending;
            return;
        }

        debug!("Creating subscription to {}", self.identifier);
        connection.send(&Command::subscribe(&self.identifier));
        slot.state = SubscriptionState::Pending;
    }

    pub(crate) fn remove(&self, connection: &Connection) {
        let mut slot = self.lock();
        debug!("Removing subscription to {}", self.identifier);
        connection.send(&Command::unsubscribe(&self.identifier));
        slot.state = SubscriptionState::Unsubscribed;
        slot.queue.clear();
    }

    pub(crate) fn send(&self, connection: &Connection, frame: OutboundFrame) {
        let mut slot = self.lock();
        if slot.state.is_pending() {
            slot.queue.push_back(frame);
        } else if slot.state == SubscriptionState::Subscribed {
            self.deliver(connection, &frame);
        } else {
            warn!(
                "Not subscribed to {} ({}), message discarded",
                self.identifier, slot.state
            );
        }
    }

    /// Handle a frame routed to this subscription by the connection.
    pub(crate) fn received(&self, connection: &Connection, frame: &ServerFrame) {
        match frame.frame_type() {
            Some(FrameType::ConfirmSubscription) => {
                let mut slot = self.lock();
                debug!("Subscription to {} confirmed", self.identifier);
                slot.state = SubscriptionState::Subscribed;
                while let Some(queued) = slot.queue.pop_front() {
                    self.deliver(connection, &queued);
                }
            }
            Some(FrameType::RejectSubscription) => {
                let mut slot = self.lock();
                warn!("Subscription to {} rejected", self.identifier);
                slot.state = SubscriptionState::Rejected;
                slot.queue.clear();
            }
            _ => self.dispatch(frame),
        }
    }

    /// Move a live subscription back to waiting for the connection.
    pub(crate) fn park(&self) {
        let mut slot = self.lock();
        if slot.state == SubscriptionState::Subscribed {
            slot.state = SubscriptionState::ConnectionPending;
        }
    }

    fn deliver(&self, connection: &Connection, frame: &OutboundFrame) {
        connection.send(&Command::message(&self.identifier, frame));
    }

    fn dispatch(&self, frame: &ServerFrame) {
        // Invoked outside the slot lock so the callback may use the subscription.
        let callback = self.lock().callback.clone();
        let (Some(callback), Some(message)) = (callback, frame.message.as_ref()) else {
            debug!("Ignoring frame for {} without callback or message", self.identifier);
            return;
        };

        let message = message.clone();
        if panic::catch_unwind(AssertUnwindSafe(|| callback(message))).is_err() {
            error!("Receive callback for {} panicked", self.identifier);
        }
    }
}
