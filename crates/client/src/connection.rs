// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection lifecycle and frame routing.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures_util::future::BoxFuture;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use cable_core::{Command, ConnectionState, FrameType, Identifier, ServerFrame, SubscriptionState};

use crate::config::ClientConfig;
use crate::error::Result;
use crate::monitor::{LivenessMonitor, Monitored};
use crate::session::{self, SessionHandle, SessionParams};
use crate::subscription::{Subscription, SubscriptionCore};
use crate::transport::{websocket_factory, TransportFactory};

/// A client connection to a cable server.
///
/// Cloning yields another handle on the same connection. Background tasks
/// only hold weak references: once the last handle is dropped the session
/// is closed and the liveness monitor stops.
///
/// All methods must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

pub(crate) struct ConnectionInner {
    config: ClientConfig,
    factory: TransportFactory,
    shared: Mutex<Shared>,
    monitor: LivenessMonitor,
}

struct Shared {
    state: ConnectionState,
    /// Origin used by the current session, reused on reconnect.
    origin: Option<String>,
    generation: u64,
    session: Option<SessionHandle>,
    /// Set by `disconnect()`, cleared by `connect()`. A reconnect in flight
    /// does not reopen once this is set.
    close_requested: bool,
    subscriptions: HashMap<Uuid, Arc<SubscriptionCore>>,
}

impl Connection {
    /// Creates a disconnected connection to `url` with default settings.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(url))
    }

    /// Creates a disconnected connection using WebSocket transports.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, websocket_factory())
    }

    /// Creates a disconnected connection with a custom transport factory.
    pub fn with_transport(config: ClientConfig, factory: TransportFactory) -> Result<Self> {
        config.validate()?;
        let monitor = LivenessMonitor::new(config.stale_threshold(), config.monitor_interval());
        let origin = config.origin.clone();
        Ok(Connection {
            inner: Arc::new(ConnectionInner {
                config,
                factory,
                shared: Mutex::new(Shared {
                    state: ConnectionState::Disconnected,
                    origin,
                    generation: 0,
                    session: None,
                    close_requested: false,
                    subscriptions: HashMap::new(),
                }),
                monitor,
            }),
        })
    }

    pub(crate) fn from_inner(inner: Arc<ConnectionInner>) -> Self {
        Connection { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<ConnectionInner> {
        Arc::downgrade(&self.inner)
    }

    pub fn url(&self) -> &str {
        &self.inner.config.url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Origin sent with the current (or next) handshake.
    pub fn origin(&self) -> Option<String> {
        self.inner.lock().origin.clone()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn monitor(&self) -> &LivenessMonitor {
        &self.inner.monitor
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.lock().subscriptions.len()
    }

    /// Open a session, optionally overriding the configured origin.
    ///
    /// Returns immediately with the state set to `connecting`; the state
    /// becomes `connected` once the handshake completes. Does nothing if a
    /// session is already connecting or connected.
    pub fn connect(&self, origin: Option<&str>) {
        {
            let mut shared = self.inner.lock();
            if matches!(
                shared.state,
                ConnectionState::Connecting | ConnectionState::Connected
            ) {
                warn!("Already {}, ignoring connect", shared.state);
                return;
            }

            if let Some(origin) = origin {
                shared.origin = Some(origin.to_string());
            }
            shared.close_requested = false;

            let predecessor = shared.session.take().map(|previous| {
                previous.cancel.cancel();
                previous.task
            });
            shared.generation += 1;

            info!("Connecting to {}", self.inner.config.url);
            shared.session = Some(session::spawn(SessionParams {
                connection: self.downgrade(),
                generation: shared.generation,
                url: self.inner.config.url.clone(),
                origin: shared.origin.clone(),
                transport: (self.inner.factory)(),
                predecessor,
            }));
            shared.state = ConnectionState::Connecting;
        }

        // Every session starts with a fresh staleness window.
        if self.inner.monitor.is_started() {
            self.inner.monitor.record_heartbeat();
        } else {
            self.inner.monitor.start(self.downgrade());
        }
    }

    /// Request the current session to close.
    ///
    /// The state becomes `disconnecting` until the transport reports the
    /// close, then `disconnected`. The liveness monitor keeps running but
    /// does nothing while disconnected.
    pub fn disconnect(&self) {
        let mut shared = self.inner.lock();
        shared.close_requested = true;
        match shared.session.as_ref() {
            Some(session) if !session.task.is_finished() => {
                info!("Disconnecting from {}", self.inner.config.url);
                session.cancel.cancel();
                shared.state = ConnectionState::Disconnecting;
            }
            _ => {
                debug!("No open session, marking disconnected");
                shared.session = None;
                shared.state = ConnectionState::Disconnected;
            }
        }
    }

    /// Close the current session, wait for it to finish, and open a new one
    /// with the same origin. A `disconnect()` made while the old session is
    /// closing wins: no new session is opened.
    pub async fn reconnect(&self) {
        info!("Reconnecting to {}", self.inner.config.url);
        self.park_subscriptions();

        let previous = {
            let mut shared = self.inner.lock();
            shared.close_requested = false;
            let previous = shared.session.take();
            if let Some(session) = previous.as_ref() {
                session.cancel.cancel();
            }
            previous
        };

        if let Some(session) = previous {
            if let Err(e) = session.task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }

        {
            // A session that never reported its close no longer owns the state.
            let mut shared = self.inner.lock();
            if shared.session.is_none()
                && matches!(
                    shared.state,
                    ConnectionState::Connecting
                        | ConnectionState::Connected
                        | ConnectionState::Disconnecting
                )
            {
                shared.state = ConnectionState::Disconnected;
            }
            if shared.close_requested {
                info!("Disconnect requested during reconnect, staying closed");
                return;
            }
        }

        self.connect(None);
    }

    /// Stop the liveness monitor, close the session, and wait for both.
    pub async fn shutdown(&self) {
        info!("Shutting down connection to {}", self.inner.config.url);
        // The monitor goes first so that it cannot open a new session.
        self.inner.monitor.shutdown().await;

        let session = {
            let mut shared = self.inner.lock();
            let session = shared.session.take();
            if let Some(session) = session.as_ref() {
                session.cancel.cancel();
            }
            session
        };

        if let Some(session) = session {
            if let Err(e) = session.task.await {
                warn!("Session task ended abnormally: {}", e);
            }
        }

        self.inner.lock().state = ConnectionState::Disconnected;
        self.park_subscriptions();
    }

    /// Encode and transmit a command on the current session.
    ///
    /// The frame is dropped with a warning unless the connection is
    /// connected.
    pub fn send(&self, command: &Command) {
        let text = match command.to_json() {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode command: {}", e);
                return;
            }
        };

        let shared = self.inner.lock();
        let session = match (shared.state, shared.session.as_ref()) {
            (ConnectionState::Connected, Some(session)) => session,
            (state, _) => {
                warn!("Not connected ({}), dropping frame: {}", state, text);
                return;
            }
        };

        if session.outbound.send(text).is_err() {
            warn!("Session {} already closed, dropping frame", session.generation);
        }
    }

    /// Look up a registered subscription by identifier.
    pub fn find_subscription(&self, identifier: &Identifier) -> Option<Subscription> {
        self.find_core(identifier)
            .map(|core| Subscription::from_core(core, self.downgrade()))
    }

    pub(crate) fn register(&self, core: Arc<SubscriptionCore>) {
        debug!("Registering subscription to {}", core.identifier());
        self.inner.lock().subscriptions.insert(core.id(), core);
    }

    fn find_core(&self, identifier: &Identifier) -> Option<Arc<SubscriptionCore>> {
        self.inner
            .lock()
            .subscriptions
            .values()
            .find(|core| core.identifier() == identifier)
            .cloned()
    }

    /// Subscriptions are snapshotted so that no subscription lock is taken
    /// while the connection lock is held.
    fn snapshot(&self) -> Vec<Arc<SubscriptionCore>> {
        self.inner.lock().subscriptions.values().cloned().collect()
    }

    fn park_subscriptions(&self) {
        for core in self.snapshot() {
            core.park();
        }
    }

    /// Route one inbound text frame.
    pub(crate) fn handle_message(&self, text: &str) {
        let frame = match ServerFrame::from_json(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Dropping malformed frame ({}): {}", e, text);
                return;
            }
        };

        match frame.decode_identifier() {
            Some(Ok(identifier)) => {
                if let Some(core) = self.find_core(&identifier) {
                    core.received(self, &frame);
                    return;
                }
            }
            Some(Err(e)) => warn!("Undecodable identifier in frame: {}", e),
            None => {}
        }

        match frame.frame_type() {
            Some(FrameType::Welcome) => {
                debug!("Welcome received");
                for core in self.snapshot() {
                    if core.state() == SubscriptionState::ConnectionPending {
                        core.create(self);
                    }
                }
            }
            Some(FrameType::Ping) => {
                if self.inner.config.log_ping {
                    debug!("Ping received: {}", text);
                }
                self.inner.monitor.record_heartbeat();
            }
            _ => warn!("Message not supported: {}", text),
        }
    }

    pub(crate) fn handle_open(&self, generation: u64) {
        let mut shared = self.inner.lock();
        if shared.generation == generation {
            shared.state = ConnectionState::Connected;
        }
    }

    pub(crate) fn handle_close(&self, generation: u64, requested: bool) {
        {
            let mut shared = self.inner.lock();
            if shared.generation == generation {
                if requested {
                    info!("Disconnected from {}", self.inner.config.url);
                    shared.state = ConnectionState::Disconnected;
                } else {
                    warn!("Lost connection to {}", self.inner.config.url);
                    shared.state = ConnectionState::UncontrolledDisconnected;
                }
                shared.session = None;
            }
        }
        self.park_subscriptions();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.inner.config.url)
            .field("state", &self.state())
            .finish()
    }
}

impl ConnectionInner {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Monitored for ConnectionInner {
    fn connection_state(&self) -> ConnectionState {
        self.lock().state
    }

    fn reconnect(self: Arc<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move { Connection::from_inner(self).reconnect().await })
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        let shared = self.shared.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = shared.session.take() {
            session.cancel.cancel();
        }
    }
}
