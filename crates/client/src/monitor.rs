// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Liveness monitoring.
//!
//! The server sends a `ping` frame every few seconds. A transport can die
//! without ever delivering a close event (half-open TCP, suspended laptop),
//! so a background loop checks the age of the last heartbeat once per tick
//! and forces a reconnect once it goes stale.
//!
//! After triggering a reconnect the tracked heartbeat is reset optimistically,
//! before recovery is confirmed. Staleness is therefore level-triggered: a
//! connection that stays silent is retried once per full threshold window,
//! not on every tick.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cable_core::{ConnectionState, HeartbeatRecord};

/// The side of a connection the monitor needs.
pub trait Monitored: Send + Sync + 'static {
    /// Current lifecycle state.
    fn connection_state(&self) -> ConnectionState;

    /// Tear down the current session and open a new one.
    fn reconnect(self: Arc<Self>) -> BoxFuture<'static, ()>;
}

/// Background loop forcing a reconnect when heartbeats stop arriving.
pub struct LivenessMonitor {
    shared: Arc<MonitorShared>,
    task: Mutex<Option<MonitorTask>>,
}

struct MonitorTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

struct MonitorShared {
    last_heartbeat: Mutex<HeartbeatRecord>,
    stale_threshold: Duration,
    interval: Duration,
    /// Set once a reconnect was triggered, until the connection is seen
    /// connected again.
    recovering: AtomicBool,
    failure_rounds: AtomicU32,
}

impl LivenessMonitor {
    pub fn new(stale_threshold: Duration, interval: Duration) -> Self {
        LivenessMonitor {
            shared: Arc::new(MonitorShared {
                last_heartbeat: Mutex::new(HeartbeatRecord::new()),
                stale_threshold,
                interval,
                recovering: AtomicBool::new(false),
                failure_rounds: AtomicU32::new(0),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the loop against `target`.
    ///
    /// The loop holds only a weak reference: it exits on its own once the
    /// target is dropped.
    pub fn start<C: Monitored>(&self, target: Weak<C>) {
        let mut task = self.lock_task();
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            warn!("Monitor already started");
            return;
        }

        debug!("Starting liveness monitor");
        self.shared.reset();
        self.shared.recovering.store(false, Ordering::Release);
        self.shared.failure_rounds.store(0, Ordering::Release);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(Arc::clone(&self.shared), target, cancel.clone()));
        *task = Some(MonitorTask { cancel, handle });
    }

    /// Signal the loop to stop.
    ///
    /// The loop observes the signal at its next await point; use
    /// [`LivenessMonitor::shutdown`] to wait for it.
    pub fn stop(&self) {
        match self.lock_task().take() {
            Some(task) => {
                debug!("Stopping liveness monitor");
                task.cancel.cancel();
            }
            None => warn!("Monitor not started"),
        }
    }

    /// Stop the loop and wait until it has exited.
    pub async fn shutdown(&self) {
        let task = self.lock_task().take();
        if let Some(task) = task {
            debug!("Shutting down liveness monitor");
            task.cancel.cancel();
            if let Err(e) = task.handle.await {
                warn!("Monitor loop ended abnormally: {}", e);
            }
        }
    }

    /// Stop the loop, wait for it, and start a new one.
    pub async fn restart<C: Monitored>(&self, target: Weak<C>) {
        debug!("Restarting liveness monitor");
        self.shutdown().await;
        self.start(target);
    }

    pub fn is_started(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// Track a fresh heartbeat.
    pub fn record_heartbeat(&self) {
        self.shared.reset();
    }

    /// The heartbeat currently tracked.
    pub fn last_heartbeat(&self) -> HeartbeatRecord {
        self.shared.last()
    }

    /// Consecutive ticks without a live connection since the last
    /// monitor-triggered reconnect.
    pub fn failure_rounds(&self) -> u32 {
        self.shared.failure_rounds.load(Ordering::Acquire)
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<MonitorTask>> {
        self.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for LivenessMonitor {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = task.take() {
            task.cancel.cancel();
        }
    }
}

impl MonitorShared {
    fn last(&self) -> HeartbeatRecord {
        *self.last_heartbeat.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reset(&self) {
        *self.last_heartbeat.lock().unwrap_or_else(PoisonError::into_inner) =
            HeartbeatRecord::new();
    }

    async fn tick<C: Monitored>(&self, connection: Arc<C>) {
        let state = connection.connection_state();
        if state == ConnectionState::Disconnected {
            return;
        }

        if self.recovering.load(Ordering::Acquire) {
            if state == ConnectionState::Connected {
                info!("Connection restored");
                self.reset();
                self.recovering.store(false, Ordering::Release);
                self.failure_rounds.store(0, Ordering::Release);
            } else if state == ConnectionState::Connecting {
                debug!("Waiting for handshake after reconnect");
            } else {
                let rounds = self.failure_rounds.fetch_add(1, Ordering::AcqRel) + 1;
                warn!("Connection dead for {} round(s)", rounds);
            }
        }

        if !self.last().is_healthy_within(self.stale_threshold) {
            warn!("Heartbeat stale (state: {}), reconnecting", state);
            self.recovering.store(true, Ordering::Release);
            connection.reconnect().await;
            self.reset();
        }
    }
}

async fn run<C: Monitored>(shared: Arc<MonitorShared>, target: Weak<C>, cancel: CancellationToken) {
    debug!("Liveness monitor loop started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(shared.interval) => {}
        }

        let Some(connection) = target.upgrade() else {
            debug!("Monitored connection dropped");
            break;
        };

        let tick = AssertUnwindSafe(shared.tick(connection)).catch_unwind();
        tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = tick => {
                if let Err(panic) = outcome {
                    error!(
                        "Liveness monitor iteration failed: {}; restarting loop",
                        panic_message(panic.as_ref())
                    );
                    shared.reset();
                }
            }
        }
    }

    debug!("Liveness monitor loop stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
