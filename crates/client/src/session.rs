// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One transport session.
//!
//! Every `connect()` spawns a session task owning a fresh transport. The task
//! reports open, frames, and close back to the connection, tagged with its
//! generation so that events of a superseded session cannot clobber the state
//! of its successor.

use std::sync::Weak;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionInner};
use crate::transport::Transport;

/// Connection-side handle on a running session.
pub(crate) struct SessionHandle {
    pub(crate) generation: u64,
    pub(crate) outbound: mpsc::UnboundedSender<String>,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<()>,
}

pub(crate) struct SessionParams {
    pub(crate) connection: Weak<ConnectionInner>,
    pub(crate) generation: u64,
    pub(crate) url: String,
    pub(crate) origin: Option<String>,
    pub(crate) transport: Box<dyn Transport>,
    /// Task of the session this one replaces. It is awaited before the new
    /// transport connects so that at most one session is ever open.
    pub(crate) predecessor: Option<JoinHandle<()>>,
}

/// Spawn the session task.
pub(crate) fn spawn(params: SessionParams) -> SessionHandle {
    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let cancel = CancellationToken::new();
    let generation = params.generation;
    let task = tokio::spawn(run(params, outbound_rx, cancel.clone()));
    SessionHandle {
        generation,
        outbound,
        cancel,
        task,
    }
}

async fn run(
    params: SessionParams,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let SessionParams {
        connection,
        generation,
        url,
        origin,
        mut transport,
        predecessor,
    } = params;

    if let Some(previous) = predecessor {
        if let Err(e) = previous.await {
            warn!("Previous session ended abnormally: {}", e);
        }
    }

    let requested = drive(
        &connection,
        generation,
        &url,
        origin.as_deref(),
        transport.as_mut(),
        &mut outbound,
        &cancel,
    )
    .await;
    drop(transport);

    if let Some(inner) = connection.upgrade() {
        Connection::from_inner(inner).handle_close(generation, requested);
    }
}

/// Run the session until it closes. Returns whether the close was requested
/// by the client.
async fn drive(
    connection: &Weak<ConnectionInner>,
    generation: u64,
    url: &str,
    origin: Option<&str>,
    transport: &mut dyn Transport,
    outbound: &mut mpsc::UnboundedReceiver<String>,
    cancel: &CancellationToken,
) -> bool {
    debug!("Connecting to {} (session {})", url, generation);
    tokio::select! {
        _ = cancel.cancelled() => return true,
        result = transport.connect(url, origin) => {
            if let Err(e) = result {
                warn!("Failed to connect to {}: {}", url, e);
                return false;
            }
        }
    }

    info!("Connected to {}", url);
    match connection.upgrade() {
        Some(inner) => Connection::from_inner(inner).handle_open(generation),
        None => return true,
    }

    loop {
        tokio::select! {
            biased;

            // Frames handed over before a close request still go out.
            Some(text) = outbound.recv() => {
                if let Err(e) = transport.send(text).await {
                    warn!("Failed to send frame: {}", e);
                    return false;
                }
            }

            _ = cancel.cancelled() => {
                debug!("Closing session {}", generation);
                if let Err(e) = transport.disconnect().await {
                    debug!("Error closing transport: {}", e);
                }
                return true;
            }

            frame = transport.recv() => match frame {
                Ok(Some(text)) => {
                    let Some(inner) = connection.upgrade() else {
                        return true;
                    };
                    Connection::from_inner(inner).handle_message(&text);
                }
                Ok(None) => {
                    debug!("Server closed session {}", generation);
                    return false;
                }
                Err(e) => {
                    warn!("Session {} failed: {}", generation, e);
                    return false;
                }
            },
        }
    }
}
