// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for client tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use cable_core::{ConnectionState, ServerFrame};

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::transport_tests::MockServer;

pub const TEST_URL: &str = "ws://localhost:28080/cable";

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

/// Create a disconnected connection backed by a mock server.
pub fn mock_connection() -> (Connection, MockServer) {
    mock_connection_with(ClientConfig::new(TEST_URL))
}

pub fn mock_connection_with(config: ClientConfig) -> (Connection, MockServer) {
    let server = MockServer::new();
    let connection = Connection::with_transport(config, server.factory()).unwrap();
    (connection, server)
}

/// Connect and wait for the handshake, without sending `welcome`.
pub async fn open(connection: &Connection) {
    connection.connect(None);
    wait_until("connected", || connection.state() == ConnectionState::Connected).await;
}

/// Connect, wait for the handshake, and greet the client.
pub async fn open_with_welcome(connection: &Connection, server: &MockServer) {
    open(connection).await;
    server.push(&ServerFrame::welcome());
}

/// Wait until the server has received `count` frames.
pub async fn wait_for_sent(server: &MockServer, count: usize) {
    wait_until(&format!("{} sent frame(s)", count), || server.sent().len() >= count).await;
}
