// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests against a real WebSocket server.
//!
//! The stub server speaks just enough of the cable protocol: it greets every
//! session, confirms subscriptions (rejecting `RejectChannel`), echoes each
//! performed action back as a broadcast, and closes the socket when asked to
//! via the `hangup` action.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cable::{
    Connection, ConnectionState, Identifier, OutboundFrame, Subscription, SubscriptionState,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::Message;

struct StubServer {
    addr: SocketAddr,
    origins: Arc<Mutex<Vec<Option<String>>>>,
}

impl StubServer {
    async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().unwrap();
        let origins = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&origins);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&seen)));
            }
        });

        StubServer { addr, origins }
    }

    fn url(&self) -> String {
        format!("ws://{}/cable", self.addr)
    }

    fn origins(&self) -> Vec<Option<String>> {
        self.origins.lock().unwrap().clone()
    }
}

async fn serve(stream: TcpStream, origins: Arc<Mutex<Vec<Option<String>>>>) {
    let record = |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let origin = request
            .headers()
            .get(ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        origins.lock().unwrap().push(origin);
        Ok(response)
    };
    let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, record).await else {
        return;
    };
    let (mut sink, mut stream) = ws.split();

    let welcome = json!({"type": "welcome"}).to_string();
    if sink.send(Message::Text(welcome.into())).await.is_err() {
        return;
    }

    while let Some(Ok(message)) = stream.next().await {
        let Message::Text(text) = message else {
            continue;
        };
        let command: Value = serde_json::from_str(text.as_str()).unwrap();
        let identifier = command["identifier"].as_str().unwrap_or_default().to_string();

        let reply = match command["command"].as_str() {
            Some("subscribe") if identifier.contains("RejectChannel") => {
                json!({"type": "reject_subscription", "identifier": identifier})
            }
            Some("subscribe") => json!({"type": "confirm_subscription", "identifier": identifier}),
            Some("message") => {
                let data: Value =
                    serde_json::from_str(command["data"].as_str().unwrap_or("{}")).unwrap();
                if data["action"] == "hangup" {
                    let _ = sink.send(Message::Close(None)).await;
                    return;
                }
                json!({"identifier": identifier, "message": data})
            }
            _ => continue,
        };

        if sink.send(Message::Text(reply.to_string().into())).await.is_err() {
            return;
        }
    }
}

async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}

#[tokio::test]
async fn test_subscribe_perform_and_receive() {
    let server = StubServer::spawn().await;
    let connection = Connection::new(server.url()).unwrap();

    let chat = Subscription::new(&connection, Identifier::new("ChatChannel").with("room", "lobby"));
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    chat.on_receive(move |message| sink.lock().unwrap().push(message));

    chat.create();
    chat.send(OutboundFrame::new("speak").with("body", "queued"));

    connection.connect(Some("http://localhost:3000"));
    wait_until("subscribed", || chat.state() == SubscriptionState::Subscribed).await;
    chat.send(OutboundFrame::new("speak").with("body", "live"));

    wait_until("echoes", || received.lock().unwrap().len() == 2).await;
    assert_eq!(
        *received.lock().unwrap(),
        vec![
            json!({"action": "speak", "body": "queued"}),
            json!({"action": "speak", "body": "live"}),
        ]
    );
    assert_eq!(server.origins(), vec![Some("http://localhost:3000".to_string())]);

    connection.shutdown().await;
    assert_eq!(connection.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_rejected_subscription() {
    let server = StubServer::spawn().await;
    let connection = Connection::new(server.url()).unwrap();

    let rejected = Subscription::for_channel(&connection, "RejectChannel");
    rejected.create();
    rejected.send(OutboundFrame::new("speak"));

    connection.connect(None);
    wait_until("rejected", || rejected.state() == SubscriptionState::Rejected).await;
    assert_eq!(rejected.queued(), 0);
    assert_eq!(server.origins(), vec![None]);

    connection.shutdown().await;
}

#[tokio::test]
async fn test_server_close_is_uncontrolled() {
    let server = StubServer::spawn().await;
    let connection = Connection::new(server.url()).unwrap();

    let chat = Subscription::for_channel(&connection, "ChatChannel");
    chat.create();
    connection.connect(None);
    wait_until("subscribed", || chat.state() == SubscriptionState::Subscribed).await;

    chat.send(OutboundFrame::new("hangup"));
    wait_until("server close", || {
        connection.state() == ConnectionState::UncontrolledDisconnected
    })
    .await;
    assert_eq!(chat.state(), SubscriptionState::ConnectionPending);

    connection.reconnect().await;
    wait_until("resubscribed", || chat.state() == SubscriptionState::Subscribed).await;
    assert_eq!(server.origins().len(), 2);

    connection.shutdown().await;
}

#[tokio::test]
async fn test_requested_disconnect() {
    let server = StubServer::spawn().await;
    let connection = Connection::new(server.url()).unwrap();

    connection.connect(None);
    wait_until("connected", || connection.is_connected()).await;

    connection.disconnect();
    wait_until("disconnected", || connection.state() == ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let connection = Connection::new(format!("ws://{}/cable", addr)).unwrap();
    connection.connect(None);
    wait_until("failed", || {
        connection.state() == ConnectionState::UncontrolledDisconnected
    })
    .await;
}
