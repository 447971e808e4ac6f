// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for the cable socket.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket connections for production
//! - Mock transports for unit testing
//!
//! A transport carries text frames for exactly one session. The connection
//! asks its [`TransportFactory`] for a fresh instance every time it opens a
//! session, so no socket state leaks between sessions.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// The handshake request could not be built (bad URL or origin).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport trait for WebSocket-like communication.
///
/// Implementations perform their own low-level keepalive (WebSocket
/// ping/pong); only text frames are surfaced.
pub trait Transport: Send + Sync {
    /// Open the session, sending `origin` as the `Origin` header if given.
    fn connect(
        &mut self,
        url: &str,
        origin: Option<&str>,
    ) -> BoxFuture<'_, TransportResult<()>>;

    /// Close the session.
    fn disconnect(&mut self) -> BoxFuture<'_, TransportResult<()>>;

    /// Send one text frame.
    fn send(
        &mut self,
        text: String,
    ) -> BoxFuture<'_, TransportResult<()>>;

    /// Receive the next text frame.
    ///
    /// Returns `None` if the connection is closed.
    fn recv(
        &mut self,
    ) -> BoxFuture<'_, TransportResult<Option<String>>>;

    /// Check if connected.
    fn is_connected(&self) -> bool;
}

/// Creates one transport per session.
pub type TransportFactory = Arc<dyn Fn() -> Box<dyn Transport> + Send + Sync>;

/// Factory producing [`WebSocketTransport`]s.
pub fn websocket_factory() -> TransportFactory {
    Arc::new(|| Box::new(WebSocketTransport::new()) as Box<dyn Transport>)
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
pub struct WebSocketTransport {
    /// The WebSocket connection, if connected.
    ws: Option<WebSocketConnection>,
}

/// Internal WebSocket connection wrapper.
struct WebSocketConnection {
    sink: futures_util::stream::SplitSink<WsStream, tokio_tungstenite::tungstenite::Message>,
    stream: futures_util::stream::SplitStream<WsStream>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport.
    pub fn new() -> Self {
        WebSocketTransport { ws: None }
    }
}

impl Default for WebSocketTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for WebSocketTransport {
    fn connect(
        &mut self,
        url: &str,
        origin: Option<&str>,
    ) -> BoxFuture<'_, TransportResult<()>> {
        let url = url.to_string();
        let origin = origin.map(str::to_string);
        Box::pin(async move {
            use futures_util::StreamExt;

            let mut request = url
                .as_str()
                .into_client_request()
                .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

            if let Some(origin) = origin {
                let value = HeaderValue::from_str(&origin)
                    .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
                request.headers_mut().insert(ORIGIN, value);
            }

            let (ws_stream, _) = tokio_tungstenite::connect_async(request)
                .await
                .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

            let (sink, stream) = ws_stream.split();
            self.ws = Some(WebSocketConnection { sink, stream });
            Ok(())
        })
    }

    fn disconnect(&mut self) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            if let Some(mut ws) = self.ws.take() {
                use futures_util::SinkExt;
                ws.sink
                    .close()
                    .await
                    .map_err(|e| TransportError::SendFailed(e.to_string()))?;
            }
            Ok(())
        })
    }

    fn send(
        &mut self,
        text: String,
    ) -> BoxFuture<'_, TransportResult<()>> {
        Box::pin(async move {
            use futures_util::SinkExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            if let Err(e) = ws.sink.send(Message::Text(text.into())).await {
                // Connection is broken, clear it
                self.ws = None;
                return Err(TransportError::SendFailed(e.to_string()));
            }

            Ok(())
        })
    }

    fn recv(
        &mut self,
    ) -> BoxFuture<'_, TransportResult<Option<String>>> {
        Box::pin(async move {
            use futures_util::StreamExt;
            use tokio_tungstenite::tungstenite::Message;

            let ws = self.ws.as_mut().ok_or(TransportError::ConnectionClosed)?;

            loop {
                match ws.stream.next().await {
                    Some(Ok(Message::Text(text))) => {
                        return Ok(Some(text.as_str().to_owned()));
                    }
                    Some(Ok(Message::Close(_))) => {
                        self.ws = None;
                        return Ok(None);
                    }
                    Some(Ok(_)) => {
                        // Ping/pong is answered by tungstenite; binary frames are not part
                        // of the protocol
                        continue;
                    }
                    Some(Err(e)) => {
                        self.ws = None;
                        return Err(TransportError::ReceiveFailed(e.to_string()));
                    }
                    None => {
                        self.ws = None;
                        return Ok(None);
                    }
                }
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.ws.is_some()
    }
}
