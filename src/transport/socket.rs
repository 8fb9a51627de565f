//! Socket abstraction and the WebSocket implementation.
//!
//! The event loop never touches a socket type directly. It asks a
//! [`Connector`] for a fresh [`Transport`] on every (re)connect, which keeps
//! the loop testable against an in-memory peer.
//!
//! # Connection Flow
//!
//! 1. The loop calls [`Connector::connect`] with the appliance URL
//! 2. [`WsConnector`] performs the WebSocket handshake
//! 3. The loop reads text frames via [`Transport::recv`] until it yields `None`
//! 4. A fresh transport is requested after the backoff delay

// ============================================================================
// Imports
// ============================================================================

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Traits
// ============================================================================

/// Opens transports to the appliance.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Opens a new transport to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the peer cannot be reached.
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>>;
}

/// One open, bidirectional text channel.
#[async_trait]
pub trait Transport: Send {
    /// Sends one text frame.
    async fn send(&mut self, text: String) -> Result<()>;

    /// Receives the next text frame.
    ///
    /// Returns `None` once the peer closed the channel. Must be cancel-safe:
    /// dropping the future before completion loses no frame.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Closes the channel.
    async fn close(&mut self) -> Result<()>;
}

// ============================================================================
// WsConnector
// ============================================================================

/// Connector speaking WebSocket through `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>> {
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::connection(format!("WebSocket handshake with {url} failed: {e}")))?;

        debug!(%url, status = %response.status(), "WebSocket handshake complete");

        Ok(Box::new(WsTransport { stream }))
    }
}

// ============================================================================
// WsTransport
// ============================================================================

/// An open WebSocket.
struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),

                Ok(Message::Close(frame)) => {
                    debug!(?frame, "WebSocket closed by remote");
                    return None;
                }

                // Ignore Binary, Ping, Pong
                Ok(other) => trace!(len = other.len(), "Skipping non-text frame"),

                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    async fn local_server() -> (TcpListener, Url) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let url = Url::parse(&format!("ws://127.0.0.1:{port}/ws")).expect("url");
        (listener, url)
    }

    #[tokio::test]
    async fn test_text_frames_both_ways() {
        let (listener, url) = local_server().await;

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.expect("accept");
            let mut ws = accept_async(tcp).await.expect("upgrade");

            ws.send(Message::Ping(vec![1, 2].into())).await.expect("ping");
            ws.send(Message::Binary(vec![0xff].into())).await.expect("binary");
            ws.send(Message::Text("hello".into())).await.expect("text");

            let echoed = ws.next().await.expect("frame").expect("ok");
            ws.close(None).await.expect("close");
            echoed
        });

        let mut transport = WsConnector.connect(&url).await.expect("connect");
        let text = transport.recv().await.expect("frame").expect("ok");
        assert_eq!(text, "hello");

        transport.send("world".to_string()).await.expect("send");
        assert!(transport.recv().await.is_none(), "close frame ends the stream");

        let echoed = server.await.expect("server task");
        assert_eq!(echoed, Message::Text("world".into()));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let (listener, url) = local_server().await;
        drop(listener);

        let err = WsConnector.connect(&url).await.err().expect("refused");
        assert!(err.is_connection_error());
    }
}
