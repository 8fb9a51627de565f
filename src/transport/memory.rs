//! In-memory transport for tests.
//!
//! A [`MemoryConnector`] hands each successful `connect` to the paired
//! [`MemoryListener`] as a [`RemotePeer`], which plays the appliance.
//! Dropping or closing the peer looks like a remote close to the client.
//!
//! # Example
//!
//! ```ignore
//! let (connector, mut listener) = MemoryConnector::new();
//! let client = Client::builder().connector(connector).connect()?;
//!
//! let mut peer = listener.accept().await.expect("connected");
//! let request = peer.recv_json().await.expect("request");
//! peer.send_json(&json!({"id": request["id"], "result": 42}));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use url::Url;

use crate::error::{Error, Result};

use super::{Connector, Transport};

// ============================================================================
// MemoryConnector
// ============================================================================

/// Connector producing in-process channel pairs.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<RemotePeer>,
    refusing: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
}

impl MemoryConnector {
    /// Creates a connector and the listener receiving its peers.
    #[must_use]
    pub fn new() -> (Self, MemoryListener) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        let connector = Self {
            accept_tx,
            refusing: Arc::new(AtomicBool::new(false)),
            attempts: Arc::new(AtomicUsize::new(0)),
        };
        (connector, MemoryListener { accept_rx })
    }

    /// Makes subsequent connect attempts fail (or succeed again).
    pub fn set_refusing(&self, refusing: bool) {
        self.refusing.store(refusing, Ordering::SeqCst);
    }

    /// Number of connect attempts so far, failed ones included.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if self.refusing.load(Ordering::SeqCst) {
            return Err(Error::connection(format!("{url} refused the connection")));
        }

        let (to_peer_tx, to_peer_rx) = mpsc::unbounded_channel();
        let (to_client_tx, to_client_rx) = mpsc::unbounded_channel();

        let peer = RemotePeer {
            incoming: to_peer_rx,
            outgoing: Some(to_client_tx),
        };
        self.accept_tx
            .send(peer)
            .map_err(|_| Error::connection("memory listener dropped"))?;

        Ok(Box::new(MemoryTransport {
            incoming: to_client_rx,
            outgoing: Some(to_peer_tx),
        }))
    }
}

// ============================================================================
// MemoryListener
// ============================================================================

/// Receives the appliance side of every accepted connection.
#[derive(Debug)]
pub struct MemoryListener {
    accept_rx: mpsc::UnboundedReceiver<RemotePeer>,
}

impl MemoryListener {
    /// Waits for the next connection.
    ///
    /// Returns `None` once every connector clone is gone.
    pub async fn accept(&mut self) -> Option<RemotePeer> {
        self.accept_rx.recv().await
    }
}

// ============================================================================
// RemotePeer
// ============================================================================

/// The appliance end of an in-memory connection.
#[derive(Debug)]
pub struct RemotePeer {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

impl RemotePeer {
    /// Sends a raw text frame to the client.
    ///
    /// Returns `false` if the client side is gone or this peer was closed.
    pub fn send_text(&self, text: impl Into<String>) -> bool {
        self.outgoing
            .as_ref()
            .is_some_and(|tx| tx.send(text.into()).is_ok())
    }

    /// Sends a JSON value to the client.
    pub fn send_json(&self, value: &Value) -> bool {
        self.send_text(value.to_string())
    }

    /// Waits for the next frame from the client.
    ///
    /// Returns `None` once the client closed its side.
    pub async fn recv(&mut self) -> Option<String> {
        self.incoming.recv().await
    }

    /// Waits for the next frame and parses it as JSON.
    ///
    /// Frames that are not JSON are skipped.
    pub async fn recv_json(&mut self) -> Option<Value> {
        loop {
            let text = self.recv().await?;
            if let Ok(value) = serde_json::from_str(&text) {
                return Some(value);
            }
        }
    }

    /// Closes the connection from the appliance side.
    pub fn close(&mut self) {
        self.outgoing = None;
    }
}

// ============================================================================
// MemoryTransport
// ============================================================================

/// The client end of an in-memory connection.
struct MemoryTransport {
    incoming: mpsc::UnboundedReceiver<String>,
    outgoing: Option<mpsc::UnboundedSender<String>>,
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        let tx = self.outgoing.as_ref().ok_or(Error::ConnectionClosed)?;
        tx.send(text)
            .map_err(|_| Error::connection("memory peer dropped"))
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        self.incoming.recv().await.map(Ok)
    }

    async fn close(&mut self) -> Result<()> {
        self.outgoing = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
