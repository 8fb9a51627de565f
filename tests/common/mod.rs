//! Shared utilities for integration tests.
//!
//! Provides common functionality used across all test binaries:
//! - Logging initialization
//! - Connection and client setup over the in-memory transport
//! - Scripted appliance replies

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use hifi_link::transport::{MemoryConnector, MemoryListener, RemotePeer};
use hifi_link::{BackoffPolicy, Client, Connection, Dispatch, StateHub};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use url::Url;

// ============================================================================
// Logging
// ============================================================================

/// Initialize tracing for tests. Honors `RUST_LOG`, defaults to debug.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hifi_link=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

// ============================================================================
// Setup
// ============================================================================

/// A raw connection wired to a fresh hub over the in-memory transport.
pub struct Harness {
    pub connection: Connection,
    pub hub: Arc<StateHub>,
    pub connector: MemoryConnector,
    pub listener: MemoryListener,
}

impl Harness {
    /// Spawns an idle connection with the default backoff.
    pub fn new() -> Self {
        init_tracing();

        let (connector, listener) = MemoryConnector::new();
        let hub = Arc::new(StateHub::new());
        let connection = Connection::spawn(
            Url::parse("ws://appliance.test:8080/ws").expect("url"),
            Arc::new(connector.clone()),
            Arc::clone(&hub) as Arc<dyn Dispatch>,
            BackoffPolicy::default(),
        );

        Self {
            connection,
            hub,
            connector,
            listener,
        }
    }

    /// Connects and returns the appliance side once open.
    pub async fn open(&mut self) -> RemotePeer {
        self.connection.connect();
        self.accept().await
    }

    /// Waits for the next (re)connect and returns the appliance side.
    pub async fn accept(&mut self) -> RemotePeer {
        let peer = self.listener.accept().await.expect("connector alive");
        self.connection.wait_connected().await.expect("event loop alive");
        peer
    }
}

/// Builds a client over the in-memory transport. Not yet connected.
pub fn memory_client() -> (Client, MemoryListener) {
    init_tracing();

    let (connector, listener) = MemoryConnector::new();
    let client = Client::builder()
        .host("appliance.test")
        .connector(connector)
        .build()
        .expect("valid configuration");

    (client, listener)
}

// ============================================================================
// Appliance Helpers
// ============================================================================

/// Reads the next request, returning its id and the full envelope.
pub async fn next_request(peer: &mut RemotePeer) -> (u64, Value) {
    let request = peer.recv_json().await.expect("client sent a request");
    let id = request["id"].as_u64().expect("request carries an integer id");
    (id, request)
}

/// Replies to request `id` with `result`.
pub fn reply(peer: &RemotePeer, id: u64, result: Value) {
    assert!(
        peer.send_json(&json!({"jsonrpc": "2.0", "id": id, "result": result})),
        "client side gone"
    );
}
