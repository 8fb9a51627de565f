//! Core Client struct and request facade.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::protocol::{Call, Command};
use crate::store::{Dispatch, StateHub};
use crate::transport::{Connection, ConnectionState, Connector};

use super::builder::ClientBuilder;
use super::options::ClientOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a client.
pub(crate) struct ClientInner {
    /// Options the client was built with.
    pub options: ClientOptions,
    /// Multiplexed connection.
    pub connection: Connection,
    /// Store receiving connectivity changes and events.
    pub store: Arc<StateHub>,
}

// ============================================================================
// Client
// ============================================================================

/// A handle to one appliance.
///
/// Wraps a [`Connection`] and a [`StateHub`]. Requests made while the store
/// reports the socket closed are skipped and resolve to `Ok(None)` instead
/// of failing.
///
/// Cheap to clone; all clones share the same connection and store.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.options.url.as_str())
            .field("state", &self.inner.connection.state())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Spawns the connection for an already validated configuration.
    pub(crate) fn new(
        options: ClientOptions,
        connector: Arc<dyn Connector>,
        store: Arc<StateHub>,
    ) -> Self {
        let connection = Connection::spawn(
            options.url.clone(),
            connector,
            Arc::clone(&store) as Arc<dyn Dispatch>,
            options.backoff,
        );

        Self {
            inner: Arc::new(ClientInner {
                options,
                connection,
                store,
            }),
        }
    }
}

// ============================================================================
// Client - Accessors
// ============================================================================

impl Client {
    /// Returns the options the client was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.inner.options
    }

    /// Returns the store.
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<StateHub> {
        &self.inner.store
    }

    /// Returns the underlying connection.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.inner.connection
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.connection.state()
    }

    /// Returns `true` when the store reports the socket open.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.store.connected()
    }
}

// ============================================================================
// Client - Lifecycle
// ============================================================================

impl Client {
    /// Starts connecting. See [`Connection::connect`].
    pub fn connect(&self) {
        debug!(url = %self.inner.options.url, "Connect requested");
        self.inner.connection.connect();
    }

    /// Closes the socket and stops reconnecting.
    pub fn disconnect(&self) {
        debug!(url = %self.inner.options.url, "Disconnect requested");
        self.inner.connection.disconnect();
    }

    /// Waits until the socket is open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the connection task is gone.
    pub async fn wait_connected(&self) -> Result<()> {
        self.inner.connection.wait_connected().await
    }

    /// Returns a receiver observing connection state changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection.subscribe_state()
    }
}

// ============================================================================
// Client - Requests
// ============================================================================

impl Client {
    /// Sends `method` with optional `params` and returns the `result` value.
    ///
    /// Returns `Ok(None)` without touching the socket while disconnected.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionClosed`] if the socket closes before the reply
    /// - [`Error::Remote`] if the appliance answered with an error
    pub async fn request(&self, method: &str, params: Option<Value>) -> Result<Option<Value>> {
        self.call(Call::new(method, params)).await
    }

    /// Like [`request`](Self::request), decoding the result into `T`.
    ///
    /// # Errors
    ///
    /// Additionally returns [`Error::Decode`] if the result does not fit `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Option<T>> {
        let result = self.request(method, params).await?;
        decode(method, result)
    }

    /// Sends a typed command and returns the `result` value.
    ///
    /// # Errors
    ///
    /// Same as [`request`](Self::request).
    pub async fn execute(&self, command: Command) -> Result<Option<Value>> {
        self.call(command.into_call()?).await
    }

    /// Like [`execute`](Self::execute), decoding the result into `T`.
    ///
    /// # Errors
    ///
    /// Additionally returns [`Error::Decode`] if the result does not fit `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self, command: Command) -> Result<Option<T>> {
        let call = command.into_call()?;
        let method = call.method.clone();
        let result = self.call(call).await?;
        decode(&method, result)
    }
}

// ============================================================================
// Client - Internal
// ============================================================================

impl Client {
    /// Sends a call unless the store reports the socket closed.
    async fn call(&self, call: Call) -> Result<Option<Value>> {
        if !self.inner.store.connected() {
            debug!(method = %call.method, "Not connected, request skipped");
            return Ok(None);
        }

        let method = call.method.clone();
        match self.inner.connection.send(call).await {
            Ok(response) => Ok(Some(response.into_result())),
            Err(e) => {
                warn!(%method, error = %e, "Request failed");
                Err(e)
            }
        }
    }

    /// Sends a command whose result carries no information.
    pub(crate) async fn send_command(&self, command: Command) -> Result<()> {
        self.execute(command).await?;
        Ok(())
    }
}

/// Decodes an optional result into `T`.
fn decode<T: DeserializeOwned>(method: &str, result: Option<Value>) -> Result<Option<T>> {
    result
        .map(|value| serde_json::from_value(value).map_err(|e| Error::decode(method, e)))
        .transpose()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::protocol::MixerCommand;
    use crate::store::{Action, SOCKET_CONNECTED};
    use crate::transport::MemoryConnector;

    fn client() -> (Client, crate::transport::MemoryListener) {
        let (connector, listener) = MemoryConnector::new();
        let client = Client::builder()
            .host("hifi.local")
            .connector(connector)
            .build()
            .expect("build");
        (client, listener)
    }

    #[test]
    fn test_decode() {
        let volume: Option<u8> = decode("mixer.get_volume", Some(json!(42))).expect("decode");
        assert_eq!(volume, Some(42));

        let skipped: Option<u8> = decode("mixer.get_volume", None).expect("decode");
        assert_eq!(skipped, None);

        let err = decode::<u8>("mixer.get_volume", Some(json!("loud"))).expect_err("mismatch");
        assert!(matches!(err, Error::Decode { ref method, .. } if method == "mixer.get_volume"));
    }

    #[tokio::test]
    async fn test_request_skipped_while_disconnected() {
        let (client, _listener) = client();

        let result = client.request("core.get_version", None).await.expect("skipped");
        assert_eq!(result, None);

        let result = client
            .execute(Command::Mixer(MixerCommand::GetVolume))
            .await
            .expect("skipped");
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_store_flag_without_socket_surfaces_not_connected() {
        let (client, _listener) = client();

        // Store says open, socket does not: the connection's own check wins.
        client.store().dispatch(Action::bare(SOCKET_CONNECTED));
        let err = client.request("core.get_version", None).await.expect_err("no socket");
        assert!(matches!(err, Error::NotConnected));
    }

    #[tokio::test]
    async fn test_request_roundtrip() {
        let (client, mut listener) = client();
        client.connect();
        let mut peer = listener.accept().await.expect("peer");
        client.wait_connected().await.expect("connected");

        let task = tokio::spawn({
            let client = client.clone();
            async move { client.request_as::<u8>("mixer.get_volume", None).await }
        });

        let request = peer.recv_json().await.expect("request");
        assert_eq!(request["method"], "mixer.get_volume");
        assert!(request.get("params").is_none());

        peer.send_json(&json!({"id": request["id"], "result": 55}));
        assert_eq!(task.await.expect("task").expect("reply"), Some(55));
    }
}
