//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`] instances.
//!
//! # Example
//!
//! ```no_run
//! use hifi_link::Client;
//!
//! # async fn example() -> hifi_link::Result<()> {
//! let client = Client::builder()
//!     .host("192.168.1.20")
//!     .connect()?;
//!
//! client.wait_connected().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::store::{DEFAULT_EVENT_CAPACITY, StateHub};
use crate::transport::{BackoffPolicy, Connector, WsConnector};

use super::core::Client;
use super::options::{ClientOptions, DEFAULT_PATH, DEFAULT_PORT};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Clone)]
pub struct ClientBuilder {
    /// Control socket URL, unparsed.
    url: Option<String>,
    /// Reconnect backoff.
    backoff: BackoffPolicy,
    /// Actions buffered per store subscriber.
    event_capacity: usize,
    /// Transport factory. WebSocket when unset.
    connector: Option<Arc<dyn Connector>>,
    /// Pre-existing store to publish into.
    store: Option<Arc<StateHub>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            url: None,
            backoff: BackoffPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            connector: None,
            store: None,
        }
    }
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("url", &self.url)
            .field("backoff", &self.backoff)
            .field("event_capacity", &self.event_capacity)
            .field("custom_connector", &self.connector.is_some())
            .field("custom_store", &self.store.is_some())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new client builder with no URL.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the control socket URL.
    ///
    /// # Arguments
    ///
    /// * `url` - Full URL, e.g. "ws://192.168.1.20:8080/ws"
    #[inline]
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the appliance host; the URL becomes `ws://{host}:8080/ws`.
    ///
    /// # Arguments
    ///
    /// * `host` - Host name or IP address
    #[inline]
    #[must_use]
    pub fn host(mut self, host: impl AsRef<str>) -> Self {
        self.url = Some(format!(
            "ws://{}:{DEFAULT_PORT}{DEFAULT_PATH}",
            host.as_ref()
        ));
        self
    }

    /// Sets the reconnect backoff.
    #[inline]
    #[must_use]
    pub fn backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.backoff = BackoffPolicy::new(base, cap);
        self
    }

    /// Sets how many actions each store subscriber may buffer.
    #[inline]
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Replaces the WebSocket connector, e.g. with an in-memory one.
    #[inline]
    #[must_use]
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Publishes into an existing store instead of a fresh one.
    #[inline]
    #[must_use]
    pub fn store(mut self, store: Arc<StateHub>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the client with validation. The client starts disconnected.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if no URL was set or the options are inconsistent
    /// - [`Error::Url`] if the URL does not parse
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn build(self) -> Result<Client> {
        let options = self.validate()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(StateHub::with_capacity(options.event_capacity)));
        let connector = self.connector.unwrap_or_else(|| Arc::new(WsConnector));

        Ok(Client::new(options, connector, store))
    }

    /// Builds the client and starts connecting.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn connect(self) -> Result<Client> {
        let client = self.build()?;
        client.connect();
        Ok(client)
    }
}

// ============================================================================
// Validation
// ============================================================================

impl ClientBuilder {
    /// Validates the configuration into options.
    fn validate(&self) -> Result<ClientOptions> {
        let url = self.url.as_deref().ok_or_else(|| {
            Error::config(
                "Appliance URL is required. Use .url() or .host() to set it.\n\
                 Example: Client::builder().host(\"192.168.1.20\")",
            )
        })?;

        let options = ClientOptions::new(Url::parse(url)?)
            .with_backoff(self.backoff)
            .with_event_capacity(self.event_capacity);
        options.validate()?;

        Ok(options)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transport::MemoryConnector;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ClientBuilder::new();
        assert!(builder.url.is_none());
        assert!(builder.connector.is_none());
        assert_eq!(builder.backoff, BackoffPolicy::default());
    }

    #[test]
    fn test_host_sets_default_url() {
        let builder = ClientBuilder::new().host("hifi.local");
        assert_eq!(builder.url.as_deref(), Some("ws://hifi.local:8080/ws"));
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = ClientBuilder::new().validate().expect_err("no url");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_bad_url_is_url_error() {
        let err = ClientBuilder::new().url("not a url").validate().expect_err("bad url");
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_bad_host_fails_validation() {
        assert!(ClientBuilder::new().host("bad host").validate().is_err());
    }

    #[test]
    fn test_validation_carries_settings() {
        let options = ClientBuilder::new()
            .url("wss://hifi.local/ws")
            .backoff(Duration::from_millis(200), Duration::from_millis(800))
            .event_capacity(8)
            .validate()
            .expect("valid");

        assert_eq!(options.url.as_str(), "wss://hifi.local/ws");
        assert_eq!(options.backoff.cap, Duration::from_millis(800));
        assert_eq!(options.event_capacity, 8);
    }

    #[tokio::test]
    async fn test_build_uses_given_store() {
        let (connector, _listener) = MemoryConnector::new();
        let store = Arc::new(StateHub::new());

        let client = ClientBuilder::new()
            .host("hifi.local")
            .connector(connector)
            .store(Arc::clone(&store))
            .build()
            .expect("build");

        assert!(Arc::ptr_eq(client.store(), &store));
        assert!(!client.is_connected());
    }
}
