//! Client connection options.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use hifi_link::client::ClientOptions;
//!
//! # fn example() -> hifi_link::Result<()> {
//! let options = ClientOptions::for_host("192.168.1.20")?
//!     .with_backoff_base(Duration::from_millis(500))
//!     .with_event_capacity(64);
//!
//! assert_eq!(options.url.as_str(), "ws://192.168.1.20:8080/ws");
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::store::DEFAULT_EVENT_CAPACITY;
use crate::transport::BackoffPolicy;

// ============================================================================
// Constants
// ============================================================================

/// Port of the appliance's control socket.
pub const DEFAULT_PORT: u16 = 8080;

/// Path of the appliance's control socket.
pub const DEFAULT_PATH: &str = "/ws";

// ============================================================================
// ClientOptions
// ============================================================================

/// Options for a [`Client`](super::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Control socket URL.
    pub url: Url,
    /// Reconnect backoff.
    pub backoff: BackoffPolicy,
    /// Actions buffered per store subscriber.
    pub event_capacity: usize,
}

impl ClientOptions {
    /// Creates options for `url` with default backoff and buffering.
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            backoff: BackoffPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Creates options for the appliance at `host`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if `host` does not form a valid URL.
    pub fn for_host(host: &str) -> Result<Self> {
        Ok(Self::new(appliance_url(host)?))
    }

    /// Sets the reconnect backoff.
    #[inline]
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Sets the delay before the first reconnect attempt.
    #[inline]
    #[must_use]
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff.base = base;
        self
    }

    /// Sets the maximum reconnect delay.
    #[inline]
    #[must_use]
    pub fn with_backoff_cap(mut self, cap: Duration) -> Self {
        self.backoff.cap = cap;
        self
    }

    /// Sets how many actions each store subscriber may buffer.
    #[inline]
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Checks the options for consistency.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if:
    /// - the URL scheme is not `ws` or `wss`
    /// - the backoff base is zero or above the cap
    /// - the event capacity is zero
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.url.scheme(), "ws" | "wss") {
            return Err(Error::config(format!(
                "Unsupported URL scheme '{}'. Use ws:// or wss://.\n\
                 Example: ws://192.168.1.20:8080/ws",
                self.url.scheme()
            )));
        }

        if self.backoff.base.is_zero() {
            return Err(Error::config("Backoff base delay must be greater than zero"));
        }

        if self.backoff.base > self.backoff.cap {
            return Err(Error::config(format!(
                "Backoff base ({}ms) exceeds cap ({}ms)",
                self.backoff.base.as_millis(),
                self.backoff.cap.as_millis()
            )));
        }

        if self.event_capacity == 0 {
            return Err(Error::config("Event capacity must be at least 1"));
        }

        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Builds the control socket URL for `host`: `ws://{host}:8080/ws`.
///
/// # Errors
///
/// Returns [`Error::Url`] if `host` is not a valid host name.
pub fn appliance_url(host: &str) -> Result<Url> {
    let url = Url::parse(&format!("ws://{host}:{DEFAULT_PORT}{DEFAULT_PATH}"))?;
    Ok(url)
}

// ============================================================================
// Tests
// ============================================================================
