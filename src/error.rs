//! Error types for hifi-link.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use hifi_link::{Client, Result};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     client.set_volume(42).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::Connection`], [`Error::NotConnected`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Remote`], [`Error::Protocol`], [`Error::Decode`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client options are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Transport could not be opened or failed while writing.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Request attempted while the socket is not open.
    ///
    /// Returned immediately, without touching the network.
    #[error("Socket not connected")]
    NotConnected,

    /// The connection closed while the request was in flight.
    #[error("Socket disconnected")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// The appliance answered a request with an error.
    #[error("Remote error{}: {message}", code_suffix(.code))]
    Remote {
        /// Numeric error code, if the appliance sent one.
        code: Option<i64>,
        /// Human readable message.
        message: String,
        /// The raw `error` value.
        data: Value,
    },

    /// Protocol violation or unexpected message shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// A result could not be decoded into the requested type.
    #[error("Failed to decode result of {method}: {source}")]
    Decode {
        /// Method whose result failed to decode.
        method: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Renders the optional code of a remote error for display.
fn code_suffix(code: &Option<i64>) -> String {
    code.map(|c| format!(" {c}")).unwrap_or_default()
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a decode error for `method`.
    #[inline]
    pub fn decode(method: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            method: method.into(),
            source,
        }
    }

    /// Creates a remote error from the raw `error` value of a response.
    ///
    /// Accepts the usual `{code, message}` object, a bare string, or any
    /// other JSON value (rendered as its JSON text).
    pub fn remote(error: Value) -> Self {
        let code = error.get("code").and_then(Value::as_i64);
        let message = match &error {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
            other => other.to_string(),
        };

        Self::Remote {
            code,
            message,
            data: error,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this error comes from the connection itself.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::NotConnected
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if the appliance rejected the request.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Returns `true` if this error may go away once the link is back up.
    ///
    /// Nothing in this crate retries on its own; callers decide.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::NotConnected | Self::ConnectionClosed
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use std::io::ErrorKind;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NotConnected.to_string(), "Socket not connected");
        assert_eq!(Error::ConnectionClosed.to_string(), "Socket disconnected");
        assert_eq!(
            Error::connection("refused").to_string(),
            "Connection failed: refused"
        );
    }

    #[test]
    fn test_remote_from_object() {
        let err = Error::remote(json!({"code": -32603, "message": "no such track"}));
        assert_eq!(err.to_string(), "Remote error -32603: no such track");

        match err {
            Error::Remote { code, message, .. } => {
                assert_eq!(code, Some(-32603));
                assert_eq!(message, "no such track");
            }
            _ => panic!("expected Remote"),
        }
    }

    #[test]
    fn test_remote_from_other_shapes() {
        let err = Error::remote(json!("boom"));
        assert_eq!(err.to_string(), "Remote error: boom");

        let err = Error::remote(json!({"reason": "x"}));
        assert!(err.to_string().contains("reason"));
        assert!(err.is_remote());
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::NotConnected.is_connection_error());
        assert!(Error::ConnectionClosed.is_connection_error());
        assert!(Error::connection("x").is_connection_error());
        assert!(!Error::config("x").is_connection_error());
        assert!(!Error::remote(json!("x")).is_connection_error());
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::ConnectionClosed.is_recoverable());
        assert!(!Error::protocol("x").is_recoverable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::ConnectionRefused, "refused");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
