//! HiFi Link - Multiplexed control link for a networked audio appliance.
//!
//! This library talks to the appliance's JSON-RPC-style WebSocket control
//! socket over a single long-lived connection.
//!
//! # Architecture
//!
//! The link follows a single-socket multiplexing model:
//!
//! - **Requests**: Any number of callers may have requests in flight; each
//!   receives exactly the reply carrying its id
//! - **Events**: Server-pushed events become [`Action`]s in a [`StateHub`]
//! - **Reconnection**: Every close schedules a new attempt with exponential
//!   backoff (1s, 2s, then 3s), reset on the next successful open
//!
//! Key design principles:
//!
//! - One event loop task owns the socket, the pending table and the timer
//! - Protocol uses `module.method_name` format (`mixer.set_volume`)
//! - Pending requests are rejected, never silently dropped, when the socket closes
//! - Event-driven architecture (no polling)
//!
//! # Quick Start
//!
//! ```no_run
//! use hifi_link::{Client, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder().host("192.168.1.20").connect()?;
//!     client.wait_connected().await?;
//!
//!     client.set_volume(25).await?;
//!     let state = client.playback_state().await?;
//!     println!("Playback state: {state:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`Client`] facade and [`ClientBuilder`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Request correlation id |
//! | [`protocol`] | Wire message types |
//! | [`store`] | [`Action`]s and the [`StateHub`] |
//! | [`transport`] | Multiplexed connection and transports |

// ============================================================================
// Modules
// ============================================================================

/// Appliance client facade.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
pub mod identifiers;

/// Wire protocol message types.
///
/// Requests, responses, events and typed commands.
pub mod protocol;

/// Client-side state sink.
pub mod store;

/// Transport layer.
///
/// The multiplexed connection, its event loop and the socket abstraction.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder, ClientOptions};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::RequestId;

// Protocol types
pub use protocol::{Call, Command, Event, ParsedEvent, PlaybackState, Response};

// Store types
pub use store::{Action, Dispatch, StateHub, Subscription};

// Transport types
pub use transport::{
    BackoffPolicy, Connection, ConnectionState, Connector, MemoryConnector, Transport, WsConnector,
};
