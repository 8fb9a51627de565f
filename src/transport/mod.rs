//! WebSocket transport layer.
//!
//! This module handles communication between the local end (Rust) and the
//! appliance's control socket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐                              ┌─────────────────┐
//! │  Client (Rust)  │                              │  Appliance      │
//! │                 │         WebSocket            │                 │
//! │  Connection     │◄────────────────────────────►│  Control        │
//! │  → EventLoop    │      ws://HOST:8080/ws       │  Socket         │
//! │                 │                              │                 │
//! └─────────────────┘                              └─────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Connection::spawn` - Start the event loop, idle
//! 2. `Connection::connect` - Open the socket through a `Connector`
//! 3. `Connection::send` - Send requests, receive responses/events
//! 4. On close - Reject pending requests, reconnect after a backoff delay
//! 5. `Connection::disconnect` - Close and stay idle
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `backoff` | Reconnect delay policy |
//! | `connection` | Multiplexed connection and event loop |
//! | `memory` | In-process transport for tests |
//! | `pending` | Pending-request table and id allocator |
//! | `socket` | Connector/Transport traits and WebSocket implementation |

// ============================================================================
// Submodules
// ============================================================================

/// Reconnect delay policy.
pub mod backoff;

/// Multiplexed connection and event loop.
pub mod connection;

/// In-process transport for tests.
pub mod memory;

/// Pending-request table.
pub mod pending;

/// Transport abstraction and WebSocket implementation.
pub mod socket;

// ============================================================================
// Re-exports
// ============================================================================

pub use backoff::{Backoff, BackoffPolicy, DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP};
pub use connection::{Connection, ConnectionState};
pub use memory::{MemoryConnector, MemoryListener, RemotePeer};
pub use pending::PendingTable;
pub use socket::{Connector, Transport, WsConnector};
