//! WebSocket protocol message types.
//!
//! This module defines the message format spoken with the appliance's
//! control socket.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Client → Appliance | `{jsonrpc, method, params?, id}` |
//! | `Response` | Appliance → Client | `{id, result}` |
//! | Error reply | Appliance → Client | `{error, id?}` |
//! | `Event` | Appliance → Client | `{event, ...payload}`, no `id` |
//!
//! # Method Naming
//!
//! Methods follow `module.method_name` format:
//!
//! - `playback.play`
//! - `mixer.set_volume`
//! - `tracklist.get_tltracks`
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed command definitions by module |
//! | `event` | Event and parsed event types |
//! | `inbound` | Routing of inbound frames |
//! | `request` | Call, Request and Response types |

// ============================================================================
// Submodules
// ============================================================================

/// Command definitions organized by module.
pub mod command;

/// Event message types.
pub mod event;

/// Inbound message classification.
pub mod inbound;

/// Request and Response message types.
pub mod request;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    BluetoothCommand, Command, ConfigCommand, LocalCommand, MixerCommand, NetworkCommand,
    PlaybackCommand, PlaylistCommand, RadioCommand, SearchCommand, SnapcastCommand,
    SourceCommand, StorageCommand, SystemCommand, TracklistCommand,
};
pub use event::{Event, ParsedEvent, PlaybackState};
pub use inbound::Inbound;
pub use request::{Call, JSONRPC_VERSION, Request, Response};
