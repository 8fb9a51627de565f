//! Appliance client.
//!
//! Each [`Client`] owns one multiplexed connection and one state store.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Fluent configuration builder |
//! | `core` | Client struct, lifecycle and generic requests |
//! | `options` | Connection options and URL helpers |
//! | `playback` | Play, pause, seek |
//! | `mixer` | Volume and mute |
//! | `tracklist` | Play queue |
//! | `system` | Source selection, standby, reboot |
//!
//! # Example
//!
//! ```no_run
//! use hifi_link::Client;
//!
//! # async fn example() -> hifi_link::Result<()> {
//! let client = Client::builder().host("192.168.1.20").connect()?;
//! client.wait_connected().await?;
//!
//! client.set_volume(30).await?;
//! client.play().await?;
//!
//! let mut volume = client.store().subscribe_to("volume_changed");
//! while let Some(action) = volume.recv().await {
//!     println!("volume: {}", action.payload["volume"]);
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Core client implementation.
pub mod core;

/// Connection options.
pub mod options;

mod mixer;
mod playback;
mod system;
mod tracklist;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use core::Client;
pub use mixer::MAX_VOLUME;
pub use options::{ClientOptions, DEFAULT_PATH, DEFAULT_PORT, appliance_url};
