//! Mixer methods.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, MixerCommand};

use super::Client;

// ============================================================================
// Constants
// ============================================================================

/// Highest volume the mixer accepts.
pub const MAX_VOLUME: u8 = 100;

// ============================================================================
// Client - Mixer
// ============================================================================

impl Client {
    /// Gets the output volume, 0-100.
    pub async fn volume(&self) -> Result<Option<u8>> {
        self.execute_as(Command::Mixer(MixerCommand::GetVolume))
            .await
    }

    /// Sets the output volume. Values above 100 are clamped.
    pub async fn set_volume(&self, volume: u8) -> Result<()> {
        let volume = volume.min(MAX_VOLUME);
        debug!(volume, "Setting volume");
        self.send_command(Command::Mixer(MixerCommand::SetVolume { volume }))
            .await
    }

    /// Gets the mute state.
    pub async fn is_muted(&self) -> Result<Option<bool>> {
        self.execute_as(Command::Mixer(MixerCommand::GetMute)).await
    }

    /// Mutes or unmutes the output.
    pub async fn set_mute(&self, mute: bool) -> Result<()> {
        debug!(mute, "Setting mute");
        self.send_command(Command::Mixer(MixerCommand::SetMute { mute }))
            .await
    }

    /// Lists the playback mixers (output devices).
    pub async fn playback_mixers(&self) -> Result<Option<Value>> {
        self.execute(Command::Mixer(MixerCommand::GetPlaybackMixers))
            .await
    }
}
