//! Playback control methods.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, PlaybackCommand, PlaybackState};

use super::Client;

// ============================================================================
// Client - Playback
// ============================================================================

impl Client {
    /// Starts or resumes playback of the current track.
    pub async fn play(&self) -> Result<()> {
        debug!("Play");
        self.send_command(play(None, None)).await
    }

    /// Plays a track by URI.
    ///
    /// # Arguments
    ///
    /// * `uri` - Track URI, e.g. "local:track:album/01.flac"
    pub async fn play_uri(&self, uri: &str) -> Result<()> {
        debug!(uri, "Play URI");
        self.send_command(play(Some(uri.to_string()), None)).await
    }

    /// Plays a tracklist entry.
    pub async fn play_tlid(&self, tlid: u64) -> Result<()> {
        debug!(tlid, "Play tracklist entry");
        self.send_command(play(None, Some(tlid))).await
    }

    /// Pauses playback.
    pub async fn pause(&self) -> Result<()> {
        self.send_command(Command::Playback(PlaybackCommand::Pause))
            .await
    }

    /// Resumes paused playback.
    pub async fn resume(&self) -> Result<()> {
        self.send_command(Command::Playback(PlaybackCommand::Resume))
            .await
    }

    /// Stops playback.
    pub async fn stop(&self) -> Result<()> {
        self.send_command(Command::Playback(PlaybackCommand::Stop))
            .await
    }

    /// Skips to the next track.
    pub async fn next_track(&self) -> Result<()> {
        self.send_command(Command::Playback(PlaybackCommand::Next))
            .await
    }

    /// Goes back to the previous track.
    pub async fn previous_track(&self) -> Result<()> {
        self.send_command(Command::Playback(PlaybackCommand::Previous))
            .await
    }

    /// Seeks to `time_position` milliseconds into the current track.
    pub async fn seek(&self, time_position: u64) -> Result<()> {
        debug!(time_position, "Seek");
        self.send_command(Command::Playback(PlaybackCommand::Seek { time_position }))
            .await
    }

    /// Gets the playback state.
    ///
    /// Returns `None` while disconnected.
    pub async fn playback_state(&self) -> Result<Option<PlaybackState>> {
        self.execute_as(Command::Playback(PlaybackCommand::GetState))
            .await
    }

    /// Gets the position in the current track, in milliseconds.
    pub async fn time_position(&self) -> Result<Option<u64>> {
        self.execute_as(Command::Playback(PlaybackCommand::GetTimePosition))
            .await
    }

    /// Gets the current tracklist entry, if anything is loaded.
    pub async fn current_tl_track(&self) -> Result<Option<Value>> {
        let track: Option<Option<Value>> = self
            .execute_as(Command::Playback(PlaybackCommand::GetCurrentTlTrack))
            .await?;
        Ok(track.flatten())
    }
}

fn play(uri: Option<String>, tlid: Option<u64>) -> Command {
    Command::Playback(PlaybackCommand::Play { uri, tlid })
}
