//! Tracklist (play queue) methods.

use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::protocol::{Command, TracklistCommand};

use super::Client;

// ============================================================================
// Client - Tracklist
// ============================================================================

impl Client {
    /// Gets the queue as a list of tracklist entries.
    pub async fn tracklist(&self) -> Result<Option<Vec<Value>>> {
        self.execute_as(Command::Tracklist(TracklistCommand::GetTlTracks))
            .await
    }

    /// Appends tracks to the queue.
    ///
    /// # Arguments
    ///
    /// * `uris` - Track URIs to append, in order
    pub async fn add_tracks<I, S>(&self, uris: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let uris: Vec<String> = uris.into_iter().map(Into::into).collect();
        debug!(count = uris.len(), "Adding tracks");
        self.send_command(Command::Tracklist(TracklistCommand::Add { uris }))
            .await
    }

    /// Removes a queue entry.
    pub async fn remove_track(&self, tlid: u64) -> Result<()> {
        self.send_command(Command::Tracklist(TracklistCommand::Remove { tlid }))
            .await
    }

    /// Empties the queue.
    pub async fn clear_tracklist(&self) -> Result<()> {
        debug!("Clearing tracklist");
        self.send_command(Command::Tracklist(TracklistCommand::Clear))
            .await
    }

    /// Moves the entries `start..end` to `to_position`.
    pub async fn move_tracks(&self, start: u32, end: u32, to_position: u32) -> Result<()> {
        self.send_command(Command::Tracklist(TracklistCommand::Move {
            start,
            end,
            to_position,
        }))
        .await
    }

    /// Gets repeat mode.
    pub async fn repeat(&self) -> Result<Option<bool>> {
        self.execute_as(Command::Tracklist(TracklistCommand::GetRepeat))
            .await
    }

    /// Sets repeat mode.
    pub async fn set_repeat(&self, value: bool) -> Result<()> {
        self.send_command(Command::Tracklist(TracklistCommand::SetRepeat { value }))
            .await
    }

    /// Gets single mode.
    pub async fn single(&self) -> Result<Option<bool>> {
        self.execute_as(Command::Tracklist(TracklistCommand::GetSingle))
            .await
    }

    /// Sets single mode.
    pub async fn set_single(&self, value: bool) -> Result<()> {
        self.send_command(Command::Tracklist(TracklistCommand::SetSingle { value }))
            .await
    }

    /// Gets random mode.
    pub async fn random(&self) -> Result<Option<bool>> {
        self.execute_as(Command::Tracklist(TracklistCommand::GetRandom))
            .await
    }

    /// Sets random mode.
    pub async fn set_random(&self, value: bool) -> Result<()> {
        self.send_command(Command::Tracklist(TracklistCommand::SetRandom { value }))
            .await
    }
}
