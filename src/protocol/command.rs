//! Command definitions organized by backend module.
//!
//! Commands follow the appliance's `module.method_name` format.
//!
//! # Command Modules
//!
//! | Module | Commands |
//! |--------|----------|
//! | `playback` | Transport control, seek, state |
//! | `mixer` | Volume, mute, output devices |
//! | `tracklist` | Queue contents and play modes |
//! | `playlist` | Stored playlists |
//! | `local` | Local library browse and scan |
//! | `radio` | Radio directory and search |
//! | `search` | Global search |
//! | `source` | Active input source |
//! | `storage` | Removable storage |
//! | `bluetooth` | Adapter and devices |
//! | `network` | Interfaces and Wi-Fi |
//! | `snapcast` | Multiroom servers and clients |
//! | `system` | Info, power, clock |
//! | `config` | Persistent settings |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

use super::Call;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by module.
///
/// This enum wraps module-specific command enums for unified serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Playback module commands.
    Playback(PlaybackCommand),
    /// Mixer module commands.
    Mixer(MixerCommand),
    /// Tracklist module commands.
    Tracklist(TracklistCommand),
    /// Playlist module commands.
    Playlist(PlaylistCommand),
    /// Local library commands.
    Local(LocalCommand),
    /// Radio module commands.
    Radio(RadioCommand),
    /// Search module commands.
    Search(SearchCommand),
    /// Source module commands.
    Source(SourceCommand),
    /// Storage module commands.
    Storage(StorageCommand),
    /// Bluetooth module commands.
    Bluetooth(BluetoothCommand),
    /// Network module commands.
    Network(NetworkCommand),
    /// Snapcast module commands.
    Snapcast(SnapcastCommand),
    /// System module commands.
    System(SystemCommand),
    /// Config module commands.
    Config(ConfigCommand),
}

impl Command {
    /// Converts the command into a generic [`Call`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails, or
    /// [`Error::Protocol`] if the serialized form has no method name.
    pub fn into_call(self) -> Result<Call> {
        let Value::Object(mut map) = serde_json::to_value(self)? else {
            return Err(Error::protocol("command did not serialize to an object"));
        };

        let method = match map.remove("method") {
            Some(Value::String(method)) => method,
            _ => return Err(Error::protocol("command has no method name")),
        };

        Ok(Call::new(method, map.remove("params")))
    }
}

// ============================================================================
// Playback Commands
// ============================================================================

/// Playback module commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PlaybackCommand {
    /// Start playback, optionally of a given URI or tracklist entry.
    #[serde(rename = "playback.play")]
    Play {
        /// Track URI to play.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        /// Tracklist id to play.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tlid: Option<u64>,
    },

    /// Pause playback.
    #[serde(rename = "playback.pause")]
    Pause,

    /// Resume paused playback.
    #[serde(rename = "playback.resume")]
    Resume,

    /// Stop playback.
    #[serde(rename = "playback.stop")]
    Stop,

    /// Skip to the next track.
    #[serde(rename = "playback.next")]
    Next,

    /// Go back to the previous track.
    #[serde(rename = "playback.previous")]
    Previous,

    /// Seek within the current track.
    #[serde(rename = "playback.seek")]
    Seek {
        /// Target position in milliseconds.
        time_position: u64,
    },

    /// Get playback state.
    #[serde(rename = "playback.get_state")]
    GetState,

    /// Get position in the current track.
    #[serde(rename = "playback.get_time_position")]
    GetTimePosition,

    /// Get the current tracklist entry.
    #[serde(rename = "playback.get_current_tl_track")]
    GetCurrentTlTrack,
}

// ============================================================================
// Mixer Commands
// ============================================================================

/// Mixer module commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum MixerCommand {
    /// Get output volume.
    #[serde(rename = "mixer.get_volume")]
    GetVolume,

    /// Set output volume.
    #[serde(rename = "mixer.set_volume")]
    SetVolume {
        /// Volume, 0-100.
        volume: u8,
    },

    /// Get mute state.
    #[serde(rename = "mixer.get_mute")]
    GetMute,

    /// Set mute state.
    #[serde(rename = "mixer.set_mute")]
    SetMute {
        /// Whether to mute.
        mute: bool,
    },

    /// List playback mixers (output devices).
    #[serde(rename = "mixer.get_playback_mixers")]
    GetPlaybackMixers,
}

// ============================================================================
// Tracklist Commands
// ============================================================================

/// Tracklist (play queue) commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum TracklistCommand {
    /// Get the queue.
    #[serde(rename = "tracklist.get_tltracks")]
    GetTlTracks,

    /// Append URIs to the queue.
    #[serde(rename = "tracklist.add")]
    Add {
        /// Track URIs.
        uris: Vec<String>,
    },

    /// Remove an entry.
    #[serde(rename = "tracklist.remove")]
    Remove {
        /// Tracklist id.
        tlid: u64,
    },

    /// Empty the queue.
    #[serde(rename = "tracklist.clear")]
    Clear,

    /// Move the slice `start..end` to `to_position`.
    #[serde(rename = "tracklist.move")]
    Move {
        /// First index of the slice.
        start: u32,
        /// End index of the slice (exclusive).
        end: u32,
        /// Destination index.
        to_position: u32,
    },

    /// Get repeat mode.
    #[serde(rename = "tracklist.get_repeat")]
    GetRepeat,

    /// Set repeat mode.
    #[serde(rename = "tracklist.set_repeat")]
    SetRepeat {
        /// Enabled.
        value: bool,
    },

    /// Get single mode.
    #[serde(rename = "tracklist.get_single")]
    GetSingle,

    /// Set single mode.
    #[serde(rename = "tracklist.set_single")]
    SetSingle {
        /// Enabled.
        value: bool,
    },

    /// Get random mode.
    #[serde(rename = "tracklist.get_random")]
    GetRandom,

    /// Set random mode.
    #[serde(rename = "tracklist.set_random")]
    SetRandom {
        /// Enabled.
        value: bool,
    },
}

// ============================================================================
// Playlist Commands
// ============================================================================

/// Stored playlist commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum PlaylistCommand {
    /// Browse playlists.
    #[serde(rename = "playlist.directory")]
    Directory {
        /// Directory URI.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        /// Page size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Page offset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u32>,
    },

    /// Get one playlist.
    #[serde(rename = "playlist.item")]
    Item {
        /// Playlist URI.
        uri: String,
    },

    /// Create a playlist from tracklist entries.
    #[serde(rename = "playlist.create")]
    Create {
        /// Playlist name.
        name: String,
        /// Tracklist entries to store.
        tl_tracks: Value,
    },

    /// Rename a playlist.
    #[serde(rename = "playlist.edit")]
    Edit {
        /// Playlist URI.
        uri: String,
        /// New name.
        name: String,
    },

    /// Delete a playlist.
    #[serde(rename = "playlist.delete")]
    Delete {
        /// Playlist URI.
        uri: String,
    },

    /// Move a range of entries within a playlist.
    #[serde(rename = "playlist.move")]
    Move {
        /// Playlist URI.
        uri: String,
        /// First position of the range.
        start: u32,
        /// Position after the range.
        end: u32,
        /// Destination position.
        to_position: u32,
    },

    /// Remove an entry from a playlist.
    #[serde(rename = "playlist.remove")]
    Remove {
        /// Playlist URI.
        uri: String,
        /// Entry id.
        tlid: u64,
    },

    /// Add tracks to playlists.
    #[serde(rename = "playlist.add")]
    Add {
        /// Playlist URIs.
        uris: Vec<String>,
        /// Track URIs.
        track_uris: Vec<String>,
    },
}

// ============================================================================
// Local Library Commands
// ============================================================================

/// Local library commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum LocalCommand {
    /// Browse the library.
    #[serde(rename = "local.directory")]
    Directory {
        /// Directory URI.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        /// Page size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Page offset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u32>,
    },

    /// Get scan progress.
    #[serde(rename = "local.scan_progress")]
    ScanProgress,

    /// Start a library scan.
    #[serde(rename = "local.scan")]
    Scan,

    /// Fetch artist artwork and metadata.
    #[serde(rename = "local.scan_artists")]
    ScanArtists,

    /// Clear the library database.
    #[serde(rename = "local.clean")]
    Clean,
}

// ============================================================================
// Radio and Search Commands
// ============================================================================

/// Radio commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RadioCommand {
    /// Browse radio stations.
    #[serde(rename = "radio.directory")]
    Directory {
        /// Directory URI.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
        /// Page size.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<u32>,
        /// Page offset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        offset: Option<u32>,
    },

    /// Search stations.
    #[serde(rename = "radio.search")]
    Search {
        /// Query object, e.g. `{"any": ["jazz"]}`.
        query: Value,
    },
}

/// Global search commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum SearchCommand {
    /// Search every backend.
    #[serde(rename = "search.search")]
    Search {
        /// Query object.
        query: Value,
    },
}

// ============================================================================
// Source and Storage Commands
// ============================================================================

/// Input source commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum SourceCommand {
    /// Get the active source.
    #[serde(rename = "source.get")]
    Get,

    /// Switch source.
    #[serde(rename = "source.set")]
    Set {
        /// Source type, e.g. `local`, `bluetooth`, `snapcast`.
        #[serde(rename = "type")]
        kind: String,
    },
}

/// Removable storage commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum StorageCommand {
    /// List storage devices.
    #[serde(rename = "storage.list")]
    List {
        /// Optional URI filter.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },

    /// List a directory on a device.
    #[serde(rename = "storage.dir")]
    Dir {
        /// Path to list.
        path: String,
    },

    /// Mount a device.
    #[serde(rename = "storage.mount")]
    Mount {
        /// Device node.
        dev: String,
    },

    /// Unmount a device.
    #[serde(rename = "storage.unmount")]
    Unmount {
        /// Device node.
        dev: String,
    },
}

// ============================================================================
// Bluetooth Commands
// ============================================================================

/// Bluetooth commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum BluetoothCommand {
    /// Start discovery.
    #[serde(rename = "bluetooth.discover")]
    Discover,

    /// List known devices.
    #[serde(rename = "bluetooth.devices")]
    Devices,

    /// Get adapter power state.
    #[serde(rename = "bluetooth.adapter_get_state")]
    AdapterGetState,

    /// Power the adapter on or off.
    #[serde(rename = "bluetooth.adapter_set_state")]
    AdapterSetState {
        /// Powered.
        state: bool,
    },

    /// Connect a device.
    #[serde(rename = "bluetooth.connect")]
    Connect {
        /// D-Bus object path of the device.
        path: String,
    },

    /// Disconnect a device.
    #[serde(rename = "bluetooth.disconnect")]
    Disconnect {
        /// D-Bus object path of the device.
        path: String,
    },

    /// Forget a device.
    #[serde(rename = "bluetooth.remove")]
    Remove {
        /// D-Bus object path of the device.
        path: String,
    },
}

// ============================================================================
// Network Commands
// ============================================================================

/// Network commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum NetworkCommand {
    /// List Wi-Fi networks.
    #[serde(rename = "network.wifi")]
    Wifi {
        /// Force a rescan first.
        rescan: bool,
    },

    /// List interfaces.
    #[serde(rename = "network.devices")]
    Devices,

    /// Get one interface.
    #[serde(rename = "network.device")]
    Device {
        /// Interface name, e.g. `wlan0`.
        ifname: String,
    },

    /// Get a saved connection.
    #[serde(rename = "network.connection")]
    Connection {
        /// Connection name.
        name: String,
    },

    /// Join a Wi-Fi network.
    #[serde(rename = "network.connect_wlan")]
    ConnectWlan {
        /// Network SSID.
        ssid: String,
        /// Passphrase, if secured.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },

    /// Delete a saved connection.
    #[serde(rename = "network.delete")]
    Delete {
        /// Connection name.
        name: String,
    },

    /// Disconnect an interface.
    #[serde(rename = "network.disconnect")]
    Disconnect {
        /// Interface name.
        ifname: String,
    },

    /// Change IPv4 settings of a connection.
    #[serde(rename = "network.modify")]
    Modify {
        /// Interface name.
        ifname: String,
        /// Connection name.
        name: String,
        /// `auto` or `manual`.
        method: String,
        /// Address in CIDR form.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ipv4_address: Option<String>,
        /// Gateway.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ipv4_gateway: Option<String>,
        /// DNS servers.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ipv4_dns: Option<String>,
    },
}

// ============================================================================
// Snapcast Commands
// ============================================================================

/// Snapcast multiroom commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum SnapcastCommand {
    /// List discovered servers.
    #[serde(rename = "snapcast.servers")]
    Servers {
        /// Force a rescan first.
        rescan: bool,
    },

    /// Get server status.
    #[serde(rename = "snapcast.get_status")]
    GetStatus,

    /// Set a client's volume.
    #[serde(rename = "snapcast.set_volume")]
    SetVolume {
        /// Snapcast client id.
        client_id: String,
        /// Volume, 0-100.
        volume: u8,
        /// Muted.
        mute: bool,
    },

    /// Connect to a server.
    #[serde(rename = "snapcast.connect")]
    Connect {
        /// Server address.
        ip: String,
    },

    /// Disconnect from the server.
    #[serde(rename = "snapcast.disconnect")]
    Disconnect,
}

// ============================================================================
// System and Config Commands
// ============================================================================

/// System commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum SystemCommand {
    /// Hardware and software info.
    #[serde(rename = "system.info")]
    Info,

    /// Current date and time.
    #[serde(rename = "system.datetime")]
    Datetime,

    /// Reboot the appliance.
    #[serde(rename = "system.reboot")]
    Reboot,

    /// Power off the appliance.
    #[serde(rename = "system.shutdown")]
    Shutdown,

    /// Get standby state.
    #[serde(rename = "system.get_power_state")]
    GetPowerState,

    /// Enter or leave standby.
    #[serde(rename = "system.standby")]
    Standby {
        /// `true` to enter standby.
        state: bool,
    },
}

/// Persistent configuration commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum ConfigCommand {
    /// Read the configuration.
    #[serde(rename = "config.get")]
    Get,

    /// Replace the configuration.
    #[serde(rename = "config.set")]
    Set {
        /// New configuration object.
        config: Value,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_unit_command_has_no_params() {
        let call = Command::Playback(PlaybackCommand::Pause)
            .into_call()
            .expect("call");
        assert_eq!(call, Call::bare("playback.pause"));
    }

    #[test]
    fn test_play_skips_absent_fields() {
        let call = Command::Playback(PlaybackCommand::Play {
            uri: Some("local:1".into()),
            tlid: None,
        })
        .into_call()
        .expect("call");

        assert_eq!(call.method, "playback.play");
        assert_eq!(call.params, Some(json!({"uri": "local:1"})));
    }

    #[test]
    fn test_set_volume() {
        let call = Command::Mixer(MixerCommand::SetVolume { volume: 42 })
            .into_call()
            .expect("call");
        assert_eq!(call, Call::new("mixer.set_volume", Some(json!({"volume": 42}))));
    }

    #[test]
    fn test_source_set_uses_type_key() {
        let call = Command::Source(SourceCommand::Set {
            kind: "bluetooth".into(),
        })
        .into_call()
        .expect("call");
        assert_eq!(call.params, Some(json!({"type": "bluetooth"})));
    }

    #[test]
    fn test_tracklist_move() {
        let call = Command::Tracklist(TracklistCommand::Move {
            start: 2,
            end: 3,
            to_position: 0,
        })
        .into_call()
        .expect("call");
        assert_eq!(
            call.params,
            Some(json!({"start": 2, "end": 3, "to_position": 0}))
        );
    }

    #[test]
    fn test_playlist_move() {
        let call = Command::Playlist(PlaylistCommand::Move {
            uri: "m3u:road-trip.m3u8".into(),
            start: 4,
            end: 6,
            to_position: 1,
        })
        .into_call()
        .expect("call");
        assert_eq!(call.method, "playlist.move");
        assert_eq!(
            call.params,
            Some(json!({"uri": "m3u:road-trip.m3u8", "start": 4, "end": 6, "to_position": 1}))
        );
    }

    #[test]
    fn test_call_try_from_command() {
        let call = Call::try_from(Command::System(SystemCommand::Standby { state: true }))
            .expect("call");
        assert_eq!(call.method, "system.standby");
        assert_eq!(call.params, Some(json!({"state": true})));
    }

    #[test]
    fn test_command_roundtrip_through_wire_form() {
        let json_str = r#"{"method":"network.connect_wlan","params":{"ssid":"home"}}"#;
        let command: Command = serde_json::from_str(json_str).expect("parse");
        assert_eq!(
            command,
            Command::Network(NetworkCommand::ConnectWlan {
                ssid: "home".into(),
                password: None
            })
        );
    }
}
