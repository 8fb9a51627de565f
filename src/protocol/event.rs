//! Event message types.
//!
//! Events are notifications pushed by the appliance without being asked.
//! They carry an `event` name and arbitrary sibling fields, and never an
//! `id`.
//!
//! # Event Names
//!
//! | Area | Events |
//! |------|--------|
//! | Mixer | `volume_changed`, `mixer_mute` |
//! | Playback | `playback_state_changed`, `track_position_updated`, `track_playback_*` |
//! | Tracklist | `tracklist_changed`, `options_changed` |
//! | Source | `source_changed`, `source_updated` |
//! | Connectivity | `bluetooth_state_changed`, `network_state_changed`, `scan_update` |
//! | System | `system_power_state` |
//!
//! The UI-side aliases `player/volume` and `player/position` decode to the
//! same variants as `volume_changed` and `track_position_updated`.

// ============================================================================
// Imports
// ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

// ============================================================================
// Event
// ============================================================================

/// An unsolicited notification from the appliance.
///
/// # Format
///
/// ```json
/// { "event": "volume_changed", "volume": 42 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Event {
    /// Event name.
    #[serde(rename = "event")]
    pub name: String,

    /// Every other field of the message.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Event {
    /// Creates an event from a name and its payload fields.
    #[must_use]
    pub fn new(name: impl Into<String>, params: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Decodes the payload fields into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| Error::decode(self.name.as_str(), e))
    }

    /// Rebuilds the full message object, `event` field included.
    #[must_use]
    pub fn into_message(self) -> Value {
        let mut message = self.params;
        message.insert("event".to_string(), Value::String(self.name));
        Value::Object(message)
    }

    /// Parses the event into a typed variant.
    #[must_use]
    pub fn parse(&self) -> ParsedEvent {
        self.parse_internal()
    }
}

// ============================================================================
// PlaybackState
// ============================================================================

/// Player transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Playing.
    Playing,
    /// Paused.
    Paused,
    /// Stopped.
    Stopped,
}

impl PlaybackState {
    /// Parses the wire representation.
    #[must_use]
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "playing" => Some(Self::Playing),
            "paused" => Some(Self::Paused),
            "stopped" => Some(Self::Stopped),
            _ => None,
        }
    }
}

// ============================================================================
// ParsedEvent
// ============================================================================

/// Parsed event types for type-safe handling.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEvent {
    /// Mixer volume changed.
    VolumeChanged {
        /// New volume, 0-100.
        volume: u8,
    },

    /// Mixer mute toggled.
    MuteChanged {
        /// Whether output is muted.
        mute: bool,
    },

    /// Periodic playback position update.
    PositionUpdated {
        /// Position in milliseconds.
        time_position: u64,
    },

    /// Playback state changed.
    PlaybackStateChanged {
        /// New state.
        state: PlaybackState,
    },

    /// A track started playing.
    TrackPlaybackStarted {
        /// The tracklist entry.
        tl_track: Value,
    },

    /// Playback paused mid-track.
    TrackPlaybackPaused {
        /// The tracklist entry.
        tl_track: Value,
        /// Position in milliseconds.
        time_position: u64,
    },

    /// Playback resumed mid-track.
    TrackPlaybackResumed {
        /// The tracklist entry.
        tl_track: Value,
        /// Position in milliseconds.
        time_position: u64,
    },

    /// A track finished or was skipped.
    TrackPlaybackEnded {
        /// The tracklist entry.
        tl_track: Value,
        /// Position in milliseconds at which it ended.
        time_position: u64,
    },

    /// Metadata of the current track changed.
    TrackMetaUpdated {
        /// The tracklist entry.
        tl_track: Value,
    },

    /// The tracklist contents changed.
    TracklistChanged {
        /// New tracklist, if included.
        tl_tracks: Option<Value>,
    },

    /// Repeat, single or random changed.
    OptionsChanged,

    /// Active source switched or its state updated.
    SourceChanged {
        /// Source description.
        source: Value,
    },

    /// Bluetooth adapter state changed.
    BluetoothStateChanged {
        /// Adapter state.
        state: Value,
    },

    /// Network device or scan results changed.
    NetworkStateChanged {
        /// Device description.
        device: Value,
        /// Visible networks.
        networks: Value,
    },

    /// Library scan progress.
    ScanUpdated {
        /// Progress object.
        progress: Value,
    },

    /// Power state (standby/on) changed.
    PowerStateChanged {
        /// Reported state.
        state: Value,
    },

    /// Unknown event type.
    Unknown {
        /// Event name.
        name: String,
        /// Event fields.
        params: Map<String, Value>,
    },
}

// ============================================================================
// Event Parsing Implementation
// ============================================================================

impl Event {
    /// Internal parsing implementation.
    fn parse_internal(&self) -> ParsedEvent {
        match self.name.as_str() {
            "volume_changed" | "player/volume" => ParsedEvent::VolumeChanged {
                volume: self.get_u64("volume").min(100) as u8,
            },

            "mixer_mute" => ParsedEvent::MuteChanged {
                mute: self.get_bool("mute"),
            },

            "track_position_updated" | "player/position" => ParsedEvent::PositionUpdated {
                time_position: self.get_u64("time_position"),
            },

            "playback_state_changed" => match self
                .params
                .get("state")
                .and_then(Value::as_str)
                .and_then(PlaybackState::from_wire)
            {
                Some(state) => ParsedEvent::PlaybackStateChanged { state },
                None => self.unknown(),
            },

            "track_playback_started" => ParsedEvent::TrackPlaybackStarted {
                tl_track: self.get_value("tl_track"),
            },

            "track_playback_paused" => ParsedEvent::TrackPlaybackPaused {
                tl_track: self.get_value("tl_track"),
                time_position: self.get_u64("time_position"),
            },

            "track_playback_resumed" => ParsedEvent::TrackPlaybackResumed {
                tl_track: self.get_value("tl_track"),
                time_position: self.get_u64("time_position"),
            },

            "track_playback_ended" => ParsedEvent::TrackPlaybackEnded {
                tl_track: self.get_value("tl_track"),
                time_position: self.get_u64("time_position"),
            },

            "track_meta_updated" => ParsedEvent::TrackMetaUpdated {
                tl_track: self.get_value("tl_track"),
            },

            "tracklist_changed" => ParsedEvent::TracklistChanged {
                tl_tracks: self.params.get("tl_tracks").cloned(),
            },

            "options_changed" => ParsedEvent::OptionsChanged,

            "source_changed" | "source_updated" => ParsedEvent::SourceChanged {
                source: self.get_value("source"),
            },

            "bluetooth_state_changed" => ParsedEvent::BluetoothStateChanged {
                state: self.get_value("state"),
            },

            "network_state_changed" => ParsedEvent::NetworkStateChanged {
                device: self.get_value("device"),
                networks: self.get_value("networks"),
            },

            "scan_update" => ParsedEvent::ScanUpdated {
                progress: self.get_value("progress"),
            },

            "system_power_state" => ParsedEvent::PowerStateChanged {
                state: self.get_value("state"),
            },

            _ => self.unknown(),
        }
    }

    fn unknown(&self) -> ParsedEvent {
        ParsedEvent::Unknown {
            name: self.name.clone(),
            params: self.params.clone(),
        }
    }

    /// Gets a field, `null` if absent.
    #[inline]
    fn get_value(&self, key: &str) -> Value {
        self.params.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Gets a u64 field. Floats are truncated.
    #[inline]
    fn get_u64(&self, key: &str) -> u64 {
        self.params
            .get(key)
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f.max(0.0) as u64)))
            .unwrap_or_default()
    }

    /// Gets a bool field.
    #[inline]
    fn get_bool(&self, key: &str) -> bool {
        self.params
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn event(value: Value) -> Event {
        serde_json::from_value(value).expect("parse event")
    }

    #[test]
    fn test_event_fields_are_flattened() {
        let ev = event(json!({"event": "player/volume", "volume": 42}));
        assert_eq!(ev.name, "player/volume");
        assert_eq!(ev.params.get("volume"), Some(&json!(42)));
        assert!(!ev.params.contains_key("event"));
    }

    #[test]
    fn test_volume_aliases() {
        for name in ["volume_changed", "player/volume"] {
            let ev = event(json!({"event": name, "volume": 42}));
            assert_eq!(ev.parse(), ParsedEvent::VolumeChanged { volume: 42 });
        }
    }

    #[test]
    fn test_position_update() {
        let ev = event(json!({"event": "track_position_updated", "time_position": 15300}));
        assert_eq!(
            ev.parse(),
            ParsedEvent::PositionUpdated {
                time_position: 15300
            }
        );
    }

    #[test]
    fn test_playback_state_changed() {
        let ev = event(json!({"event": "playback_state_changed", "state": "paused"}));
        assert_eq!(
            ev.parse(),
            ParsedEvent::PlaybackStateChanged {
                state: PlaybackState::Paused
            }
        );

        // An unrecognised state is not silently mapped to a default.
        let ev = event(json!({"event": "playback_state_changed", "state": "buffering"}));
        assert!(matches!(ev.parse(), ParsedEvent::Unknown { .. }));
    }

    #[test]
    fn test_track_playback_paused() {
        let ev = event(json!({
            "event": "track_playback_paused",
            "tl_track": {"tlid": 3},
            "time_position": 1200
        }));

        match ev.parse() {
            ParsedEvent::TrackPlaybackPaused {
                tl_track,
                time_position,
            } => {
                assert_eq!(tl_track["tlid"], 3);
                assert_eq!(time_position, 1200);
            }
            other => panic!("unexpected parsed event: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event() {
        let ev = event(json!({"event": "custom/thing", "foo": "bar"}));
        match ev.parse() {
            ParsedEvent::Unknown { name, params } => {
                assert_eq!(name, "custom/thing");
                assert_eq!(params["foo"], "bar");
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_custom_payload() {
        #[derive(Deserialize)]
        struct Volume {
            volume: u8,
        }

        let ev = event(json!({"event": "player/volume", "volume": 42}));
        let decoded: Volume = ev.decode().expect("decode");
        assert_eq!(decoded.volume, 42);

        let err = ev.decode::<Vec<u8>>().expect_err("shape mismatch");
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_into_message_restores_event_field() {
        let ev = event(json!({"event": "mixer_mute", "mute": true}));
        assert_eq!(ev.into_message(), json!({"event": "mixer_mute", "mute": true}));
    }
}
