//! Client-side state sink.
//!
//! The connection publishes everything it cannot hand to a specific caller
//! as an [`Action`]: connectivity transitions, unattributed server errors,
//! and every server-pushed event. Anything implementing [`Dispatch`] can
//! receive them; [`StateHub`] is the stock implementation.
//!
//! # Action Kinds
//!
//! | Kind | Payload |
//! |------|---------|
//! | `socket/connected` | `null` |
//! | `socket/disconnected` | `null` |
//! | `dialog/error` | raw `error` value |
//! | any event name | the full event message |

// ============================================================================
// Submodules
// ============================================================================

mod hub;

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::Event;

// ============================================================================
// Re-exports
// ============================================================================

pub use hub::{DEFAULT_EVENT_CAPACITY, StateHub, Subscription};

// ============================================================================
// Constants
// ============================================================================

/// Published when the socket opens.
pub const SOCKET_CONNECTED: &str = "socket/connected";

/// Published when the socket closes for any reason.
pub const SOCKET_DISCONNECTED: &str = "socket/disconnected";

/// Published for server errors not tied to a pending request.
pub const DIALOG_ERROR: &str = "dialog/error";

/// Dismisses the current error.
pub const DIALOG_CLOSE: &str = "dialog/close";

// ============================================================================
// Action
// ============================================================================

/// A typed state-mutation trigger.
///
/// # Format
///
/// ```json
/// { "type": "player/volume", "payload": { "event": "player/volume", "volume": 42 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind.
    #[serde(rename = "type")]
    pub kind: String,

    /// Action payload.
    #[serde(default)]
    pub payload: Value,
}

impl Action {
    /// Creates an action.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Creates an action with a `null` payload.
    #[inline]
    #[must_use]
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null)
    }

    /// Returns `true` if this action has the given kind.
    #[inline]
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

impl From<Event> for Action {
    /// The action kind is the event name; the payload is the whole message.
    fn from(event: Event) -> Self {
        let kind = event.name.clone();
        Self::new(kind, event.into_message())
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Receiver of actions published by a connection.
///
/// `dispatch` is called inline from the connection's event loop, one action
/// at a time, in the order messages arrived. It must not block.
pub trait Dispatch: Send + Sync {
    /// Handles one action.
    fn dispatch(&self, action: Action);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_action_from_event_keeps_whole_message() {
        let event: Event =
            serde_json::from_value(json!({"event": "player/volume", "volume": 42})).expect("event");
        let action = Action::from(event);

        assert!(action.is("player/volume"));
        assert_eq!(action.payload, json!({"event": "player/volume", "volume": 42}));
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::bare(SOCKET_CONNECTED);
        let value = serde_json::to_value(&action).expect("serialize");
        assert_eq!(value, json!({"type": "socket/connected", "payload": null}));
    }
}
