//! Inbound message classification.
//!
//! Every text frame from the appliance is sorted into exactly one route:
//!
//! | Shape | Route |
//! |-------|-------|
//! | `{error, id?}` | [`Inbound::Failure`] |
//! | `{id, result}` | [`Inbound::Reply`] |
//! | `{event, ...}` (no `id`) | [`Inbound::Event`] |
//! | anything else | [`Inbound::Unroutable`] |
//!
//! The presence of `id` is the only thing separating a reply from an event.
//! A message carrying an `id` is never treated as an event, even when it
//! also has an `event` field.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use crate::error::Result;
use crate::identifiers::RequestId;

use super::{Event, Response};

// ============================================================================
// Inbound
// ============================================================================

/// A classified inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Successful reply to the request with this id.
    Reply(Response),

    /// Error reply. `id` is `None` when the appliance did not attribute it.
    Failure {
        /// Correlation id, if any.
        id: Option<RequestId>,
        /// Raw `error` value, typically `{code, message}`.
        error: Value,
    },

    /// Server-pushed event.
    Event(Event),

    /// Valid JSON that fits none of the above.
    Unroutable(Value),
}

impl Inbound {
    /// Parses and classifies a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if `text` is not JSON at all. Shapes that
    /// parse but make no sense come back as [`Inbound::Unroutable`].
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Ok(Self::classify(value))
    }

    /// Classifies an already parsed message.
    #[must_use]
    pub fn classify(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::Unroutable(value);
        };

        let id = match map.get("id") {
            None | Some(Value::Null) => IdField::Absent,
            Some(v) => match v.as_u64().and_then(RequestId::new) {
                Some(id) => IdField::Valid(id),
                None => IdField::Invalid,
            },
        };

        if let Some(error) = map.remove("error").filter(|e| !e.is_null()) {
            return Self::Failure {
                id: id.valid(),
                error,
            };
        }

        match id {
            IdField::Valid(id) => {
                let result = map.remove("result").unwrap_or(Value::Null);
                map.remove("id");
                Self::Reply(Response::with_extra(id, result, map))
            }
            IdField::Invalid => Self::Unroutable(Value::Object(map)),
            IdField::Absent => Self::event_or_unroutable(map),
        }
    }

    /// Returns the correlation id, if this message carries a valid one.
    #[must_use]
    pub fn id(&self) -> Option<RequestId> {
        match self {
            Self::Reply(response) => Some(response.id),
            Self::Failure { id, .. } => *id,
            Self::Event(_) | Self::Unroutable(_) => None,
        }
    }

    fn event_or_unroutable(mut map: Map<String, Value>) -> Self {
        match map.remove("event") {
            Some(Value::String(name)) => Self::Event(Event::new(name, map)),
            Some(other) => {
                map.insert("event".to_string(), other);
                Self::Unroutable(Value::Object(map))
            }
            None => Self::Unroutable(Value::Object(map)),
        }
    }
}

/// State of the `id` field of a message.
enum IdField {
    Absent,
    Valid(RequestId),
    Invalid,
}

impl IdField {
    fn valid(self) -> Option<RequestId> {
        match self {
            Self::Valid(id) => Some(id),
            Self::Absent | Self::Invalid => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
