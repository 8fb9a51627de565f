//! Type-safe identifiers.
//!
//! The only identifier on the wire is the request correlation id: a positive
//! integer attached to every outbound request and echoed back in its
//! response.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

// ============================================================================
// RequestId
// ============================================================================

/// Correlation id of an outbound request.
///
/// Ids start at 1 and are handed out in strictly increasing order by the
/// connection's pending table. They are never reused for the lifetime of a
/// [`Connection`](crate::transport::Connection), across reconnects included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(NonZeroU64);

impl RequestId {
    /// Creates a request id from a raw value.
    ///
    /// Returns `None` for 0, which the appliance treats as "no id".
    #[inline]
    #[must_use]
    pub fn new(id: u64) -> Option<Self> {
        NonZeroU64::new(id).map(Self)
    }

    /// Wraps an already non-zero value.
    #[inline]
    #[must_use]
    pub(crate) const fn from_raw(id: NonZeroU64) -> Self {
        Self(id)
    }

    /// Returns the raw integer value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_an_id() {
        assert!(RequestId::new(0).is_none());
        assert_eq!(RequestId::new(7).map(RequestId::get), Some(7));
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let id = RequestId::new(42).expect("non-zero");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "42");

        let parsed: RequestId = serde_json::from_str("42").expect("parse");
        assert_eq!(parsed, id);
        assert!(serde_json::from_str::<RequestId>("0").is_err());
    }

    #[test]
    fn test_ordering_follows_value() {
        let a = RequestId::new(1).expect("non-zero");
        let b = RequestId::new(2).expect("non-zero");
        assert!(a < b);
        assert_eq!(b.to_string(), "2");
    }
}
