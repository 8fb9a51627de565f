//! Request and Response message types.
//!
//! Defines the JSON-RPC style envelopes exchanged with the appliance.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Command;

// ============================================================================
// Constants
// ============================================================================

/// Protocol version tag the appliance insists on.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// Call
// ============================================================================

/// A method invocation before it has been assigned a correlation id.
///
/// `method` is dot-namespaced (`playback.play`, `mixer.set_volume`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Method name in `module.method` format.
    pub method: String,

    /// Named parameters, omitted on the wire when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Call {
    /// Creates a call with optional parameters.
    #[inline]
    #[must_use]
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    /// Creates a call without parameters.
    #[inline]
    #[must_use]
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, None)
    }
}

impl TryFrom<Command> for Call {
    type Error = Error;

    fn try_from(command: Command) -> Result<Self> {
        command.into_call()
    }
}

// ============================================================================
// Request
// ============================================================================

/// A request from the client to the appliance.
///
/// # Format
///
/// ```json
/// {
///   "jsonrpc": "2.0",
///   "method": "playback.play",
///   "params": { "uri": "local:1" },
///   "id": 1
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: &'static str,

    /// Method and params.
    #[serde(flatten)]
    pub call: Call,

    /// Correlation id, echoed back by the response.
    pub id: RequestId,
}

impl Request {
    /// Creates a request for `call` with the given id.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, call: Call) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            call,
            id,
        }
    }

    /// Returns the method name.
    #[inline]
    #[must_use]
    pub fn method(&self) -> &str {
        &self.call.method
    }
}

// ============================================================================
// Response
// ============================================================================

/// A successful response from the appliance.
///
/// # Format
///
/// ```json
/// { "jsonrpc": "2.0", "id": 1, "result": { ... } }
/// ```
///
/// Fields other than `id` and `result` are kept in `extra`, so
/// [`into_message`](Self::into_message) gives back the message as received.
///
/// Error replies never become a `Response`: they are routed by
/// [`Inbound`](super::Inbound) either to the caller as
/// [`Error::Remote`] or to the global error path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Result payload. A missing `result` reads as `null`.
    #[serde(default)]
    pub result: Value,

    /// Sibling fields such as `jsonrpc`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Response {
    /// Creates a response with no sibling fields.
    #[inline]
    #[must_use]
    pub fn new(id: RequestId, result: Value) -> Self {
        Self::with_extra(id, result, Map::new())
    }

    /// Creates a response carrying the message's other fields.
    #[inline]
    #[must_use]
    pub fn with_extra(id: RequestId, result: Value, extra: Map<String, Value>) -> Self {
        Self { id, result, extra }
    }

    /// Unwraps the result payload.
    #[inline]
    #[must_use]
    pub fn into_result(self) -> Value {
        self.result
    }

    /// Rebuilds the full inbound message.
    #[must_use]
    pub fn into_message(self) -> Value {
        let mut message = self.extra;
        message.insert("id".to_string(), Value::from(self.id.get()));
        message.insert("result".to_string(), self.result);
        Value::Object(message)
    }

    /// Gets a string value from an object result.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.result
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    }

    /// Gets a u64 value from an object result.
    ///
    /// Returns 0 if key not found or not a number.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.result
            .get(key)
            .and_then(|v| v.as_u64())
            .unwrap_or_default()
    }

    /// Gets a boolean value from an object result.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.result
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
