//! Pending-request table and id allocator.
//!
//! Each entry is one in-flight request waiting for its reply. An entry
//! leaves the table exactly once: resolved by a matching reply, or failed
//! when the connection closes and the whole table is flushed.

// ============================================================================
// Imports
// ============================================================================

use std::num::NonZeroU64;

use rustc_hash::FxHashMap;
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;
use crate::protocol::Response;

// ============================================================================
// Types
// ============================================================================

/// Single-use handle completing a caller's request.
pub(crate) type Responder = oneshot::Sender<Result<Response>>;

// ============================================================================
// PendingTable
// ============================================================================

/// Map of in-flight request ids to their waiting callers.
#[derive(Debug)]
pub struct PendingTable {
    entries: FxHashMap<RequestId, Responder>,
    next_id: NonZeroU64,
}

impl PendingTable {
    /// Creates an empty table whose first id will be 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            next_id: NonZeroU64::MIN,
        }
    }

    /// Allocates the next id and stores `responder` under it.
    ///
    /// Ids are strictly increasing and never handed out twice.
    pub(crate) fn register(&mut self, responder: Responder) -> RequestId {
        let id = RequestId::from_raw(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let previous = self.entries.insert(id, responder);
        debug_assert!(previous.is_none(), "request id {id} allocated twice");
        id
    }

    /// Completes the entry for `id`, removing it.
    ///
    /// Returns `false` if no such entry exists. A caller that stopped
    /// waiting still counts as resolved.
    pub fn resolve(&mut self, id: RequestId, result: Result<Response>) -> bool {
        match self.entries.remove(&id) {
            Some(responder) => {
                let _ = responder.send(result);
                true
            }
            None => false,
        }
    }

    /// Fails every entry with an error from `make_error` and empties the table.
    ///
    /// Returns the number of entries failed.
    pub fn fail_all(&mut self, mut make_error: impl FnMut() -> Error) -> usize {
        let count = self.entries.len();
        for (_, responder) in self.entries.drain() {
            let _ = responder.send(Err(make_error()));
        }
        count
    }

    /// Returns `true` if `id` is waiting for a reply.
    #[inline]
    #[must_use]
    pub fn contains(&self, id: RequestId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of in-flight requests.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is in flight.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
