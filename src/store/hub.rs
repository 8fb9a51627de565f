//! Broadcasting state hub.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{trace, warn};

use super::{Action, DIALOG_CLOSE, DIALOG_ERROR, Dispatch, SOCKET_CONNECTED, SOCKET_DISCONNECTED};

// ============================================================================
// Constants
// ============================================================================

/// Default number of actions buffered per subscriber.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

// ============================================================================
// StateHub
// ============================================================================

/// Shared client-side state fed by a connection.
///
/// Reduces socket actions into a `connected` flag, remembers the last
/// unattributed server error, and fans every action out to subscribers.
///
/// # Example
///
/// ```ignore
/// let hub = client.store();
/// let mut volume = hub.subscribe_to("volume_changed");
///
/// while let Some(action) = volume.recv().await {
///     println!("volume is now {}", action.payload["volume"]);
/// }
/// ```
pub struct StateHub {
    /// Mirrors the connection's open/closed state.
    connected: AtomicBool,
    /// Last `dialog/error` payload not yet dismissed.
    last_error: Mutex<Option<Value>>,
    /// Fan-out to subscribers.
    sender: broadcast::Sender<Action>,
}

impl StateHub {
    /// Creates a hub with the default buffer size.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Creates a hub buffering up to `capacity` actions per subscriber.
    ///
    /// A capacity of 0 is raised to 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            connected: AtomicBool::new(false),
            last_error: Mutex::new(None),
            sender,
        }
    }

    /// Returns `true` while the connection is open.
    #[inline]
    #[must_use]
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns the last unattributed server error, if not dismissed.
    #[must_use]
    pub fn last_error(&self) -> Option<Value> {
        self.last_error.lock().clone()
    }

    /// Takes and dismisses the last unattributed server error.
    pub fn take_error(&self) -> Option<Value> {
        self.last_error.lock().take()
    }

    /// Subscribes to every action.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter: None,
        }
    }

    /// Subscribes to actions of one kind, e.g. an event name.
    #[must_use]
    pub fn subscribe_to(&self, kind: impl Into<String>) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            filter: Some(kind.into()),
        }
    }

    /// Returns the number of live subscriptions.
    #[inline]
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Applies the hub's own reductions.
    fn reduce(&self, action: &Action) {
        match action.kind.as_str() {
            SOCKET_CONNECTED => self.connected.store(true, Ordering::Release),
            SOCKET_DISCONNECTED => self.connected.store(false, Ordering::Release),
            DIALOG_ERROR => *self.last_error.lock() = Some(action.payload.clone()),
            DIALOG_CLOSE => *self.last_error.lock() = None,
            _ => {}
        }
    }
}

impl Default for StateHub {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHub")
            .field("connected", &self.connected())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl Dispatch for StateHub {
    fn dispatch(&self, action: Action) {
        self.reduce(&action);
        trace!(kind = %action.kind, "Dispatching action");

        // No subscribers is fine; the reductions above already happened.
        let _ = self.sender.send(action);
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// A stream of actions from a [`StateHub`].
///
/// Actions arrive in dispatch order. A subscriber that falls more than the
/// hub's capacity behind loses the oldest actions and keeps going.
pub struct Subscription {
    receiver: broadcast::Receiver<Action>,
    filter: Option<String>,
}

impl Subscription {
    /// Waits for the next matching action.
    ///
    /// Returns `None` once the hub is dropped.
    pub async fn recv(&mut self) -> Option<Action> {
        loop {
            match self.receiver.recv().await {
                Ok(action) if self.accepts(&action) => return Some(action),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, filter = ?self.filter, "Subscriber lagged, actions dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next matching action if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Action> {
        loop {
            match self.receiver.try_recv() {
                Ok(action) if self.accepts(&action) => return Some(action),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, filter = ?self.filter, "Subscriber lagged, actions dropped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    #[inline]
    fn accepts(&self, action: &Action) -> bool {
        self.filter.as_deref().is_none_or(|kind| action.is(kind))
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_connected_flag_follows_socket_actions() {
        let hub = StateHub::new();
        assert!(!hub.connected());

        hub.dispatch(Action::bare(SOCKET_CONNECTED));
        assert!(hub.connected());

        hub.dispatch(Action::bare(SOCKET_DISCONNECTED));
        assert!(!hub.connected());
    }

    #[test]
    fn test_error_is_kept_until_dismissed() {
        let hub = StateHub::new();
        hub.dispatch(Action::new(DIALOG_ERROR, json!({"message": "boom"})));
        assert_eq!(hub.last_error(), Some(json!({"message": "boom"})));

        hub.dispatch(Action::bare(DIALOG_CLOSE));
        assert_eq!(hub.last_error(), None);

        hub.dispatch(Action::new(DIALOG_ERROR, json!("again")));
        assert_eq!(hub.take_error(), Some(json!("again")));
        assert_eq!(hub.take_error(), None);
    }

    #[test]
    fn test_filtered_subscription() {
        let hub = StateHub::new();
        let mut all = hub.subscribe();
        let mut volume = hub.subscribe_to("player/volume");

        hub.dispatch(Action::new("player/position", json!(1)));
        hub.dispatch(Action::new("player/volume", json!(2)));
        hub.dispatch(Action::new("player/position", json!(3)));

        assert_eq!(volume.try_recv().map(|a| a.payload), Some(json!(2)));
        assert!(volume.try_recv().is_none());

        let kinds: Vec<_> = std::iter::from_fn(|| all.try_recv())
            .map(|a| a.payload)
            .collect();
        assert_eq!(kinds, vec![json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn test_lagged_subscriber_keeps_newest() {
        let hub = StateHub::with_capacity(2);
        let mut sub = hub.subscribe();

        for n in 0..5 {
            hub.dispatch(Action::new("tick", json!(n)));
        }

        assert_eq!(sub.try_recv().map(|a| a.payload), Some(json!(3)));
        assert_eq!(sub.try_recv().map(|a| a.payload), Some(json!(4)));
        assert!(sub.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_recv_ends_when_hub_dropped() {
        let hub = StateHub::new();
        let mut sub = hub.subscribe();
        hub.dispatch(Action::bare("last"));
        drop(hub);

        assert_eq!(sub.recv().await.map(|a| a.kind), Some("last".to_string()));
        assert!(sub.recv().await.is_none());
    }
}
