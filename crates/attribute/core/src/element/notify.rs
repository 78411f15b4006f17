//! Change notification with owned subscription handles.
//!
//! A [`Subscription`] is the only way to stay registered: dropping it removes
//! the callback from the notifier, so a detached element can never call back
//! into an attribute it no longer belongs to.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Callback invoked after an element's value changed.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Subscribers {
    next_id: AtomicU64,
    entries: Mutex<Vec<(u64, ChangeCallback)>>,
}

/// List of callbacks owned by one element.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Arc<Subscribers>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, callback: ChangeCallback) -> Subscription {
        let id = self.subscribers.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.entries.lock().push((id, callback));
        Subscription {
            subscribers: Arc::downgrade(&self.subscribers),
            id,
        }
    }

    /// Invokes every registered callback.
    ///
    /// Callbacks run on a snapshot taken outside the lock, so they may
    /// subscribe or unsubscribe without deadlocking.
    pub fn notify(&self) {
        let snapshot: Vec<ChangeCallback> = self
            .subscribers
            .entries
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback();
        }
    }

    /// Drops every registered callback. Outstanding handles become inert.
    pub fn clear(&self) {
        self.subscribers.entries.lock().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.entries.lock().len()
    }
}

/// Registration handle; unsubscribes on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    subscribers: Weak<Subscribers>,
    id: u64,
}

impl Subscription {
    /// Handle for elements that never change (nothing to unsubscribe from).
    pub fn inert() -> Self {
        Self {
            subscribers: Weak::new(),
            id: 0,
        }
    }

    /// Unsubscribes now. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.entries.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("live", &(self.subscribers.strong_count() > 0))
            .finish()
    }
}
