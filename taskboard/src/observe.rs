//! Change notification and in-flight tracking shared by both stores.
//!
//! Listeners are called synchronously with the new state snapshot, outside
//! of any store lock, so a listener may read the store again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Registry of state listeners.
pub struct Listeners<S> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(SubscriptionId, Listener<S>)>>,
}

impl<S> Default for Listeners<S> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            entries: Mutex::new(Vec::new()),
        }
    }
}

impl<S> Listeners<S> {
    /// Registers `listener`; it runs after every state change.
    pub fn subscribe(&self, listener: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, Arc::new(listener)));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Calls every listener with `state`, in subscription order.
    pub fn notify(&self, state: &S) {
        let listeners: Vec<Listener<S>> = self
            .entries
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    /// Drops every listener.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counts operations currently in flight on a store.
#[derive(Debug, Default)]
pub struct Activity {
    in_flight: AtomicUsize,
}

impl Activity {
    /// Whether any operation is running.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Marks an operation as started. When the returned guard drops and no
    /// other operation is running, `on_idle` is called.
    pub fn begin<F: Fn()>(&self, on_idle: F) -> ActivityGuard<'_, F> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        ActivityGuard {
            activity: self,
            on_idle,
        }
    }
}

/// Keeps its [`Activity`] busy until dropped.
pub struct ActivityGuard<'a, F: Fn()> {
    activity: &'a Activity,
    on_idle: F,
}

impl<F: Fn()> Drop for ActivityGuard<'_, F> {
    fn drop(&mut self) {
        if self.activity.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            (self.on_idle)();
        }
    }
}
