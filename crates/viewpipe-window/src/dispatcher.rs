//! Named-event observer registry.
//!
//! Listeners are kept in registration order. `emit` snapshots the listeners
//! for a name, releases the lock, and calls them one by one, so a listener
//! may register or remove listeners (including itself) while an emission is
//! in flight. A listener removed before its turn is skipped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// Callback invoked with the event payload, if the event carried one.
pub type Listener = Arc<dyn Fn(Option<&Value>) + Send + Sync>;

/// Handle returned by [`Dispatcher::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    name: String,
    listener: Listener,
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<Entry>,
}

#[derive(Default)]
pub struct Dispatcher {
    listeners: Mutex<Listeners>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for events named `name`.
    pub fn on<F>(&self, name: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(Option<&Value>) + Send + Sync + 'static,
    {
        let mut listeners = self.lock();
        let id = ListenerId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push(Entry {
            id,
            name: name.into(),
            listener: Arc::new(listener),
        });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.entries.len();
        listeners.entries.retain(|e| e.id != id);
        listeners.entries.len() != before
    }

    /// Call every listener registered for `name`, in registration order.
    ///
    /// Returns how many listeners were called.
    pub fn emit(&self, name: &str, payload: Option<&Value>) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .lock()
            .entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| (e.id, Arc::clone(&e.listener)))
            .collect();

        let mut called = 0;
        for (id, listener) in snapshot {
            if !self.contains(id) {
                continue;
            }
            listener(payload);
            called += 1;
        }
        called
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.lock().entries.iter().filter(|e| e.name == name).count()
    }

    /// Drop every listener.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn contains(&self, id: ListenerId) -> bool {
        self.lock().entries.iter().any(|e| e.id == id)
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
