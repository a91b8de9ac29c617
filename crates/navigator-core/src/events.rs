//! Vault mutation events.
//!
//! Hosts publish a `VaultEvent` on their `EventBus` after every trash or
//! rename. Subscribers hold a `Subscription`; dropping it unsubscribes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

/// A completed tree mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// An entry was renamed or moved.
    Renamed {
        /// New path.
        path: String,
        /// Path before the rename.
        old_path: String,
    },
    /// An entry was trashed or deleted.
    Deleted { path: String },
}

/// Live registration on an `EventBus`. Dropping it removes the callback.
pub struct Subscription {
    bus: Weak<EventBus>,
    id: usize,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.id);
        }
    }
}

type Callback = Arc<dyn Fn(&VaultEvent) + Send + Sync>;

/// Fan-out of `VaultEvent`s to callbacks. Subscribing needs an `Arc<EventBus>`.
#[derive(Default)]
pub struct EventBus {
    callbacks: RwLock<Vec<(usize, Callback)>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for every later event.
    pub fn subscribe(
        self: &Arc<Self>,
        callback: impl Fn(&VaultEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.callbacks
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(callback)));
        Subscription {
            bus: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: usize) {
        // try_write: Drop may run during unwinding while emit holds a read lock
        if let Ok(mut guard) = self.callbacks.try_write() {
            guard.retain(|(i, _)| *i != id);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// Deliver `event` to each callback, in subscription order.
    pub fn emit(&self, event: VaultEvent) {
        // Clone the list so a callback may subscribe without deadlocking
        let callbacks: Vec<Callback> = self
            .callbacks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in callbacks {
            callback(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn subscribers_receive_events() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
        bus.emit(VaultEvent::Deleted {
            path: "a.md".to_string(),
        });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![VaultEvent::Deleted {
                path: "a.md".to_string()
            }]
        );
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = Arc::new(EventBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let sub = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.subscriber_count(), 1);

        drop(sub);
        assert_eq!(bus.subscriber_count(), 0);

        bus.emit(VaultEvent::Deleted {
            path: "a.md".to_string(),
        });
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus = Arc::new(EventBus::new());
        let sub = bus.subscribe(|_| {});
        drop(bus);
        drop(sub);
    }
}
