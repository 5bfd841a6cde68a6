//! Shared origin and per-tab contexts.
//!
//! An [`Origin`] is one backing store shared by several execution contexts (tabs,
//! windows, worker tasks). Each [`Context`] reads and writes through the origin;
//! every write that changes a value is published as a [`StorageEvent`] on a
//! broadcast channel. A context's [`StorageListener`] filters out the events it
//! caused itself, so a tab never observes its own writes, only other tabs' writes.
//!
//! Writes through contexts are serialized per origin, so change events are
//! published in the order the store applied them and the last event for a key
//! always carries the key's current value.
//!
//! Delivery is at-most-once: a listener created after a write never sees it, and
//! a listener that falls more than the channel capacity behind loses the oldest
//! events.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use uuid::Uuid;

use crate::error::Result;
use crate::memory::MemoryStore;
use crate::KeyValueStore;

/// Default number of undelivered events a listener may fall behind by.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Identifies one execution context sharing an origin.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextId({})", self.0)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A change made to one key by one context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// Value before the change.
    pub old_value: Option<String>,
    /// Value after the change; `None` when the key was removed.
    pub new_value: Option<String>,
    /// The context that made the change.
    pub source: ContextId,
}

/// One backing store shared by many contexts.
pub struct Origin {
    store: Arc<dyn KeyValueStore>,
    changes: broadcast::Sender<StorageEvent>,
    // Held across read, write and publish.
    writes: Mutex<()>,
}

impl Origin {
    /// Create an origin over `store`.
    ///
    /// `channel_capacity` bounds how far a listener may lag before it starts
    /// losing events; zero is treated as one.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, channel_capacity: usize) -> Arc<Self> {
        let (changes, _rx) = broadcast::channel(channel_capacity.max(1));
        Arc::new(Self {
            store,
            changes,
            writes: Mutex::new(()),
        })
    }

    /// Create an origin over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Arc<Self> {
        Self::new(Arc::new(MemoryStore::new()), DEFAULT_CHANNEL_CAPACITY)
    }

    /// Open a new context on this origin.
    #[must_use]
    pub fn context(self: &Arc<Self>) -> Context {
        let id = ContextId::generate();
        tracing::trace!(context = %id, "Opened storage context");
        Context {
            id,
            origin: Arc::clone(self),
        }
    }

    /// The raw backing store. Writes made here bypass change notification.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: StorageEvent) {
        // Sending only fails when nobody is listening, which is fine.
        let _ = self.changes.send(event);
    }
}

impl fmt::Debug for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Origin")
            .field("listeners", &self.changes.receiver_count())
            .finish_non_exhaustive()
    }
}

/// One execution context's handle on an [`Origin`].
#[derive(Clone)]
pub struct Context {
    id: ContextId,
    origin: Arc<Origin>,
}

impl Context {
    /// This context's identifier.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// The origin this context belongs to.
    #[must_use]
    pub fn origin(&self) -> &Arc<Origin> {
        &self.origin
    }

    /// Read the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.origin.store.get(key)
    }

    /// Write `value` at `key` and announce the change to other contexts.
    ///
    /// Writing the value that is already stored announces nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; nothing is announced in that case.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.origin.write_guard();
        let old_value = self.origin.store.get(key).ok().flatten();
        self.origin.store.set(key, value)?;

        if old_value.as_deref() != Some(value) {
            self.origin.publish(StorageEvent {
                key: key.to_string(),
                old_value,
                new_value: Some(value.to_string()),
                source: self.id,
            });
        }
        Ok(())
    }

    /// Remove `key` and announce the removal to other contexts.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.origin.write_guard();
        let old_value = self.origin.store.get(key).ok().flatten();
        self.origin.store.remove(key)?;

        if old_value.is_some() {
            self.origin.publish(StorageEvent {
                key: key.to_string(),
                old_value,
                new_value: None,
                source: self.id,
            });
        }
        Ok(())
    }

    /// Start receiving changes made by other contexts from now on.
    #[must_use]
    pub fn listen(&self) -> StorageListener {
        StorageListener {
            receiver: self.origin.changes.subscribe(),
            own: self.id,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context").field("id", &self.id).finish()
    }
}

/// Receives the storage events caused by other contexts.
#[derive(Debug)]
pub struct StorageListener {
    receiver: broadcast::Receiver<StorageEvent>,
    own: ContextId,
}

impl StorageListener {
    /// The next queued foreign event, without waiting.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.source == self.own => {}
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(missed)) => self.lagged(missed),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the next foreign event. Returns `None` once the origin is gone.
    pub async fn next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.source == self.own => {}
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => self.lagged(missed),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn lagged(&self, missed: u64) {
        tracing::warn!(
            context = %self.own,
            missed,
            "Storage listener fell behind; dropped oldest change events"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    #[test]
    fn writer_does_not_see_its_own_change() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let tab_b = origin.context();
        let mut listener_a = tab_a.listen();
        let mut listener_b = tab_b.listen();

        tab_a.set_item("k", "v").unwrap();

        assert!(listener_a.try_next().is_none());
        let event = listener_b.try_next().unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.old_value, None);
        assert_eq!(event.new_value.as_deref(), Some("v"));
        assert_eq!(event.source, tab_a.id());
        assert!(listener_b.try_next().is_none());
    }

    #[test]
    fn writes_are_visible_immediately_to_every_context() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let tab_b = origin.context();

        tab_a.set_item("k", "v").unwrap();
        assert_eq!(tab_a.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(tab_b.get_item("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn unchanged_value_is_not_announced() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let mut listener_b = origin.context().listen();

        tab_a.set_item("k", "v").unwrap();
        tab_a.set_item("k", "v").unwrap();

        assert!(listener_b.try_next().is_some());
        assert!(listener_b.try_next().is_none());
    }

    #[test]
    fn removal_is_announced_with_old_value() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let mut listener_b = origin.context().listen();

        tab_a.remove_item("missing").unwrap();
        tab_a.set_item("k", "v").unwrap();
        tab_a.remove_item("k").unwrap();

        let _set = listener_b.try_next().unwrap();
        let removed = listener_b.try_next().unwrap();
        assert_eq!(removed.old_value.as_deref(), Some("v"));
        assert_eq!(removed.new_value, None);
        assert!(listener_b.try_next().is_none());
    }

    #[test]
    fn late_listener_misses_earlier_writes() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let tab_b = origin.context();

        tab_a.set_item("k", "1").unwrap();
        let mut listener_b = tab_b.listen();
        assert!(listener_b.try_next().is_none());

        // The value itself is still readable on demand.
        assert_eq!(tab_b.get_item("k").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn lagging_listener_keeps_latest_events() {
        let origin = Origin::new(Arc::new(MemoryStore::new()), 2);
        let tab_a = origin.context();
        let mut listener_b = origin.context().listen();

        for i in 0..5 {
            tab_a.set_item("k", &i.to_string()).unwrap();
        }

        let values: Vec<_> = std::iter::from_fn(|| listener_b.try_next())
            .filter_map(|e| e.new_value)
            .collect();
        assert_eq!(values, vec!["3", "4"]);
    }

    #[test]
    fn failed_write_is_not_announced() {
        let origin = Origin::new(Arc::new(MemoryStore::with_quota(4)), 8);
        let tab_a = origin.context();
        let mut listener_b = origin.context().listen();

        let err = tab_a.set_item("key", "too long").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert!(listener_b.try_next().is_none());
    }

    #[test]
    fn concurrent_writers_publish_in_store_order() {
        const ROUNDS: usize = 500;

        let origin = Origin::new(Arc::new(MemoryStore::new()), 4 * ROUNDS);
        let mut listener = origin.context().listen();
        let barrier = Arc::new(std::sync::Barrier::new(3));

        let writers: Vec<_> = ["a", "b", "remove"]
            .into_iter()
            .map(|name| {
                let context = origin.context();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    for round in 0..ROUNDS {
                        if name == "remove" {
                            context.remove_item("sig").unwrap();
                        } else {
                            context.set_item("sig", &format!("{name}-{round}")).unwrap();
                        }
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        // Each event starts from the value the previous one left behind.
        let mut current = None;
        while let Some(event) = listener.try_next() {
            assert_eq!(event.old_value, current);
            current = event.new_value;
        }
        assert_eq!(current, origin.store().get("sig").unwrap());
    }

    #[tokio::test]
    async fn async_listener_receives_foreign_writes() {
        let origin = Origin::in_memory();
        let tab_a = origin.context();
        let mut listener_b = origin.context().listen();

        let writer = tokio::spawn(async move {
            tab_a.set_item("k", "from a").unwrap();
        });

        let event = listener_b.next().await.unwrap();
        assert_eq!(event.new_value.as_deref(), Some("from a"));
        writer.await.unwrap();
    }
}
