//! Newest-first record collections with change signals.
//!
//! [`EventStore`] is the shape shared by the booking and membership stores: a
//! collection persisted under one key, plus helpers to broadcast and subscribe to
//! signals carrying single records.
//!
//! Every mutation is a read-modify-write of the whole collection with no locking.
//! When two contexts write concurrently the later write wins and the earlier
//! change is lost.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use cowork_core::Record;
use cowork_store::{collection, Result};

use crate::bus::{SignalBus, Subscription};
use crate::signal::Signal;

/// A newest-first collection of `T` stored under one key.
pub struct EventStore<T> {
    bus: SignalBus,
    key: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> EventStore<T>
where
    T: Record + Serialize + DeserializeOwned + 'static,
{
    /// Create a store for the collection at `key`.
    #[must_use]
    pub fn new(bus: SignalBus, key: impl Into<String>) -> Self {
        Self {
            bus,
            key: key.into(),
            _record: PhantomData,
        }
    }

    /// The collection key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The bus this store signals on.
    #[must_use]
    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// All records, newest first. Unreadable storage reads as empty.
    #[must_use]
    pub fn list(&self) -> Vec<T> {
        collection::read_collection(self.bus.context(), &self.key)
    }

    /// The first record with identifier `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<T> {
        self.list().into_iter().find(|record| record.id() == id)
    }

    /// Insert `record` at the front of the collection.
    ///
    /// Duplicate identifiers are not detected.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    pub fn try_append(&self, record: T) -> Result<()> {
        let mut records = self.list();
        records.insert(0, record);
        collection::try_write_collection(self.bus.context(), &self.key, &records)
    }

    /// Insert `record` at the front of the collection, dropping write failures.
    pub fn append(&self, record: T) {
        if let Err(e) = self.try_append(record) {
            tracing::warn!(key = %self.key, error = %e, "Dropped record append");
        }
    }

    /// Apply `mutate` to the first record with identifier `id`, then persist.
    ///
    /// Returns `None` without writing anything if no record matches. Otherwise
    /// returns the mutated record and the outcome of the write.
    pub(crate) fn modify<F>(&self, id: &str, mutate: F) -> Option<(T, Result<()>)>
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        let mut records = self.list();
        let record = records.iter_mut().find(|record| record.id() == id)?;
        mutate(record);
        let updated = record.clone();

        let written = collection::try_write_collection(self.bus.context(), &self.key, &records);
        if let Err(e) = &written {
            tracing::warn!(key = %self.key, id = %id, error = %e, "Dropped record update");
        }
        Some((updated, written))
    }

    /// Apply `mutate` to the first record with identifier `id` and persist it.
    ///
    /// Returns `None` without writing anything if no record matches.
    pub fn update_with<F>(&self, id: &str, mutate: F) -> Option<T>
    where
        F: FnOnce(&mut T),
        T: Clone,
    {
        self.modify(id, mutate).map(|(updated, _)| updated)
    }

    /// Overwrite the whole collection with `records`, dropping write failures.
    pub fn replace_all(&self, records: &[T]) {
        collection::write_collection(self.bus.context(), &self.key, records);
    }

    /// Broadcast `record` on `signal_key` with a fresh dispatch timestamp.
    pub fn signal(&self, signal_key: &str, record: &T) {
        let timestamp = self.bus.clock().now_millis();
        self.bus.broadcast(signal_key, &Signal::new(record, timestamp));
    }

    /// The last payload broadcast on `signal_key`, if it decodes.
    #[must_use]
    pub fn latest(&self, signal_key: &str) -> Option<Signal<T>> {
        collection::read_value(self.bus.context(), signal_key)
    }

    /// Call `callback` with every decodable signal another context broadcasts on
    /// `signal_key`.
    pub fn subscribe<F>(&self, signal_key: &str, callback: F) -> Subscription
    where
        F: Fn(Signal<T>) + Send + Sync + 'static,
    {
        let key = signal_key.to_string();
        self.bus
            .on_change(signal_key, move |raw| match serde_json::from_str::<Signal<T>>(raw) {
                Ok(signal) => callback(signal),
                Err(e) => tracing::debug!(key = %key, error = %e, "Ignoring undecodable signal"),
            })
    }
}

impl<T> fmt::Debug for EventStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStore")
            .field("key", &self.key)
            .field("bus", &self.bus)
            .finish()
    }
}
