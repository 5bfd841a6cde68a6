//! Booking event store.
//!
//! New bookings are announced on the `booking_new` signal key. Booking updates
//! are persisted but not announced; other tabs pick them up on their next read.

use cowork_core::{BookingEvent, BookingPatch};
use cowork_store::StorageKeys;

use crate::bus::{SignalBus, Subscription};
use crate::signal::Signal;
use crate::store::EventStore;

/// Booking events for one context.
#[derive(Debug)]
pub struct BookingEvents {
    events: EventStore<BookingEvent>,
    new_key: String,
}

impl BookingEvents {
    /// Create the booking store on `bus` using the key names in `keys`.
    #[must_use]
    pub fn new(bus: SignalBus, keys: &StorageKeys) -> Self {
        Self {
            events: EventStore::new(bus, keys.bookings.clone()),
            new_key: keys.booking_new.clone(),
        }
    }

    /// All bookings, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<BookingEvent> {
        self.events.list()
    }

    /// The first booking with identifier `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<BookingEvent> {
        self.events.find(id)
    }

    /// Store `booking` at the front of the collection without announcing it.
    pub fn append(&self, booking: BookingEvent) {
        self.events.append(booking);
    }

    /// Store `booking` and announce it to other contexts.
    ///
    /// Nothing is announced if the booking could not be stored.
    pub fn notify_new(&self, booking: BookingEvent) {
        let id = booking.id.clone();
        match self.events.try_append(booking.clone()) {
            Ok(()) => {
                tracing::debug!(id = %id, "Announcing new booking");
                self.events.signal(&self.new_key, &booking);
            }
            Err(e) => tracing::warn!(id = %id, error = %e, "Dropped new booking"),
        }
    }

    /// Merge `patch` into the booking with identifier `id` and persist it.
    ///
    /// Returns `None` without writing if no booking matches. The update is not
    /// announced to other contexts.
    pub fn update(&self, id: &str, patch: BookingPatch) -> Option<BookingEvent> {
        self.events.update_with(id, |booking| patch.apply(booking))
    }

    /// Overwrite the whole collection.
    pub fn replace_all(&self, bookings: &[BookingEvent]) {
        self.events.replace_all(bookings);
    }

    /// The last booking announced by any context, if it decodes.
    #[must_use]
    pub fn latest_new(&self) -> Option<Signal<BookingEvent>> {
        self.events.latest(&self.new_key)
    }

    /// Call `callback` for every booking another context announces.
    pub fn on_new<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Signal<BookingEvent>) + Send + Sync + 'static,
    {
        self.events.subscribe(&self.new_key, callback)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use cowork_core::booking::status;
    use cowork_store::{MemoryStore, Origin};

    use super::*;

    fn bookings_on(origin: &Arc<Origin>) -> BookingEvents {
        BookingEvents::new(SignalBus::new(origin.context()), &StorageKeys::default())
    }

    fn booking(id: &str) -> BookingEvent {
        BookingEvent::new("Asha", 50_000).with_id(id)
    }

    #[test]
    fn append_order_is_newest_first() {
        let bookings = bookings_on(&Origin::in_memory());
        bookings.append(booking("A"));
        bookings.append(booking("B"));

        let ids: Vec<_> = bookings.list().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn notify_new_persists_and_announces() {
        let origin = Origin::in_memory();
        let tab_a = bookings_on(&origin);
        let tab_b = bookings_on(&origin);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = tab_b.on_new(move |signal| sink.lock().unwrap().push(signal));

        tab_a.notify_new(booking("b1"));
        tab_b.events.bus().drain();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].record.id, "b1");
        assert!(seen[0].timestamp > 0);
        assert_eq!(tab_b.find("b1").unwrap().customer_name, "Asha");
    }

    #[test]
    fn repeated_identical_notifications_get_distinct_timestamps() {
        let origin = Origin::in_memory();
        let tab_a = bookings_on(&origin);
        let tab_b = bookings_on(&origin);
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stamps);
        let _sub = tab_b.on_new(move |signal| sink.lock().unwrap().push(signal.timestamp));

        let same = booking("dup");
        tab_a.notify_new(same.clone());
        tab_a.notify_new(same);
        tab_b.events.bus().drain();

        let stamps = stamps.lock().unwrap();
        assert_eq!(stamps.len(), 2);
        assert!(stamps[1] > stamps[0]);
        assert_eq!(tab_b.list().len(), 2);
    }

    #[test]
    fn update_merges_without_announcing() {
        let origin = Origin::in_memory();
        let tab_a = bookings_on(&origin);
        let tab_b = bookings_on(&origin);
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let _sub = tab_b.on_new(move |_| *counter.lock().unwrap() += 1);

        tab_a.append(booking("b1").with_location_and_plan("Thamel", "Day Pass"));
        let updated = tab_a
            .update("b1", BookingPatch::status(status::CONFIRMED))
            .unwrap();

        assert_eq!(updated.status, status::CONFIRMED);
        assert_eq!(updated.location_name.as_deref(), Some("Thamel"));
        assert_eq!(tab_b.find("b1").unwrap().status, status::CONFIRMED);

        tab_b.events.bus().drain();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn update_missing_id_leaves_collection_untouched() {
        let origin = Origin::in_memory();
        let bookings = bookings_on(&origin);
        bookings.append(booking("b1"));
        let before = origin.store().get("bookings").unwrap();

        assert!(bookings
            .update("nonexistent", BookingPatch::status(status::CANCELLED))
            .is_none());
        assert_eq!(origin.store().get("bookings").unwrap(), before);
    }

    #[test]
    fn failed_store_write_skips_announcement() {
        let backend = Arc::new(MemoryStore::new());
        let origin = Origin::new(backend.clone(), 8);
        let tab_a = bookings_on(&origin);
        let tab_b = bookings_on(&origin);
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        let _sub = tab_b.on_new(move |_| *counter.lock().unwrap() += 1);

        backend.set_offline(true);
        tab_a.notify_new(booking("b1"));
        backend.set_offline(false);

        assert_eq!(tab_b.events.bus().drain(), 0);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(tab_b.list().is_empty());
        assert!(tab_b.latest_new().is_none());
    }

    #[test]
    fn replace_all_overwrites_collection() {
        let bookings = bookings_on(&Origin::in_memory());
        bookings.append(booking("a"));
        bookings.append(booking("b"));

        bookings.replace_all(&[booking("z")]);
        let ids: Vec<_> = bookings.list().into_iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["z"]);
    }
}
