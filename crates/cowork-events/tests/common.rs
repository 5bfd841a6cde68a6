//! Common test utilities for cowork-events integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use cowork_core::{BillingCycle, BookingEvent, MembershipEvent};
use cowork_events::{Signal, Tab};
use cowork_store::{KeyValueStore, MemoryStore, Origin, StorageKeys};

/// Two tabs sharing one in-memory origin.
pub struct TestHarness {
    /// The raw backing store, for inspecting or corrupting persisted state.
    pub store: Arc<MemoryStore>,
    /// The shared origin.
    pub origin: Arc<Origin>,
    /// Key layout used by both tabs.
    pub keys: StorageKeys,
    /// The tab a customer books from.
    pub customer: Tab,
    /// The admin panel tab.
    pub admin: Tab,
}

impl TestHarness {
    /// Create a harness with a fresh store.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }

    /// Create a harness over a specific store (e.g. one with a quota).
    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let origin = Origin::new(store.clone(), 64);
        let keys = StorageKeys::default();
        let customer = Tab::open(&origin, &keys);
        let admin = Tab::open(&origin, &keys);
        Self {
            store,
            origin,
            keys,
            customer,
            admin,
        }
    }

    /// Open one more tab on the same origin.
    pub fn open_tab(&self) -> Tab {
        Tab::open(&self.origin, &self.keys)
    }

    /// The raw persisted value at `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.store.get(key).expect("memory store read")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// A booking with a fixed id.
pub fn booking(id: &str) -> BookingEvent {
    BookingEvent::new("Asha Gurung", 50_000)
        .with_id(id)
        .with_location_and_plan("Jhamsikhel", "Day Pass")
}

/// A pending monthly membership with a fixed id.
pub fn membership(id: &str) -> MembershipEvent {
    MembershipEvent::new(
        "Sita Rai",
        "hot_desk",
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"),
        1_500_000,
        BillingCycle::Monthly,
    )
    .with_id(id)
}

/// Collects every signal a subscription receives.
pub type Received<T> = Arc<Mutex<Vec<Signal<T>>>>;

/// A callback that pushes signals into a shared vector.
pub fn collector<T: Send + 'static>() -> (Received<T>, impl Fn(Signal<T>) + Send + Sync + 'static)
{
    let received: Received<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    (received, move |signal| {
        sink.lock().expect("collector lock").push(signal);
    })
}
