//! One execution context's full view of the sync layer.

use std::sync::Arc;

use cowork_store::{Origin, StorageKeys};

use crate::bookings::BookingEvents;
use crate::bus::SignalBus;
use crate::memberships::MembershipEvents;

/// A tab: one context on a shared origin with its bus and both event stores.
#[derive(Debug)]
pub struct Tab {
    bus: SignalBus,
    bookings: BookingEvents,
    memberships: MembershipEvents,
}

impl Tab {
    /// Open a new tab on `origin`.
    #[must_use]
    pub fn open(origin: &Arc<Origin>, keys: &StorageKeys) -> Self {
        let bus = SignalBus::new(origin.context());
        tracing::debug!(context = %bus.context().id(), "Opened tab");
        Self {
            bookings: BookingEvents::new(bus.clone(), keys),
            memberships: MembershipEvents::new(bus.clone(), keys),
            bus,
        }
    }

    /// The tab's notification bus.
    #[must_use]
    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Booking events.
    #[must_use]
    pub fn bookings(&self) -> &BookingEvents {
        &self.bookings
    }

    /// Membership events.
    #[must_use]
    pub fn memberships(&self) -> &MembershipEvents {
        &self.memberships
    }

    /// Dispatch every change other tabs made since the last call.
    pub fn sync(&self) -> usize {
        self.bus.drain()
    }
}
