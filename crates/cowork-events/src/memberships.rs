//! Membership event store.
//!
//! New memberships are announced on `membership_new` and updates on
//! `membership_update`. Every update stamps `updated_at` strictly after the
//! record's previous timestamps.

use cowork_core::{MembershipEvent, MembershipPatch};
use cowork_store::StorageKeys;

use crate::bus::{SignalBus, Subscription};
use crate::signal::Signal;
use crate::store::EventStore;

/// Membership events for one context.
#[derive(Debug)]
pub struct MembershipEvents {
    events: EventStore<MembershipEvent>,
    new_key: String,
    update_key: String,
}

impl MembershipEvents {
    /// Create the membership store on `bus` using the key names in `keys`.
    #[must_use]
    pub fn new(bus: SignalBus, keys: &StorageKeys) -> Self {
        Self {
            events: EventStore::new(bus, keys.memberships.clone()),
            new_key: keys.membership_new.clone(),
            update_key: keys.membership_update.clone(),
        }
    }

    /// All memberships, newest first.
    #[must_use]
    pub fn list(&self) -> Vec<MembershipEvent> {
        self.events.list()
    }

    /// The first membership with identifier `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<MembershipEvent> {
        self.events.find(id)
    }

    /// Store `membership` at the front of the collection without announcing it.
    pub fn append(&self, membership: MembershipEvent) {
        self.events.append(membership);
    }

    /// Store `membership` and announce it to other contexts.
    ///
    /// Nothing is announced if the membership could not be stored.
    pub fn notify_new(&self, membership: MembershipEvent) {
        let id = membership.id.clone();
        match self.events.try_append(membership.clone()) {
            Ok(()) => {
                tracing::debug!(id = %id, "Announcing new membership");
                self.events.signal(&self.new_key, &membership);
            }
            Err(e) => tracing::warn!(id = %id, error = %e, "Dropped new membership"),
        }
    }

    /// Merge `patch` into the membership with identifier `id`, stamp
    /// `updated_at`, persist, and announce the merged record.
    ///
    /// Returns `None` without writing or announcing if no membership matches.
    /// If the write fails the merged record is still returned but not announced.
    pub fn update(&self, id: &str, patch: MembershipPatch) -> Option<MembershipEvent> {
        let clock = self.events.bus().clock();
        let (updated, written) = self.events.modify(id, |membership| {
            let stamp = clock.now_after(membership.last_modified());
            patch.apply(membership, stamp);
        })?;

        if written.is_ok() {
            tracing::debug!(id = %id, status = %updated.status, "Announcing membership update");
            self.events.signal(&self.update_key, &updated);
        }
        Some(updated)
    }

    /// Overwrite the whole collection.
    pub fn replace_all(&self, memberships: &[MembershipEvent]) {
        self.events.replace_all(memberships);
    }

    /// The last membership announced as new by any context, if it decodes.
    #[must_use]
    pub fn latest_new(&self) -> Option<Signal<MembershipEvent>> {
        self.events.latest(&self.new_key)
    }

    /// The last membership update announced by any context, if it decodes.
    #[must_use]
    pub fn latest_update(&self) -> Option<Signal<MembershipEvent>> {
        self.events.latest(&self.update_key)
    }

    /// Call `callback` for every membership another context announces as new.
    pub fn on_new<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Signal<MembershipEvent>) + Send + Sync + 'static,
    {
        self.events.subscribe(&self.new_key, callback)
    }

    /// Call `callback` for every membership update another context announces.
    pub fn on_updated<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Signal<MembershipEvent>) + Send + Sync + 'static,
    {
        self.events.subscribe(&self.update_key, callback)
    }
}
