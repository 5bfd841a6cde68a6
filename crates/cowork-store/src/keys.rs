//! Storage key layout.
//!
//! Each domain collection lives under one key, and each notification channel has
//! its own signal key carrying only the latest broadcast payload.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Default key for the booking collection.
pub const BOOKINGS: &str = "bookings";
/// Default signal key for new bookings.
pub const BOOKING_NEW: &str = "booking_new";
/// Default key for the membership collection.
pub const MEMBERSHIPS: &str = "memberships";
/// Default signal key for new memberships.
pub const MEMBERSHIP_NEW: &str = "membership_new";
/// Default signal key for updated memberships.
pub const MEMBERSHIP_UPDATE: &str = "membership_update";

/// The names of every key the sync layer reads or writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    /// Booking collection.
    pub bookings: String,
    /// Signal key for new bookings.
    pub booking_new: String,
    /// Membership collection.
    pub memberships: String,
    /// Signal key for new memberships.
    pub membership_new: String,
    /// Signal key for updated memberships.
    pub membership_update: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            bookings: BOOKINGS.into(),
            booking_new: BOOKING_NEW.into(),
            memberships: MEMBERSHIPS.into(),
            membership_new: MEMBERSHIP_NEW.into(),
            membership_update: MEMBERSHIP_UPDATE.into(),
        }
    }
}

impl StorageKeys {
    /// Prefix every key, e.g. to run two independent layouts in one store.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        let base = Self::default();
        Self {
            bookings: format!("{prefix}{}", base.bookings),
            booking_new: format!("{prefix}{}", base.booking_new),
            memberships: format!("{prefix}{}", base.memberships),
            membership_new: format!("{prefix}{}", base.membership_new),
            membership_update: format!("{prefix}{}", base.membership_update),
        }
    }

    /// All keys in a fixed order.
    #[must_use]
    pub fn all(&self) -> [&str; 5] {
        [
            self.bookings.as_str(),
            self.booking_new.as_str(),
            self.memberships.as_str(),
            self.membership_new.as_str(),
            self.membership_update.as_str(),
        ]
    }

    /// Check that every key is non-empty and distinct.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidKeys` naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let all = self.all();
        for (i, key) in all.iter().enumerate() {
            if key.trim().is_empty() {
                return Err(StoreError::InvalidKeys("empty key".into()));
            }
            if all[..i].contains(key) {
                return Err(StoreError::InvalidKeys(format!("duplicate key: {key}")));
            }
        }
        Ok(())
    }
}
