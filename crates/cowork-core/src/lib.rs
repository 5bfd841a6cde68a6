//! Core types and utilities for the coworking booking sync layer.
//!
//! This crate provides the foundational types shared by the store and event crates:
//!
//! - **Bookings**: `BookingEvent`, `BookingPatch`
//! - **Memberships**: `MembershipEvent`, `MembershipPatch`, `MembershipStatus`, `BillingCycle`
//! - **Pricing**: `PricingConfig`, `PlanPricing`, `PlanType`, `PricingBreakdown`
//! - **Time**: `MonotonicClock`
//!
//! # Paisa
//!
//! **1 NPR = 100 paisa**
//!
//! - A day pass listed at NPR 500 is stored as `50_000`
//! - One meeting-room hour (NPR 1500) is `150_000`
//! - Stored as `u64` (integer paisa) to avoid floating point precision issues

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod booking;
pub mod clock;
pub mod error;
pub mod ids;
pub mod membership;
pub mod money;
pub mod pricing;

pub use booking::{BookingEvent, BookingPatch};
pub use clock::MonotonicClock;
pub use error::{CoreError, Result};
pub use ids::generate_id;
pub use membership::{BillingCycle, MembershipEvent, MembershipPatch, MembershipStatus};
pub use money::{format_npr, rupees_to_paisa, Paisa, PAISA_PER_RUPEE};
pub use pricing::{
    calculate_price, PlanPricing, PlanType, PricingBreakdown, PricingConfig, SelectedAddOn,
    GUEST_PASS_RATE_PAISA, MEETING_ROOM_HOUR_RATE_PAISA,
};

/// A record persisted in a newest-first collection.
///
/// Identifier uniqueness is the caller's responsibility; collections never deduplicate.
pub trait Record {
    /// The record's identifier.
    fn id(&self) -> &str;
}
