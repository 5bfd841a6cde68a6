//! Booking event records.
//!
//! A booking event is a customer's reservation request as surfaced to the admin
//! panel and the notification layer. The authoritative booking lives in the hosted
//! database; this record is the local, best-effort copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::generate_id;
use crate::money::Paisa;
use crate::Record;

/// Well-known booking status values. The status field itself is free-form.
pub mod status {
    /// Awaiting confirmation.
    pub const PENDING: &str = "pending";
    /// Confirmed by an admin.
    pub const CONFIRMED: &str = "confirmed";
    /// Cancelled by the customer or an admin.
    pub const CANCELLED: &str = "cancelled";
    /// The booked period has passed.
    pub const COMPLETED: &str = "completed";
}

/// A customer's reservation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingEvent {
    /// Unique identifier (uniqueness is the caller's responsibility).
    pub id: String,

    /// Customer display name.
    pub customer_name: String,

    /// Customer email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Customer phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Name of the booked location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,

    /// Name of the booked plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,

    /// Amount in paisa.
    pub amount: Paisa,

    /// Free-form status, see [`status`].
    pub status: String,

    /// When the booking was created.
    pub created_at: DateTime<Utc>,
}

impl BookingEvent {
    /// Create a new pending booking with a generated id.
    #[must_use]
    pub fn new(customer_name: impl Into<String>, amount: Paisa) -> Self {
        Self {
            id: generate_id("bk"),
            customer_name: customer_name.into(),
            email: None,
            phone: None,
            location_name: None,
            plan_name: None,
            amount,
            status: status::PENDING.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the contact details.
    #[must_use]
    pub fn with_contact(mut self, email: Option<String>, phone: Option<String>) -> Self {
        self.email = email;
        self.phone = phone;
        self
    }

    /// Set the location and plan names.
    #[must_use]
    pub fn with_location_and_plan(
        mut self,
        location_name: impl Into<String>,
        plan_name: impl Into<String>,
    ) -> Self {
        self.location_name = Some(location_name.into());
        self.plan_name = Some(plan_name.into());
        self
    }

    /// Set the status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }
}

impl Record for BookingEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A partial update to a booking. `None` fields are left untouched.
///
/// The identifier and creation time are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingPatch {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New location name.
    pub location_name: Option<String>,
    /// New plan name.
    pub plan_name: Option<String>,
    /// New amount in paisa.
    pub amount: Option<Paisa>,
    /// New status.
    pub status: Option<String>,
}

impl BookingPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    /// Merge the patch into `booking`.
    pub fn apply(self, booking: &mut BookingEvent) {
        if let Some(customer_name) = self.customer_name {
            booking.customer_name = customer_name;
        }
        if let Some(email) = self.email {
            booking.email = Some(email);
        }
        if let Some(phone) = self.phone {
            booking.phone = Some(phone);
        }
        if let Some(location_name) = self.location_name {
            booking.location_name = Some(location_name);
        }
        if let Some(plan_name) = self.plan_name {
            booking.plan_name = Some(plan_name);
        }
        if let Some(amount) = self.amount {
            booking.amount = amount;
        }
        if let Some(status) = self.status {
            booking.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_booking_is_pending() {
        let booking = BookingEvent::new("Asha", 50_000);
        assert!(booking.id.starts_with("bk_"));
        assert_eq!(booking.status, status::PENDING);
        assert_eq!(booking.amount, 50_000);
        assert!(booking.email.is_none());
    }

    #[test]
    fn serializes_camel_case_and_skips_empty_optionals() {
        let booking = BookingEvent::new("Asha", 50_000).with_id("b1");
        let json = serde_json::to_value(&booking).unwrap();

        assert_eq!(json["id"], "b1");
        assert_eq!(json["customerName"], "Asha");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("email").is_none());
        assert!(json.get("locationName").is_none());
    }

    #[test]
    fn deserializes_record_without_optionals() {
        let json = r#"{
            "id": "b9",
            "customerName": "Bikash",
            "amount": 150000,
            "status": "confirmed",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        let booking: BookingEvent = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, "b9");
        assert_eq!(booking.status, status::CONFIRMED);
        assert!(booking.plan_name.is_none());
    }

    #[test]
    fn patch_merges_only_present_fields() {
        let mut booking = BookingEvent::new("Asha", 50_000)
            .with_location_and_plan("Thamel", "Day Pass");
        let original = booking.clone();

        BookingPatch::status(status::CANCELLED).apply(&mut booking);

        assert_eq!(booking.status, status::CANCELLED);
        assert_eq!(booking.customer_name, original.customer_name);
        assert_eq!(booking.location_name, original.location_name);
        assert_eq!(booking.amount, original.amount);
        assert_eq!(booking.created_at, original.created_at);
    }

    #[test]
    fn negative_amount_is_rejected_on_decode() {
        let json = r#"{
            "id": "b1",
            "customerName": "X",
            "amount": -5,
            "status": "pending",
            "createdAt": "2024-05-01T10:00:00Z"
        }"#;
        assert!(serde_json::from_str::<BookingEvent>(json).is_err());
    }
}
