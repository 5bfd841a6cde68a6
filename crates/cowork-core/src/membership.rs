//! Membership event records.
//!
//! Membership events track a subscription's lifecycle: created through a
//! "notify new" call, then mutated through partial updates. They are never
//! deleted individually; the whole collection can only be overwritten.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::ids::generate_id;
use crate::money::Paisa;
use crate::Record;

/// A membership subscription lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipEvent {
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

    /// Free-form membership type tag (e.g. "hot_desk").
    pub membership_type: String,

    /// Lifecycle status.
    pub status: MembershipStatus,

    /// First day of the membership.
    pub start_date: NaiveDate,

    /// Last day of the membership.
    pub end_date: NaiveDate,

    /// Amount in paisa.
    pub amount: Paisa,

    /// How often the membership is billed.
    pub billing_cycle: BillingCycle,

    /// Location the membership is tied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    /// Whether the membership renews automatically.
    #[serde(default)]
    pub auto_renew: bool,

    /// When the record was created.
    pub created_at: DateTime<Utc>,

    /// When the record was last updated. Set by the store, never by callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Free-form admin notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl MembershipEvent {
    /// Create a new pending membership with a generated id.
    #[must_use]
    pub fn new(
        customer_name: impl Into<String>,
        membership_type: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        amount: Paisa,
        billing_cycle: BillingCycle,
    ) -> Self {
        Self {
            id: generate_id("ms"),
            customer_name: customer_name.into(),
            email: None,
            phone: None,
            membership_type: membership_type.into(),
            status: MembershipStatus::Pending,
            start_date,
            end_date,
            amount,
            billing_cycle,
            location_id: None,
            auto_renew: false,
            created_at: Utc::now(),
            updated_at: None,
            notes: None,
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

    /// Set the location.
    #[must_use]
    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    /// Set the auto-renew flag.
    #[must_use]
    pub fn with_auto_renew(mut self, auto_renew: bool) -> Self {
        self.auto_renew = auto_renew;
        self
    }

    /// The most recent of `created_at` and `updated_at`.
    #[must_use]
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at
            .map_or(self.created_at, |updated| updated.max(self.created_at))
    }
}

impl Record for MembershipEvent {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A partial update to a membership. `None` fields are left untouched.
///
/// The identifier and timestamps are not patchable; the store stamps
/// `updated_at` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MembershipPatch {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New membership type.
    pub membership_type: Option<String>,
    /// New status.
    pub status: Option<MembershipStatus>,
    /// New start date.
    pub start_date: Option<NaiveDate>,
    /// New end date.
    pub end_date: Option<NaiveDate>,
    /// New amount in paisa.
    pub amount: Option<Paisa>,
    /// New billing cycle.
    pub billing_cycle: Option<BillingCycle>,
    /// New location.
    pub location_id: Option<String>,
    /// New auto-renew flag.
    pub auto_renew: Option<bool>,
    /// New notes.
    pub notes: Option<String>,
}

impl MembershipPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub fn status(status: MembershipStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge the patch into `membership` and stamp `updated_at`.
    pub fn apply(self, membership: &mut MembershipEvent, updated_at: DateTime<Utc>) {
        if let Some(customer_name) = self.customer_name {
            membership.customer_name = customer_name;
        }
        if let Some(email) = self.email {
            membership.email = Some(email);
        }
        if let Some(phone) = self.phone {
            membership.phone = Some(phone);
        }
        if let Some(membership_type) = self.membership_type {
            membership.membership_type = membership_type;
        }
        if let Some(status) = self.status {
            membership.status = status;
        }
        if let Some(start_date) = self.start_date {
            membership.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            membership.end_date = end_date;
        }
        if let Some(amount) = self.amount {
            membership.amount = amount;
        }
        if let Some(billing_cycle) = self.billing_cycle {
            membership.billing_cycle = billing_cycle;
        }
        if let Some(location_id) = self.location_id {
            membership.location_id = Some(location_id);
        }
        if let Some(auto_renew) = self.auto_renew {
            membership.auto_renew = auto_renew;
        }
        if let Some(notes) = self.notes {
            membership.notes = Some(notes);
        }
        membership.updated_at = Some(updated_at);
    }
}

/// Membership lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Membership is in effect.
    Active,
    /// The end date has passed.
    Expired,
    /// Cancelled before the end date.
    Cancelled,
    /// Awaiting payment or confirmation.
    Pending,
    /// Temporarily suspended by an admin.
    Suspended,
}

impl MembershipStatus {
    /// Get the status as its wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            "pending" => Ok(Self::Pending),
            "suspended" => Ok(Self::Suspended),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

/// How often a membership is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    /// Billed per day.
    Daily,
    /// Billed per month.
    Monthly,
    /// Billed per year.
    Annual,
}

impl BillingCycle {
    /// Get the billing cycle as its wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            other => Err(CoreError::InvalidBillingCycle(other.to_string())),
        }
    }
}
