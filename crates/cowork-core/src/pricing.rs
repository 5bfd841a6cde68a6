//! Pricing for coworking plans.
//!
//! This module computes the price breakdown shown during booking configuration.
//! Every page that displays a price goes through [`PricingConfig::calculate`] so
//! that identical selections always show identical amounts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::money::Paisa;

/// Meeting room rate per hour in paisa (NPR 1500).
pub const MEETING_ROOM_HOUR_RATE_PAISA: Paisa = 150_000;

/// Guest pass rate per pass in paisa (NPR 600).
pub const GUEST_PASS_RATE_PAISA: Paisa = 60_000;

/// Rates for the variable-quantity extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Price per meeting room hour in paisa.
    pub meeting_room_hour_rate: Paisa,

    /// Price per guest pass in paisa.
    pub guest_pass_rate: Paisa,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            meeting_room_hour_rate: MEETING_ROOM_HOUR_RATE_PAISA,
            guest_pass_rate: GUEST_PASS_RATE_PAISA,
        }
    }
}

impl PricingConfig {
    /// Compute the price breakdown for a plan selection.
    ///
    /// A day pass is charged at the plan's daily price, every other plan type at
    /// the monthly price; a missing price counts as zero. Meeting room hours and
    /// guest passes only contribute when the count is positive, so negative
    /// counts add nothing rather than subtracting.
    #[must_use]
    pub fn calculate(
        &self,
        plan_pricing: &PlanPricing,
        plan_type: PlanType,
        selected_add_ons: &[SelectedAddOn],
        meeting_room_hours: i64,
        guest_passes: i64,
    ) -> PricingBreakdown {
        let base_price = plan_pricing.base_price(plan_type);

        let add_ons_price = selected_add_ons
            .iter()
            .fold(0, |sum: Paisa, add_on| sum.saturating_add(add_on.price));

        let meeting_room_hours_price = quantity_price(meeting_room_hours, self.meeting_room_hour_rate);
        let guest_passes_price = quantity_price(guest_passes, self.guest_pass_rate);

        PricingBreakdown::new(
            base_price,
            add_ons_price,
            meeting_room_hours_price,
            guest_passes_price,
        )
    }
}

/// Compute a price breakdown with the default rates.
#[must_use]
pub fn calculate_price(
    plan_pricing: &PlanPricing,
    plan_type: PlanType,
    selected_add_ons: &[SelectedAddOn],
    meeting_room_hours: i64,
    guest_passes: i64,
) -> PricingBreakdown {
    PricingConfig::default().calculate(
        plan_pricing,
        plan_type,
        selected_add_ons,
        meeting_room_hours,
        guest_passes,
    )
}

fn quantity_price(count: i64, rate: Paisa) -> Paisa {
    if count > 0 {
        u64::try_from(count).map_or(Paisa::MAX, |count| count.saturating_mul(rate))
    } else {
        0
    }
}

/// A plan's listed prices in paisa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPricing {
    /// Price of a single day.
    #[serde(default)]
    pub daily: Option<Paisa>,

    /// Price of a month.
    #[serde(default)]
    pub monthly: Option<Paisa>,
}

impl PlanPricing {
    /// Create plan pricing with both prices set.
    #[must_use]
    pub const fn new(daily: Paisa, monthly: Paisa) -> Self {
        Self {
            daily: Some(daily),
            monthly: Some(monthly),
        }
    }

    /// The price that applies to `plan_type`, zero when unlisted.
    #[must_use]
    pub fn base_price(&self, plan_type: PlanType) -> Paisa {
        let price = match plan_type {
            PlanType::DayPass => self.daily,
            PlanType::HotDesk | PlanType::DedicatedDesk | PlanType::PrivateOffice => self.monthly,
        };
        price.unwrap_or(0)
    }
}

/// The kind of plan being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Single-day access, charged at the daily price.
    DayPass,
    /// Any free desk, charged monthly.
    HotDesk,
    /// A reserved desk, charged monthly.
    DedicatedDesk,
    /// A lockable office, charged monthly.
    PrivateOffice,
}

impl PlanType {
    /// Get the plan type as its wire tag.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DayPass => "day_pass",
            Self::HotDesk => "hot_desk",
            Self::DedicatedDesk => "dedicated_desk",
            Self::PrivateOffice => "private_office",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_pass" => Ok(Self::DayPass),
            "hot_desk" => Ok(Self::HotDesk),
            "dedicated_desk" => Ok(Self::DedicatedDesk),
            "private_office" => Ok(Self::PrivateOffice),
            other => Err(CoreError::InvalidPlanType(other.to_string())),
        }
    }
}

/// An add-on the customer selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAddOn {
    /// Add-on identifier.
    pub id: String,
    /// Price in paisa.
    pub price: Paisa,
}

impl SelectedAddOn {
    /// Create a selected add-on.
    #[must_use]
    pub fn new(id: impl Into<String>, price: Paisa) -> Self {
        Self {
            id: id.into(),
            price,
        }
    }
}

/// The computed price of a plan selection, in paisa.
///
/// Only the calculator constructs breakdowns, so `total` always equals the sum
/// of the four components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    base_price: Paisa,
    add_ons_price: Paisa,
    meeting_room_hours_price: Paisa,
    guest_passes_price: Paisa,
    total: Paisa,
}

impl PricingBreakdown {
    fn new(
        base_price: Paisa,
        add_ons_price: Paisa,
        meeting_room_hours_price: Paisa,
        guest_passes_price: Paisa,
    ) -> Self {
        let total = base_price
            .saturating_add(add_ons_price)
            .saturating_add(meeting_room_hours_price)
            .saturating_add(guest_passes_price);
        Self {
            base_price,
            add_ons_price,
            meeting_room_hours_price,
            guest_passes_price,
            total,
        }
    }

    /// Plan price for the selected plan type.
    #[must_use]
    pub const fn base_price(&self) -> Paisa {
        self.base_price
    }

    /// Sum of the selected add-ons.
    #[must_use]
    pub const fn add_ons_price(&self) -> Paisa {
        self.add_ons_price
    }

    /// Meeting room hours times the hourly rate.
    #[must_use]
    pub const fn meeting_room_hours_price(&self) -> Paisa {
        self.meeting_room_hours_price
    }

    /// Guest passes times the per-pass rate.
    #[must_use]
    pub const fn guest_passes_price(&self) -> Paisa {
        self.guest_passes_price
    }

    /// Sum of all components.
    #[must_use]
    pub const fn total(&self) -> Paisa {
        self.total
    }
}
