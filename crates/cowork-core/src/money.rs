//! Money helpers.
//!
//! All amounts are integer paisa. Conversion to and from rupees only happens at
//! the display edge.

use crate::error::{CoreError, Result};

/// An amount in paisa (1 NPR = 100 paisa).
pub type Paisa = u64;

/// Number of paisa in one rupee.
pub const PAISA_PER_RUPEE: Paisa = 100;

/// Convert a whole-rupee amount to paisa.
///
/// # Errors
///
/// Returns `CoreError::InvalidAmount` if the result does not fit in a `u64`.
pub fn rupees_to_paisa(rupees: u64) -> Result<Paisa> {
    rupees
        .checked_mul(PAISA_PER_RUPEE)
        .ok_or_else(|| CoreError::InvalidAmount(format!("{rupees} rupees overflows paisa")))
}

/// Format paisa as a display string, e.g. `NPR 1,500` or `NPR 1,500.50`.
#[must_use]
pub fn format_npr(amount: Paisa) -> String {
    let rupees = amount / PAISA_PER_RUPEE;
    let paisa = amount % PAISA_PER_RUPEE;

    let digits = rupees.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if paisa == 0 {
        format!("NPR {grouped}")
    } else {
        format!("NPR {grouped}.{paisa:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rupees_convert_to_paisa() {
        assert_eq!(rupees_to_paisa(1500).unwrap(), 150_000);
        assert_eq!(rupees_to_paisa(0).unwrap(), 0);
    }

    #[test]
    fn rupees_overflow_is_rejected() {
        assert!(matches!(
            rupees_to_paisa(u64::MAX),
            Err(CoreError::InvalidAmount(_))
        ));
    }

    #[test]
    fn format_whole_rupees() {
        assert_eq!(format_npr(0), "NPR 0");
        assert_eq!(format_npr(60_000), "NPR 600");
        assert_eq!(format_npr(150_000), "NPR 1,500");
        assert_eq!(format_npr(1_500_000), "NPR 15,000");
        assert_eq!(format_npr(123_456_700), "NPR 1,234,567");
    }

    #[test]
    fn format_fractional_rupees() {
        assert_eq!(format_npr(150_050), "NPR 1,500.50");
        assert_eq!(format_npr(5), "NPR 0.05");
    }
}
