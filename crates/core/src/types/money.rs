//! Rupee amounts.
//!
//! Money is carried as [`Decimal`] rupees with two decimal places. Payment
//! gateways want integer paise, and the admin dashboard wants Indian digit
//! grouping (`₹1,23,456`), so both conversions live here.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a rupee amount to two decimal places, half away from zero.
#[must_use]
pub fn round_rupees(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert rupees to integer paise for gateway APIs.
///
/// Fractions of a paisa are rounded half away from zero. Returns `None`
/// when the amount does not fit in an `i64`.
#[must_use]
pub fn to_paise(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// Format a rupee amount with Indian digit grouping and no decimals.
///
/// The last three digits form one group and every two digits above that
/// form another: `123456` becomes `₹1,23,456`.
///
/// ```
/// use hridved_core::format_inr;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_inr(Decimal::new(123_456, 0)), "₹1,23,456");
/// assert_eq!(format_inr(Decimal::new(99_950, 2)), "₹1,000");
/// ```
#[must_use]
pub fn format_inr(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let digits = rounded.abs().trunc().to_string();

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        if !rest.is_empty() {
            groups.push(rest);
        }
        groups.reverse();
        format!("{},{tail}", groups.join(","))
    };

    if negative {
        format!("-₹{grouped}")
    } else {
        format!("₹{grouped}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rupees_half_up() {
        assert_eq!(round_rupees(Decimal::new(10_005, 3)), Decimal::new(1001, 2));
        assert_eq!(round_rupees(Decimal::new(10_004, 3)), Decimal::new(1000, 2));
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(to_paise(Decimal::new(49_950, 2)), Some(49_950));
        assert_eq!(to_paise(Decimal::new(500, 0)), Some(50_000));
        assert_eq!(to_paise(Decimal::new(10_005, 3)), Some(1001));
    }

    #[test]
    fn test_format_inr_small_amounts() {
        assert_eq!(format_inr(Decimal::ZERO), "₹0");
        assert_eq!(format_inr(Decimal::new(999, 0)), "₹999");
        assert_eq!(format_inr(Decimal::new(1000, 0)), "₹1,000");
    }

    #[test]
    fn test_format_inr_lakh_and_crore_grouping() {
        assert_eq!(format_inr(Decimal::new(123_456, 0)), "₹1,23,456");
        assert_eq!(format_inr(Decimal::new(1_234_567, 0)), "₹12,34,567");
        assert_eq!(format_inr(Decimal::new(123_456_789, 0)), "₹12,34,56,789");
    }

    #[test]
    fn test_format_inr_rounds_and_signs() {
        assert_eq!(format_inr(Decimal::new(149_950, 2)), "₹1,500");
        assert_eq!(format_inr(Decimal::new(-25_000, 0)), "-₹25,000");
    }
}
