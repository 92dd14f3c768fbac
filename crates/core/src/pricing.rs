//! Order totals, GST and coupon rules.
//!
//! Totals are always recomputed from line items on the server. Shipping is
//! capped at the flat charge for the chosen delivery option, and a coupon can
//! never discount more than the item subtotal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::money::round_rupees;
use crate::types::{CouponType, DeliveryOption};

/// GST rate applied to the item subtotal (5%).
pub const GST_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Sum of `price * qty` over the order lines.
#[must_use]
pub fn items_price<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    round_rupees(
        lines
            .into_iter()
            .map(|(price, qty)| price * Decimal::from(qty))
            .sum(),
    )
}

/// GST on an item subtotal, rounded half-up to paise.
#[must_use]
pub fn gst(items_price: Decimal) -> Decimal {
    round_rupees(items_price * GST_RATE)
}

/// Shipping charge for a delivery option.
///
/// A quoted charge (from the serviceability check) is honoured when it is
/// lower than the option's flat charge; without a quote the flat charge applies.
#[must_use]
pub fn shipping_charge(option: DeliveryOption, quoted: Option<Decimal>) -> Decimal {
    let ceiling = Decimal::from(option.default_charge());
    quoted
        .map_or(ceiling, |q| q.max(Decimal::ZERO).min(ceiling))
        .round_dp(2)
}

/// Why a coupon cannot be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    #[error("Invalid or inactive promo code")]
    Inactive,
    #[error("Promo code has expired")]
    Expired,
    #[error("Minimum order amount of ₹{minimum} required for this coupon")]
    BelowMinimum { minimum: Decimal },
}

/// The parts of a coupon that decide whether and how much it discounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponTerms {
    pub kind: CouponType,
    pub discount: Decimal,
    pub min_order_amount: Decimal,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl CouponTerms {
    /// Check the coupon against a cart subtotal at time `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: inactive, expired, then minimum amount.
    pub fn check(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if self.expires_at < now {
            return Err(CouponRejection::Expired);
        }
        if subtotal < self.min_order_amount {
            return Err(CouponRejection::BelowMinimum {
                minimum: self.min_order_amount.normalize(),
            });
        }
        Ok(())
    }

    /// Rupee discount on `subtotal`, never more than the subtotal itself.
    #[must_use]
    pub fn discount_on(&self, subtotal: Decimal) -> Decimal {
        let raw = match self.kind {
            CouponType::Percentage => subtotal * self.discount / Decimal::ONE_HUNDRED,
            CouponType::Fixed => self.discount,
        };
        round_rupees(raw.max(Decimal::ZERO).min(subtotal))
    }
}

/// The price breakdown stored on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    #[serde(with = "rust_decimal::serde::float")]
    pub items_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl OrderTotals {
    /// `total = items + GST(items) + shipping - discount`.
    #[must_use]
    pub fn compute(items_price: Decimal, shipping_price: Decimal, discount_amount: Decimal) -> Self {
        let tax_price = gst(items_price);
        let total_price = round_rupees(
            (items_price + tax_price + shipping_price - discount_amount).max(Decimal::ZERO),
        );
        Self {
            items_price,
            tax_price,
            shipping_price,
            discount_amount,
            total_price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn rupees(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn coupon(kind: CouponType, discount: &str, min: &str) -> CouponTerms {
        CouponTerms {
            kind,
            discount: rupees(discount),
            min_order_amount: rupees(min),
            expires_at: Utc::now() + Duration::days(7),
            is_active: true,
        }
    }

    #[test]
    fn test_items_price() {
        let lines = vec![(rupees("249.50"), 2), (rupees("120"), 1)];
        assert_eq!(items_price(lines), rupees("619.00"));
        assert_eq!(items_price(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_gst_rounds_half_up() {
        assert_eq!(gst(rupees("1000")), rupees("50.00"));
        assert_eq!(gst(rupees("10.10")), rupees("0.51"));
        assert_eq!(gst(rupees("0.10")), rupees("0.01"));
    }

    #[test]
    fn test_shipping_charge_capped_at_option() {
        assert_eq!(shipping_charge(DeliveryOption::Standard, None), rupees("40"));
        assert_eq!(
            shipping_charge(DeliveryOption::Standard, Some(rupees("75"))),
            rupees("40")
        );
        assert_eq!(
            shipping_charge(DeliveryOption::Express, Some(rupees("65"))),
            rupees("65")
        );
        assert_eq!(
            shipping_charge(DeliveryOption::Express, Some(rupees("-5"))),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_order_totals() {
        let totals = OrderTotals::compute(rupees("1000"), rupees("40"), rupees("100"));
        assert_eq!(totals.tax_price, rupees("50"));
        assert_eq!(totals.total_price, rupees("990"));
    }

    #[test]
    fn test_percentage_coupon() {
        let c = coupon(CouponType::Percentage, "10", "0");
        assert_eq!(c.discount_on(rupees("1250")), rupees("125.00"));
    }

    #[test]
    fn test_fixed_coupon_capped_at_subtotal() {
        let c = coupon(CouponType::Fixed, "500", "0");
        assert_eq!(c.discount_on(rupees("300")), rupees("300"));
        assert_eq!(c.discount_on(rupees("900")), rupees("500"));
    }

    #[test]
    fn test_coupon_check_rules() {
        let now = Utc::now();
        let mut c = coupon(CouponType::Percentage, "10", "499");
        assert!(c.check(rupees("500"), now).is_ok());
        assert_eq!(
            c.check(rupees("200"), now),
            Err(CouponRejection::BelowMinimum {
                minimum: rupees("499")
            })
        );

        c.expires_at = now - Duration::hours(1);
        assert_eq!(c.check(rupees("500"), now), Err(CouponRejection::Expired));

        c.is_active = false;
        assert_eq!(c.check(rupees("500"), now), Err(CouponRejection::Inactive));
    }

    #[test]
    fn test_minimum_message_formats_rupees() {
        let err = CouponRejection::BelowMinimum {
            minimum: rupees("499.00").normalize(),
        };
        assert_eq!(
            err.to_string(),
            "Minimum order amount of ₹499 required for this coupon"
        );
    }
}
