//! Field validators for request payloads.
//!
//! Each validator answers a yes/no question about one field. Handlers that
//! check several fields at once collect failures in [`FieldErrors`], which
//! serializes to the `errors` object of a 400 response.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::Email;

/// Highest accepted unit price, exclusive.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest quantity accepted for a single cart or order line.
pub const MAX_QUANTITY: i64 = 10_000;

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    Email::parse(email).is_ok()
}

/// Indian mobile number: ten digits starting 6-9, ignoring formatting
/// characters such as spaces, dashes or a `+91` prefix's punctuation.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let digits = digits
        .strip_prefix("91")
        .filter(|rest| rest.len() == 10)
        .unwrap_or(digits.as_str());
    digits.len() == 10 && digits.starts_with(['6', '7', '8', '9'])
}

/// Six-digit Indian postal code.
#[must_use]
pub fn is_valid_pincode(pincode: &str) -> bool {
    pincode.len() == 6 && pincode.bytes().all(|b| b.is_ascii_digit())
}

/// Ten-digit mobile number as stored on an address.
#[must_use]
pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

#[must_use]
pub fn is_valid_product_name(name: &str) -> bool {
    let len = name.trim().chars().count();
    (3..=200).contains(&len)
}

/// Strictly positive price below [`MAX_PRICE`].
#[must_use]
pub fn is_valid_price(price: Decimal) -> bool {
    price > Decimal::ZERO && price < MAX_PRICE
}

#[must_use]
pub fn is_valid_quantity(qty: i64) -> bool {
    (1..=MAX_QUANTITY).contains(&qty)
}

/// Escape HTML-significant characters and trim surrounding whitespace.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    let trimmed = input.trim();
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Per-field validation failures, keyed by the JSON field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.0.insert(field.to_owned(), message.to_owned());
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// `Ok(())` when nothing failed, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_phone() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("98765-43210"));
        assert!(is_valid_phone("+91 98765 43210"));
        assert!(!is_valid_phone("5876543210"));
        assert!(!is_valid_phone("987654321"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_pincode_and_mobile() {
        assert!(is_valid_pincode("560001"));
        assert!(!is_valid_pincode("56001"));
        assert!(!is_valid_pincode("56000a"));
        assert!(is_valid_mobile("0123456789"));
        assert!(!is_valid_mobile("012345678"));
        assert!(!is_valid_mobile("01234 56789"));
    }

    #[test]
    fn test_product_name() {
        assert!(is_valid_product_name("Neem"));
        assert!(!is_valid_product_name("  ab  "));
        assert!(!is_valid_product_name(&"x".repeat(201)));
    }

    #[test]
    fn test_price_and_quantity() {
        assert!(is_valid_price(Decimal::new(1, 2)));
        assert!(is_valid_price(Decimal::new(999_999, 0)));
        assert!(!is_valid_price(Decimal::ZERO));
        assert!(!is_valid_price(MAX_PRICE));
        assert!(is_valid_quantity(1));
        assert!(is_valid_quantity(10_000));
        assert!(!is_valid_quantity(0));
        assert!(!is_valid_quantity(10_001));
    }

    #[test]
    fn test_sanitize_html() {
        assert_eq!(
            sanitize_html("  <b>\"Tom\" & 'Jerry'</b> "),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#x27;Jerry&#x27;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_field_errors() {
        let mut errors = FieldErrors::new();
        errors
            .check(true, "name", "Name is required")
            .check(false, "email", "Please provide a valid email");
        assert_eq!(errors.get("email"), Some("Please provide a valid email"));
        assert_eq!(errors.get("name"), None);

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["email"], "Please provide a valid email");
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
