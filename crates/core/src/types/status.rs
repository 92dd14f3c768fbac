//! Status and classification enums for the domain entities.
//!
//! Every enum here is stored as a Postgres enum type in the `hridved` schema
//! and serialized to JSON using the same labels the database holds.

use serde::{Deserialize, Serialize};

/// How a user account authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.oauth_provider", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    #[default]
    Local,
    Google,
    Facebook,
}

impl std::fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Google => write!(f, "google"),
            Self::Facebook => write!(f, "facebook"),
        }
    }
}

/// Label on a saved delivery address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.address_type", rename_all = "PascalCase")
)]
pub enum AddressType {
    #[default]
    Home,
    Office,
}

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.delivery_option", rename_all = "PascalCase")
)]
pub enum DeliveryOption {
    #[default]
    Standard,
    Express,
}

impl DeliveryOption {
    /// Estimated transit time shown to the customer.
    #[must_use]
    pub const fn days(self) -> &'static str {
        match self {
            Self::Standard => "3-5",
            Self::Express => "1-2",
        }
    }

    /// Flat shipping charge in rupees, and the ceiling for any quoted charge.
    #[must_use]
    pub const fn default_charge(self) -> i64 {
        match self {
            Self::Standard => 40,
            Self::Express => 100,
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Standard => "Standard Delivery",
            Self::Express => "Express Delivery",
        }
    }
}

impl std::fmt::Display for DeliveryOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "Standard"),
            Self::Express => write!(f, "Express"),
        }
    }
}

impl std::str::FromStr for DeliveryOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "Express" => Ok(Self::Express),
            _ => Err(format!("invalid delivery option: {s}")),
        }
    }
}

/// Courier progress of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.shipping_status", rename_all = "PascalCase")
)]
pub enum ShippingStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

/// How an order is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "hridved.payment_method"))]
pub enum PaymentMethod {
    #[default]
    Razorpay,
    Stripe,
    PhonePe,
    /// Cash on delivery.
    #[serde(rename = "COD")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "COD"))]
    Cod,
}

impl PaymentMethod {
    /// FShip payment mode for this method.
    #[must_use]
    pub const fn shipping_mode(self) -> &'static str {
        match self {
            Self::Cod => "COD",
            Self::Razorpay | Self::Stripe | Self::PhonePe => "Prepaid",
        }
    }
}

/// Publication state of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.blog_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum BlogStatus {
    #[default]
    Draft,
    Published,
}

impl BlogStatus {
    /// The other state; used by the admin publish/unpublish toggle.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Draft => Self::Published,
            Self::Published => Self::Draft,
        }
    }
}

impl std::str::FromStr for BlogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            _ => Err(format!("invalid blog status: {s}")),
        }
    }
}

/// Editorial category of a blog post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "hridved.blog_category"))]
pub enum BlogCategory {
    #[serde(rename = "Skin Care")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Skin Care"))]
    SkinCare,
    #[serde(rename = "Hair Health")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Hair Health"))]
    HairHealth,
    Nutrition,
    Yoga,
    #[serde(rename = "Stress Management")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Stress Management"))]
    StressManagement,
    #[serde(rename = "General Wellness")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "General Wellness"))]
    GeneralWellness,
    Ayurveda,
    #[serde(rename = "Tips & Tricks")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Tips & Tricks"))]
    TipsAndTricks,
    #[serde(rename = "Product Guide")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Product Guide"))]
    ProductGuide,
    Other,
}

impl BlogCategory {
    /// All categories in display order.
    pub const ALL: [Self; 10] = [
        Self::SkinCare,
        Self::HairHealth,
        Self::Nutrition,
        Self::Yoga,
        Self::StressManagement,
        Self::GeneralWellness,
        Self::Ayurveda,
        Self::TipsAndTricks,
        Self::ProductGuide,
        Self::Other,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SkinCare => "Skin Care",
            Self::HairHealth => "Hair Health",
            Self::Nutrition => "Nutrition",
            Self::Yoga => "Yoga",
            Self::StressManagement => "Stress Management",
            Self::GeneralWellness => "General Wellness",
            Self::Ayurveda => "Ayurveda",
            Self::TipsAndTricks => "Tips & Tricks",
            Self::ProductGuide => "Product Guide",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for BlogCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for BlogCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| format!("invalid blog category: {s}"))
    }
}

/// How a coupon's `discount` value is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.coupon_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    /// `discount` is a percentage of the order subtotal.
    #[default]
    Percentage,
    /// `discount` is a flat rupee amount.
    Fixed,
}

/// Lifecycle of a doctor consultation booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.booking_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("invalid booking status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.consultation_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationType {
    #[default]
    Video,
    Clinic,
}

/// State of a PhonePe payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "hridved.transaction_status", rename_all = "UPPERCASE")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_option_terms() {
        assert_eq!(DeliveryOption::Standard.days(), "3-5");
        assert_eq!(DeliveryOption::Express.days(), "1-2");
        assert_eq!(DeliveryOption::Standard.default_charge(), 40);
        assert_eq!(DeliveryOption::Express.default_charge(), 100);
        assert_eq!("Express".parse::<DeliveryOption>().unwrap(), DeliveryOption::Express);
        assert!("Overnight".parse::<DeliveryOption>().is_err());
    }

    #[test]
    fn test_blog_status_toggle() {
        assert_eq!(BlogStatus::Draft.toggled(), BlogStatus::Published);
        assert_eq!(BlogStatus::Published.toggled(), BlogStatus::Draft);
    }

    #[test]
    fn test_blog_category_labels_roundtrip() {
        for category in BlogCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.label()));
            assert_eq!(category.label().parse::<BlogCategory>().unwrap(), category);
        }
        assert!("Astrology".parse::<BlogCategory>().is_err());
    }

    #[test]
    fn test_payment_method_serialization() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Cod).unwrap(), "\"COD\"");
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"PhonePe\"").unwrap(),
            PaymentMethod::PhonePe
        );
        assert_eq!(PaymentMethod::Cod.shipping_mode(), "COD");
        assert_eq!(PaymentMethod::Razorpay.shipping_mode(), "Prepaid");
    }

    #[test]
    fn test_transaction_status_is_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Success).unwrap(),
            "\"SUCCESS\""
        );
    }

    #[test]
    fn test_booking_status_from_str() {
        assert_eq!(
            "cancelled".parse::<BookingStatus>().unwrap(),
            BookingStatus::Cancelled
        );
        assert!("refunded".parse::<BookingStatus>().is_err());
    }
}
