//! Razorpay orders API and payment signature checks.

use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::Sha256;
use tracing::{debug, instrument};

use hridved_core::to_paise;

use super::{PaymentError, constant_time_compare, read_json};
use crate::config::RazorpayConfig;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";
const GATEWAY: &str = "Razorpay";

/// Razorpay API client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a str>,
}

impl RazorpayClient {
    /// Create a new Razorpay client sharing the given HTTP client.
    #[must_use]
    pub fn new(client: Client, config: &RazorpayConfig) -> Self {
        Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }

    /// Public key id, handed to the browser checkout.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a Razorpay order for `amount` rupees.
    ///
    /// Returns the order object exactly as Razorpay sent it.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount` if the amount overflows paise.
    /// Returns `PaymentError::Gateway` if Razorpay rejects the order.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        amount: Decimal,
        currency: &str,
        receipt: Option<&str>,
    ) -> Result<serde_json::Value, PaymentError> {
        let paise = to_paise(amount).ok_or_else(|| PaymentError::InvalidAmount(amount.to_string()))?;

        let response = self
            .client
            .post(format!("{RAZORPAY_API_BASE}/orders"))
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&CreateOrder {
                amount: paise,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(|source| PaymentError::Request {
                gateway: GATEWAY,
                source,
            })?;

        let order = read_json(GATEWAY, response).await?;
        debug!(order_id = ?order.get("id"), "Razorpay order created");
        Ok(order)
    }

    /// Check a checkout signature: hex HMAC-SHA256 of `"{order_id}|{payment_id}"`.
    #[must_use]
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = payment_signature(self.key_secret.expose_secret(), order_id, payment_id);
        constant_time_compare(&expected, signature)
    }
}

/// Hex HMAC-SHA256 signature Razorpay attaches to a completed payment.
#[must_use]
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    // HMAC accepts keys of any length
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> RazorpayClient {
        RazorpayClient::new(
            Client::new(),
            &RazorpayConfig {
                key_id: "rzp_test_1DP5mmOlF5G5ag".to_string(),
                key_secret: SecretString::from("thisisasecret"),
            },
        )
    }

    #[test]
    fn test_payment_signature_matches_known_vector() {
        let mut mac = Hmac::<Sha256>::new_from_slice(b"thisisasecret").unwrap();
        mac.update(b"order_IluGWxBm9U8zJ8|pay_IluGWxBm9U8zJ9");
        let expected = hex::encode(mac.finalize().into_bytes());

        assert_eq!(
            payment_signature("thisisasecret", "order_IluGWxBm9U8zJ8", "pay_IluGWxBm9U8zJ9"),
            expected
        );
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn test_verify_signature() {
        let client = client();
        let good = payment_signature("thisisasecret", "order_1", "pay_1");
        assert!(client.verify_signature("order_1", "pay_1", &good));
        assert!(!client.verify_signature("order_1", "pay_2", &good));
        assert!(!client.verify_signature("order_1", "pay_1", "deadbeef"));
        assert!(!client.verify_signature("order_1", "pay_1", ""));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("rzp_test_1DP5mmOlF5G5ag"));
        assert!(!debug.contains("thisisasecret"));
    }
}
