//! Stripe payment intents.

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::{PaymentError, read_json};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";
const GATEWAY: &str = "Stripe";

/// Stripe API client (secret key side).
#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl StripeClient {
    #[must_use]
    pub const fn new(client: Client, secret_key: SecretString) -> Self {
        Self { client, secret_key }
    }

    /// Create a payment intent and return its client secret.
    ///
    /// `amount` is in the currency's smallest unit.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` if Stripe rejects the request.
    /// Returns `PaymentError::Response` if the intent has no client secret.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<String, PaymentError> {
        let amount = amount.to_string();
        let form = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(format!("{STRIPE_API_BASE}/payment_intents"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(|source| PaymentError::Request {
                gateway: GATEWAY,
                source,
            })?;

        let intent = read_json(GATEWAY, response).await?;
        intent
            .get("client_secret")
            .and_then(serde_json::Value::as_str)
            .map(String::from)
            .ok_or_else(|| PaymentError::Response {
                gateway: GATEWAY,
                message: "payment intent has no client_secret".to_string(),
            })
    }
}
