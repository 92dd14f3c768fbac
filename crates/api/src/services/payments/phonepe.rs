//! PhonePe standard checkout (pay page redirect and status check).
//!
//! Requests are authenticated with an `X-VERIFY` checksum:
//! `sha256hex(payload + api_path + salt_key) + "###" + salt_index`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use hridved_core::{UserId, to_paise};

use super::{PaymentError, read_json};
use crate::config::PhonePeConfig;

const GATEWAY: &str = "PhonePe";
const PAY_PATH: &str = "/pg/v1/pay";

/// PhonePe API client.
#[derive(Clone)]
pub struct PhonePeClient {
    client: Client,
    merchant_id: String,
    salt_key: SecretString,
    salt_index: String,
    base_url: String,
}

impl std::fmt::Debug for PhonePeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhonePeClient")
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PayPayload<'a> {
    merchant_id: &'a str,
    merchant_transaction_id: &'a str,
    merchant_user_id: String,
    amount: i64,
    redirect_url: String,
    redirect_mode: &'static str,
    payment_instrument: PaymentInstrument,
}

#[derive(Debug, Serialize)]
struct PaymentInstrument {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// A started payment: where to send the customer.
#[derive(Debug, Clone)]
pub struct PaymentStart {
    pub merchant_transaction_id: String,
    pub redirect_url: String,
}

/// The status check response, kept whole for the transaction record.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl PaymentStatus {
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.success && self.code == "PAYMENT_SUCCESS"
    }

    /// PhonePe's own transaction id.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        self.raw
            .pointer("/data/transactionId")
            .and_then(serde_json::Value::as_str)
    }
}

impl PhonePeClient {
    #[must_use]
    pub fn new(client: Client, config: &PhonePeConfig) -> Self {
        Self {
            client,
            merchant_id: config.merchant_id.clone(),
            salt_key: config.salt_key.clone(),
            salt_index: config.salt_index.clone(),
            base_url: config.base_url.clone(),
        }
    }

    /// Start a pay-page payment of `amount` rupees.
    ///
    /// `callback_base` is the origin PhonePe posts the customer back to; the
    /// callback lands on `/api/payment/status/{merchantTransactionId}`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` if PhonePe rejects the request.
    /// Returns `PaymentError::Response` if the response has no redirect URL.
    #[instrument(skip(self, callback_base))]
    pub async fn start_payment(
        &self,
        user_id: UserId,
        amount: Decimal,
        callback_base: &str,
    ) -> Result<PaymentStart, PaymentError> {
        let paise = to_paise(amount).ok_or_else(|| PaymentError::InvalidAmount(amount.to_string()))?;
        let merchant_transaction_id = format!("MT{}", chrono::Utc::now().timestamp_millis());

        let payload = PayPayload {
            merchant_id: &self.merchant_id,
            merchant_transaction_id: &merchant_transaction_id,
            merchant_user_id: format!("MUID{user_id}"),
            amount: paise,
            redirect_url: format!("{callback_base}/api/payment/status/{merchant_transaction_id}"),
            redirect_mode: "POST",
            payment_instrument: PaymentInstrument { kind: "PAY_PAGE" },
        };
        let json = serde_json::to_vec(&payload).map_err(|e| PaymentError::Response {
            gateway: GATEWAY,
            message: e.to_string(),
        })?;
        let encoded = STANDARD.encode(json);
        let x_verify = self.checksum(&format!("{encoded}{PAY_PATH}"));

        let response = self
            .client
            .post(format!("{}/pay", self.base_url))
            .header("accept", "application/json")
            .header("X-VERIFY", x_verify)
            .json(&serde_json::json!({ "request": encoded }))
            .send()
            .await
            .map_err(|source| PaymentError::Request {
                gateway: GATEWAY,
                source,
            })?;

        let body = read_json(GATEWAY, response).await?;
        let redirect_url = body
            .pointer("/data/instrumentResponse/redirectInfo/url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| PaymentError::Response {
                gateway: GATEWAY,
                message: "missing redirect url".to_string(),
            })?
            .to_string();

        debug!(%merchant_transaction_id, "PhonePe payment started");
        Ok(PaymentStart {
            merchant_transaction_id,
            redirect_url,
        })
    }

    /// Ask PhonePe how a payment ended.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Gateway` if PhonePe rejects the request.
    #[instrument(skip(self))]
    pub async fn status(&self, merchant_transaction_id: &str) -> Result<PaymentStatus, PaymentError> {
        let path = format!("/status/{}/{merchant_transaction_id}", self.merchant_id);
        let x_verify = self.checksum(&format!("/pg/v1{path}"));

        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("accept", "application/json")
            .header("X-VERIFY", x_verify)
            .header("X-MERCHANT-ID", &self.merchant_id)
            .send()
            .await
            .map_err(|source| PaymentError::Request {
                gateway: GATEWAY,
                source,
            })?;

        let raw = read_json(GATEWAY, response).await?;
        let mut status: PaymentStatus =
            serde_json::from_value(raw.clone()).map_err(|e| PaymentError::Response {
                gateway: GATEWAY,
                message: e.to_string(),
            })?;
        status.raw = raw;
        Ok(status)
    }

    fn checksum(&self, message: &str) -> String {
        x_verify(message, self.salt_key.expose_secret(), &self.salt_index)
    }
}

/// `sha256hex(message + salt_key) + "###" + salt_index`.
#[must_use]
pub fn x_verify(message: &str, salt_key: &str, salt_index: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(salt_key.as_bytes());
    format!("{}###{salt_index}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_x_verify_shape() {
        let checksum = x_verify("/pg/v1/status/PGTESTPAYUAT/MT1", "salt", "1");
        let (digest, index) = checksum.split_once("###").unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(index, "1");
    }

    #[test]
    fn test_x_verify_concatenates_salt() {
        let mut hasher = Sha256::new();
        hasher.update(b"abc/pg/v1/paysalt-key");
        let expected = format!("{}###2", hex::encode(hasher.finalize()));
        assert_eq!(x_verify("abc/pg/v1/pay", "salt-key", "2"), expected);
    }

    #[test]
    fn test_payment_status() {
        let raw = serde_json::json!({
            "success": true,
            "code": "PAYMENT_SUCCESS",
            "data": { "transactionId": "T2310161234" }
        });
        let mut status: PaymentStatus = serde_json::from_value(raw.clone()).unwrap();
        status.raw = raw;
        assert!(status.is_paid());
        assert_eq!(status.transaction_id(), Some("T2310161234"));

        let pending: PaymentStatus =
            serde_json::from_value(serde_json::json!({"success": true, "code": "PAYMENT_PENDING"}))
                .unwrap();
        assert!(!pending.is_paid());
    }

    #[test]
    fn test_pay_payload_is_camel_case() {
        let payload = PayPayload {
            merchant_id: "M1",
            merchant_transaction_id: "MT1",
            merchant_user_id: "MUID3".to_string(),
            amount: 49_900,
            redirect_url: "http://localhost:5173/api/payment/status/MT1".to_string(),
            redirect_mode: "POST",
            payment_instrument: PaymentInstrument { kind: "PAY_PAGE" },
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["merchantTransactionId"], "MT1");
        assert_eq!(json["paymentInstrument"]["type"], "PAY_PAGE");
        assert_eq!(json["amount"], 49_900);
    }
}
