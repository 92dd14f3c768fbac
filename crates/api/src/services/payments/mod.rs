//! Payment gateway clients.
//!
//! Each gateway is a thin wrapper over its vendor HTTP API. A gateway whose
//! credentials are absent from the environment has no client, and its routes
//! answer 503.

pub mod phonepe;
pub mod razorpay;
pub mod stripe;

pub use phonepe::PhonePeClient;
pub use razorpay::RazorpayClient;
pub use stripe::StripeClient;

use thiserror::Error;

/// Errors that can occur when talking to a payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("{gateway} request failed: {source}")]
    Request {
        gateway: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Gateway answered with a non-success status.
    #[error("{gateway} returned {status}: {body}")]
    Gateway {
        gateway: &'static str,
        status: u16,
        body: String,
    },

    /// Gateway answered 2xx with a body we could not use.
    #[error("{gateway} response error: {message}")]
    Response {
        gateway: &'static str,
        message: String,
    },

    /// Amount cannot be expressed in paise.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl PaymentError {
    /// The vendor's own error message, when it sent one.
    ///
    /// Stripe errors are relayed to the client verbatim.
    #[must_use]
    pub fn vendor_message(&self) -> String {
        match self {
            Self::Gateway { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .or_else(|| v.pointer("/error/description"))
                        .or_else(|| v.get("message"))
                        .and_then(serde_json::Value::as_str)
                        .map(String::from)
                })
                .unwrap_or_else(|| body.clone()),
            other => other.to_string(),
        }
    }
}

/// Read a gateway response, turning non-2xx answers into `PaymentError::Gateway`.
pub(crate) async fn read_json(
    gateway: &'static str,
    response: reqwest::Response,
) -> Result<serde_json::Value, PaymentError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| PaymentError::Request { gateway, source })?;

    if !status.is_success() {
        tracing::error!(
            gateway,
            status = %status,
            body = %body.chars().take(500).collect::<String>(),
            "Payment gateway returned non-success status"
        );
        return Err(PaymentError::Gateway {
            gateway,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| PaymentError::Response {
        gateway,
        message: e.to_string(),
    })
}

/// Constant-time string comparison to prevent timing attacks.
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("hello", "hello"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("hello", "world"));
        assert!(!constant_time_compare("hello", "hell"));
    }

    #[test]
    fn test_vendor_message_prefers_error_message() {
        let err = PaymentError::Gateway {
            gateway: "Stripe",
            status: 400,
            body: r#"{"error":{"message":"Amount must be at least ₹0.50 inr"}}"#.to_string(),
        };
        assert_eq!(err.vendor_message(), "Amount must be at least ₹0.50 inr");

        let err = PaymentError::Gateway {
            gateway: "Razorpay",
            status: 400,
            body: r#"{"error":{"code":"BAD_REQUEST_ERROR","description":"The amount must be atleast INR 1.00"}}"#.to_string(),
        };
        assert_eq!(err.vendor_message(), "The amount must be atleast INR 1.00");
    }

    #[test]
    fn test_vendor_message_falls_back_to_body() {
        let err = PaymentError::Gateway {
            gateway: "Stripe",
            status: 502,
            body: "upstream timeout".to_string(),
        };
        assert_eq!(err.vendor_message(), "upstream timeout");
    }
}
