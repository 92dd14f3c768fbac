//! Payment gateway routes: Razorpay, Stripe and PhonePe.
//!
//! Each gateway is optional. A deployment without credentials for one answers
//! its routes with 503.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use serde_json::json;

use hridved_core::{OrderId, TransactionStatus};

use crate::db::orders::RazorpayIds;
use crate::db::{OrderRepository, RepositoryError, TransactionRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAuth;
use crate::models::PaymentResult;
use crate::services::checkout;
use crate::services::payments::phonepe::PaymentStatus;
use crate::services::payments::{PhonePeClient, RazorpayClient, StripeClient};
use crate::state::AppState;

pub(crate) fn razorpay(state: &AppState) -> Result<&RazorpayClient> {
    state
        .razorpay()
        .ok_or_else(|| AppError::ServiceUnavailable("Razorpay is not configured".to_string()))
}

fn stripe(state: &AppState) -> Result<&StripeClient> {
    state
        .stripe()
        .ok_or_else(|| AppError::ServiceUnavailable("Stripe is not configured".to_string()))
}

fn phonepe(state: &AppState) -> Result<&PhonePeClient> {
    state
        .phonepe()
        .ok_or_else(|| AppError::ServiceUnavailable("PhonePe is not configured".to_string()))
}

// =============================================================================
// Razorpay
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RazorpayOrderRequest {
    pub amount: Decimal,
    #[serde(default = "default_inr")]
    pub currency: String,
    pub receipt: Option<String>,
}

fn default_inr() -> String {
    "INR".to_string()
}

/// POST /api/razorpay/order
///
/// # Errors
///
/// Returns 503 if Razorpay is not configured, 502 if Razorpay rejects the order.
pub async fn razorpay_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<RazorpayOrderRequest>,
) -> Result<AppJson<serde_json::Value>> {
    let client = razorpay(&state)?;
    if req.amount <= Decimal::ZERO {
        return Err(AppError::invalid_field("amount", "Amount must be positive"));
    }

    let order = client
        .create_order(req.amount, &req.currency, req.receipt.as_deref())
        .await?;
    tracing::info!(user_id = %user.id, amount = %req.amount, "Razorpay order created");
    Ok(AppJson(order))
}

#[derive(Debug, Deserialize)]
pub struct RazorpayVerifyRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "orderId")]
    pub order_id: OrderId,
}

/// POST /api/razorpay/verify
///
/// Marks the order paid and hands it to FShip.
///
/// # Errors
///
/// Returns 404 "Order not found" for an unknown order.
pub async fn razorpay_verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<RazorpayVerifyRequest>,
) -> Result<Response> {
    let client = razorpay(&state)?;

    if !client.verify_signature(
        &req.razorpay_order_id,
        &req.razorpay_payment_id,
        &req.razorpay_signature,
    ) {
        tracing::warn!(
            user_id = %user.id,
            razorpay_order_id = %req.razorpay_order_id,
            "Razorpay signature mismatch"
        );
        return Ok((
            StatusCode::BAD_REQUEST,
            AppJson(json!({ "status": "failure", "message": "Invalid signature" })),
        )
            .into_response());
    }

    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(req.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let owner_email = UserRepository::new(state.pool())
        .get_by_id(order.user_id)
        .await?
        .map(|owner| owner.email.to_string());

    let now = Utc::now();
    let result = PaymentResult {
        id: Some(req.razorpay_payment_id.clone()),
        status: Some("succeeded".to_string()),
        update_time: Some(now.timestamp_millis().to_string()),
        email_address: owner_email,
    };
    let ids = RazorpayIds {
        order_id: Some(&req.razorpay_order_id),
        payment_id: Some(&req.razorpay_payment_id),
        signature: Some(&req.razorpay_signature),
    };
    let order = orders.mark_paid(order.id, &result, &ids, now).await?;
    tracing::info!(order_id = %order.id, "Razorpay payment verified");

    checkout::ship_paid_order(state.pool(), state.fship(), &order).await;

    Ok(AppJson(json!({ "status": "success", "message": "Payment verified" })).into_response())
}

/// GET /api/razorpay/key
///
/// # Errors
///
/// Returns 503 if Razorpay is not configured.
pub async fn razorpay_key(State(state): State<AppState>) -> Result<String> {
    Ok(razorpay(&state)?.key_id().to_string())
}

// =============================================================================
// Stripe
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripeConfigResponse {
    pub public_key: String,
}

/// GET /api/config/stripe
pub async fn stripe_config(State(state): State<AppState>) -> AppJson<StripeConfigResponse> {
    AppJson(StripeConfigResponse {
        public_key: state
            .config()
            .stripe
            .publishable_key
            .clone()
            .unwrap_or_default(),
    })
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    pub amount: Decimal,
    #[serde(default = "default_inr_lower")]
    pub currency: String,
}

fn default_inr_lower() -> String {
    "inr".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// POST /api/payment/create-payment-intent
///
/// `amount` is in the currency's smallest unit. Stripe's own error message is
/// passed through as `{error}` with status 500.
///
/// # Errors
///
/// Returns 503 if Stripe is not configured.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<PaymentIntentRequest>,
) -> Result<Response> {
    let client = stripe(&state)?;
    let Some(amount) = req.amount.round().to_i64() else {
        return Err(AppError::invalid_field("amount", "Invalid amount"));
    };

    match client.create_payment_intent(amount, &req.currency).await {
        Ok(client_secret) => {
            tracing::info!(user_id = %user.id, amount, "Stripe payment intent created");
            Ok(AppJson(PaymentIntentResponse { client_secret }).into_response())
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Stripe payment intent failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                AppJson(json!({ "error": e.vendor_message() })),
            )
                .into_response())
        }
    }
}

// =============================================================================
// PhonePe
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonePeCreateRequest {
    pub amount: Decimal,
    pub order_id: Option<OrderId>,
}

/// POST /api/payment/create
///
/// Returns the PhonePe pay-page URL as a JSON string.
///
/// # Errors
///
/// Returns 503 if PhonePe is not configured, 500 "Payment Initiation Failed"
/// if PhonePe rejects the payment.
pub async fn phonepe_create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<PhonePeCreateRequest>,
) -> Result<Response> {
    let client = phonepe(&state)?;
    if req.amount <= Decimal::ZERO {
        return Err(AppError::invalid_field("amount", "Amount must be positive"));
    }

    let start = match client
        .start_payment(user.id, req.amount, &state.config().frontend_url)
        .await
    {
        Ok(start) => start,
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "PhonePe payment initiation failed");
            return Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                AppJson(json!({ "success": false, "message": "Payment Initiation Failed" })),
            )
                .into_response());
        }
    };

    TransactionRepository::new(state.pool())
        .create_pending(
            user.id,
            req.order_id,
            &start.merchant_transaction_id,
            req.amount,
        )
        .await?;
    tracing::info!(
        user_id = %user.id,
        merchant_transaction_id = %start.merchant_transaction_id,
        "PhonePe payment started"
    );

    Ok(AppJson(start.redirect_url).into_response())
}

/// POST /api/payment/status/{merchantTransactionId}
///
/// PhonePe posts the shopper back here. Always answers with a redirect to the
/// storefront's success or failure page.
pub async fn phonepe_status(
    State(state): State<AppState>,
    AppPath(merchant_transaction_id): AppPath<String>,
) -> Redirect {
    let base = state.config().frontend_redirect_url.trim_end_matches('/');
    let outcome = settle_phonepe(&state, &merchant_transaction_id).await;
    if let Err(e) = &outcome {
        tracing::warn!(
            %merchant_transaction_id,
            error = %e,
            "PhonePe payment not completed"
        );
    }
    Redirect::to(&checkout_redirect(base, &outcome))
}

/// Storefront page for a settled PhonePe payment.
fn checkout_redirect(base: &str, outcome: &Result<Option<OrderId>>) -> String {
    match outcome {
        Ok(Some(order_id)) => format!("{base}/checkout/success?id={order_id}"),
        Ok(None) => format!("{base}/checkout/success"),
        Err(_) => format!("{base}/checkout/failed"),
    }
}

/// Ledger status and PhonePe transaction id to record. Only a paid
/// transaction keeps the gateway's id.
fn ledger_entry(status: &PaymentStatus) -> (TransactionStatus, Option<&str>) {
    if status.is_paid() {
        (TransactionStatus::Success, status.transaction_id())
    } else {
        (TransactionStatus::Failed, None)
    }
}

/// Record the gateway's verdict. `Ok` carries the paid order, if the
/// transaction was tied to one.
///
/// A paid status with no matching ledger row still counts as a success.
async fn settle_phonepe(state: &AppState, merchant_transaction_id: &str) -> Result<Option<OrderId>> {
    let client = phonepe(state)?;
    let status = client.status(merchant_transaction_id).await?;
    let transactions = TransactionRepository::new(state.pool());
    let (ledger_status, transaction_id) = ledger_entry(&status);

    let settled = transactions
        .settle(merchant_transaction_id, ledger_status, transaction_id, &status.raw)
        .await;

    if !status.is_paid() {
        match settled {
            Ok(_) | Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        return Err(AppError::BadRequest(format!(
            "PhonePe reported {}",
            status.code
        )));
    }

    let transaction = match settled {
        Ok(transaction) => transaction,
        Err(RepositoryError::NotFound) => {
            tracing::warn!(
                %merchant_transaction_id,
                "PhonePe payment with no transaction record"
            );
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let Some(order_id) = transaction.order_id else {
        return Ok(None);
    };

    let now = Utc::now();
    let result = PaymentResult {
        id: transaction_id.map(String::from),
        status: Some("COMPLETED".to_string()),
        update_time: Some(now.to_rfc3339()),
        email_address: None,
    };
    OrderRepository::new(state.pool())
        .mark_paid(order_id, &result, &RazorpayIds::default(), now)
        .await?;
    tracing::info!(%order_id, %merchant_transaction_id, "PhonePe payment completed");

    Ok(Some(order_id))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_razorpay_order_request_defaults_currency() {
        let req: RazorpayOrderRequest = serde_json::from_str(r#"{"amount": 499}"#).unwrap();
        assert_eq!(req.currency, "INR");
        assert_eq!(req.amount, Decimal::from(499));
        assert!(req.receipt.is_none());
    }

    #[test]
    fn test_verify_request_mixes_snake_and_camel_case() {
        let req: RazorpayVerifyRequest = serde_json::from_str(
            r#"{
                "razorpay_order_id": "order_N1",
                "razorpay_payment_id": "pay_N1",
                "razorpay_signature": "abc",
                "orderId": 42
            }"#,
        )
        .unwrap();
        assert_eq!(req.order_id, OrderId::new(42));
        assert_eq!(req.razorpay_payment_id, "pay_N1");
    }

    #[test]
    fn test_payment_intent_request_defaults_currency() {
        let req: PaymentIntentRequest = serde_json::from_str(r#"{"amount": 50000}"#).unwrap();
        assert_eq!(req.currency, "inr");
    }

    fn status_from(body: serde_json::Value) -> PaymentStatus {
        let mut status: PaymentStatus = serde_json::from_value(body.clone()).unwrap();
        status.raw = body;
        status
    }

    #[test]
    fn test_failed_phonepe_payment_keeps_no_transaction_id() {
        let status = status_from(json!({
            "success": false,
            "code": "PAYMENT_ERROR",
            "data": { "transactionId": "T2410" }
        }));
        assert_eq!(ledger_entry(&status), (TransactionStatus::Failed, None));
    }

    #[test]
    fn test_paid_phonepe_payment_records_transaction_id() {
        let status = status_from(json!({
            "success": true,
            "code": "PAYMENT_SUCCESS",
            "data": { "transactionId": "T2411" }
        }));
        assert_eq!(
            ledger_entry(&status),
            (TransactionStatus::Success, Some("T2411"))
        );
    }

    #[test]
    fn test_checkout_redirects() {
        let base = "https://hridved.in";
        assert_eq!(
            checkout_redirect(base, &Ok(Some(OrderId::new(7)))),
            "https://hridved.in/checkout/success?id=7"
        );
        // Paid without a ledger row still lands on the success page
        assert_eq!(
            checkout_redirect(base, &Ok(None)),
            "https://hridved.in/checkout/success"
        );
        let declined = Err(AppError::BadRequest("PhonePe reported PAYMENT_ERROR".to_string()));
        assert_eq!(
            checkout_redirect(base, &declined),
            "https://hridved.in/checkout/failed"
        );
    }

    #[test]
    fn test_stripe_config_serializes_public_key() {
        let body = serde_json::to_value(StripeConfigResponse {
            public_key: "pk_test_1".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "publicKey": "pk_test_1" }));
    }
}
