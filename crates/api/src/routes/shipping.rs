//! Shipping routes (`/api/shipping`): rates, manual shipments, tracking.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hridved_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::services::fship::{
    self, DEFAULT_WEIGHT, FshipError, ShipmentOutcome, ShippingOption, default_options,
    quoted_options,
};
use crate::state::AppState;

/// Pincodes checked by the health route.
const HEALTH_PINCODES: [&str; 2] = ["560001", "400001"];

#[derive(Debug, Deserialize)]
pub struct ServiceabilityRequest {
    #[serde(default)]
    pub pincode: String,
    pub weight: Option<Decimal>,
    pub cod: Option<Decimal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceabilityResponse {
    pub serviceable: bool,
    pub shipping_options: Vec<ShippingOption>,
    pub pincode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

/// POST /api/shipping/serviceability
///
/// Never fails: when FShip errors or declines the pincode the flat rates are
/// returned with a warning.
pub async fn serviceability(
    State(state): State<AppState>,
    AppJson(req): AppJson<ServiceabilityRequest>,
) -> AppJson<ServiceabilityResponse> {
    let pincode = req.pincode.trim().to_string();
    let quote = state
        .fship()
        .check_serviceability(
            &pincode,
            req.weight.unwrap_or(DEFAULT_WEIGHT),
            req.cod.unwrap_or(Decimal::ZERO),
        )
        .await;

    let (options, warning) = match quote.as_ref().map(quoted_options) {
        Ok(Some(options)) => (options, None),
        Ok(None) => {
            tracing::info!(%pincode, "Pincode not serviceable, using flat rates");
            (default_options(), Some("Standard shipping rates applied"))
        }
        Err(e) => {
            tracing::warn!(%pincode, error = %e, "FShip serviceability failed, using flat rates");
            (default_options(), Some("Standard shipping rates applied"))
        }
    };

    AppJson(ServiceabilityResponse {
        serviceable: true,
        shipping_options: options,
        pincode,
        warning,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
    pub order_id: OrderId,
}

/// POST /api/shipping/create-shipment
///
/// # Errors
///
/// Returns 404 "Order not found", 400 "Shipment already created", or 502 if
/// FShip cannot be reached.
pub async fn create_shipment(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(req): AppJson<CreateShipmentRequest>,
) -> Result<Response> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(req.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let response = match state.fship().create_order(&order).await? {
        ShipmentOutcome::Already => {
            return Err(AppError::BadRequest("Shipment already created".to_string()));
        }
        ShipmentOutcome::Submitted(response) => response,
    };

    let Some(info) = fship::shipment_info(&response) else {
        tracing::warn!(order_id = %order.id, response = %response, "FShip declined shipment");
        return Ok((
            StatusCode::BAD_REQUEST,
            AppJson(json!({ "message": "Failed to create shipment", "details": response })),
        )
            .into_response());
    };

    orders.set_shipment(order.id, &info).await?;
    tracing::info!(
        order_id = %order.id,
        admin_id = %admin.id,
        shipment_id = %info.shipment_id,
        "Shipment created"
    );

    Ok(AppJson(json!({ "message": "Shipment Created", "shipment": response })).into_response())
}

/// GET /api/shipping/track/{orderId}
///
/// # Errors
///
/// Returns 404 "Order or Tracking ID not found", 403 for another user's
/// order, 502 if FShip cannot be reached.
pub async fn track(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<OrderId>,
) -> Result<AppJson<Value>> {
    let order = OrderRepository::new(state.pool()).get_by_id(id).await?;
    let Some((order, tracking_id)) =
        order.and_then(|o| o.tracking_id.clone().map(|t| (o, t)))
    else {
        return Err(AppError::NotFound(
            "Order or Tracking ID not found".to_string(),
        ));
    };
    if order.user_id != user.id && !user.is_admin {
        return Err(AppError::Forbidden(
            "Not authorized to view this order".to_string(),
        ));
    }

    let events = state.fship().track(&tracking_id).await?;
    Ok(AppJson(events))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PincodeCheck {
    pub pincode: &'static str,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl PincodeCheck {
    fn from_result(pincode: &'static str, result: std::result::Result<Value, FshipError>) -> Self {
        match result {
            Ok(data) => Self {
                pincode,
                status: "success",
                data: Some(data),
                error: None,
                details: None,
            },
            Err(e) => Self {
                pincode,
                status: "failed",
                data: None,
                error: Some(e.to_string()),
                details: e.details().cloned(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub api_configured: bool,
    pub base_url: String,
    pub status: &'static str,
    pub tests: Vec<PincodeCheck>,
}

impl HealthResponse {
    fn new(api_configured: bool, base_url: String, tests: Vec<PincodeCheck>) -> Self {
        let healthy = tests.iter().any(|t| t.status == "success");
        Self {
            message: "FShip API Health Check",
            timestamp: Utc::now().to_rfc3339(),
            api_configured,
            base_url,
            status: if healthy { "healthy" } else { "unhealthy" },
            tests,
        }
    }
}

/// GET /api/shipping/health
///
/// Asks FShip live for each pincode; cached quotes are never reported.
pub async fn health(State(state): State<AppState>) -> AppJson<HealthResponse> {
    let client = state.fship();
    let mut tests = Vec::with_capacity(HEALTH_PINCODES.len());
    for pincode in HEALTH_PINCODES {
        let result = client
            .live_serviceability(pincode, DEFAULT_WEIGHT, Decimal::ZERO)
            .await;
        tests.push(PincodeCheck::from_result(pincode, result));
    }

    AppJson(HealthResponse::new(
        client.is_configured(),
        client.base_url().to_string(),
        tests,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serviceability_request_defaults() {
        let req: ServiceabilityRequest = serde_json::from_str(r#"{"pincode": "110001"}"#).unwrap();
        assert_eq!(req.pincode, "110001");
        assert!(req.weight.is_none());
        assert!(req.cod.is_none());
    }

    #[test]
    fn test_fallback_response_shape() {
        let body = serde_json::to_value(ServiceabilityResponse {
            serviceable: true,
            shipping_options: default_options(),
            pincode: "110001".to_string(),
            warning: Some("Standard shipping rates applied"),
        })
        .unwrap();
        assert_eq!(body["serviceable"], true);
        assert_eq!(body["shippingOptions"][0]["charge"], 40);
        assert_eq!(body["warning"], "Standard shipping rates applied");
    }

    #[test]
    fn test_health_is_healthy_when_any_check_succeeds() {
        let tests = vec![
            PincodeCheck::from_result(
                "560001",
                Err(FshipError::Response("non-JSON body".to_string())),
            ),
            PincodeCheck::from_result("400001", Ok(json!({"serviceable": true}))),
        ];
        let health = HealthResponse::new(true, "https://api.fship.in/v1".to_string(), tests);
        assert_eq!(health.status, "healthy");
        assert_eq!(health.tests[0].status, "failed");
    }

    #[test]
    fn test_health_is_unhealthy_when_all_checks_fail() {
        let tests = vec![PincodeCheck::from_result(
            "560001",
            Err(FshipError::Api {
                status: 401,
                body: json!({"message": "unauthorized"}),
            }),
        )];
        let health = HealthResponse::new(false, String::new(), tests);
        assert_eq!(health.status, "unhealthy");
        assert_eq!(health.tests[0].details, Some(json!({"message": "unauthorized"})));
    }
}
