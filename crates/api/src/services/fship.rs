//! FShip shipping aggregator client.
//!
//! Serviceability answers are cached per `(pincode, weight, cod)` for ten
//! minutes using `moka`. Shipment creation and tracking are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use hridved_core::DeliveryOption;

use crate::config::FshipConfig;
use crate::models::{Order, ShipmentInfo};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const SERVICEABILITY_TTL: Duration = Duration::from_secs(600);

/// Parcel weight in kilograms used for every shipment and quote.
pub const DEFAULT_WEIGHT: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Errors that can occur when talking to FShip.
#[derive(Debug, Error)]
pub enum FshipError {
    /// HTTP request failed (including the 15 s timeout).
    #[error("FShip request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// FShip answered with a non-success status.
    #[error("FShip returned {status}")]
    Api { status: u16, body: Value },

    /// FShip answered with something other than JSON.
    #[error("FShip response error: {0}")]
    Response(String),

    /// The HTTP client could not be built.
    #[error("FShip client error: {0}")]
    Client(String),
}

impl FshipError {
    /// Body FShip sent with an error status, for diagnostics.
    #[must_use]
    pub const fn details(&self) -> Option<&Value> {
        match self {
            Self::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct QuoteKey {
    pincode: String,
    weight: Decimal,
    cod: Decimal,
}

/// FShip API client.
#[derive(Clone)]
pub struct FshipClient {
    inner: Arc<FshipClientInner>,
}

struct FshipClientInner {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    quotes: Cache<QuoteKey, Value>,
}

impl std::fmt::Debug for FshipClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FshipClient")
            .field("base_url", &self.inner.base_url)
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Outcome of a shipment request.
#[derive(Debug, Clone)]
pub enum ShipmentOutcome {
    /// The order already has a shipment; nothing was sent.
    Already,
    /// FShip's answer, successful or not.
    Submitted(Value),
}

#[derive(Debug, Serialize)]
struct ShipmentProduct {
    name: String,
    qty: i32,
    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,
    sku: String,
}

#[derive(Debug, Serialize)]
struct CreateShipment {
    order_id: String,
    consignee_name: String,
    consignee_phone: String,
    consignee_address: String,
    consignee_city: String,
    consignee_state: String,
    consignee_pincode: String,
    payment_mode: &'static str,
    #[serde(with = "rust_decimal::serde::float")]
    cod_amount: Decimal,
    products: Vec<ShipmentProduct>,
    #[serde(with = "rust_decimal::serde::float")]
    weight: Decimal,
}

impl CreateShipment {
    fn from_order(order: &Order) -> Self {
        let address = &order.shipping_address;
        let consignee_address = if address.landmark.trim().is_empty() {
            address.house_number.clone()
        } else {
            format!("{}, {}", address.house_number, address.landmark)
        };

        Self {
            order_id: order.id.to_string(),
            consignee_name: address.full_name.clone(),
            consignee_phone: address.mobile_number.clone(),
            consignee_address,
            consignee_city: address.city.clone(),
            consignee_state: address.state.clone(),
            consignee_pincode: address.pincode.clone(),
            payment_mode: order.payment_method.shipping_mode(),
            cod_amount: order.cod_amount(),
            products: order
                .order_items
                .iter()
                .map(|item| ShipmentProduct {
                    name: item.name.clone(),
                    qty: item.qty,
                    price: item.price,
                    sku: item.product_id.to_string(),
                })
                .collect(),
            weight: DEFAULT_WEIGHT,
        }
    }
}

impl FshipClient {
    /// Create a new FShip client.
    ///
    /// # Errors
    ///
    /// Returns `FshipError::Client` if the HTTP client cannot be built.
    pub fn new(config: &FshipConfig) -> Result<Self, FshipError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FshipError::Client(e.to_string()))?;

        let quotes = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(SERVICEABILITY_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(FshipClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                quotes,
            }),
        })
    }

    /// Whether an API key is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.api_key.is_some()
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<Value, FshipError> {
        let url = format!("{}{path}", self.inner.base_url);
        debug!(%url, "FShip request");

        let mut request = self.inner.client.post(&url).json(body);
        if let Some(key) = &self.inner.api_key {
            request = request.header("signature", key.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, path, "FShip returned non-success status");
            return Err(FshipError::Api {
                status: status.as_u16(),
                body,
            });
        }
        if body.is_string() {
            return Err(FshipError::Response("non-JSON body".to_string()));
        }
        Ok(body)
    }

    /// Book a shipment for a paid order.
    ///
    /// # Errors
    ///
    /// Returns `FshipError` if the request fails or FShip answers non-2xx.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn create_order(&self, order: &Order) -> Result<ShipmentOutcome, FshipError> {
        if order.shipment_id.is_some() {
            return Ok(ShipmentOutcome::Already);
        }
        let body = self
            .post("/orders/create", &CreateShipment::from_order(order))
            .await?;
        Ok(ShipmentOutcome::Submitted(body))
    }

    /// Ask whether a pincode is serviceable, and at what rates.
    ///
    /// # Errors
    ///
    /// Returns `FshipError` if the request fails or FShip answers non-2xx.
    #[instrument(skip(self))]
    pub async fn check_serviceability(
        &self,
        pincode: &str,
        weight: Decimal,
        cod: Decimal,
    ) -> Result<Value, FshipError> {
        let key = QuoteKey {
            pincode: pincode.to_string(),
            weight: weight.normalize(),
            cod: cod.normalize(),
        };
        if let Some(cached) = self.inner.quotes.get(&key).await {
            debug!("Cache hit for serviceability");
            return Ok(cached);
        }

        let quote = self.live_serviceability(pincode, weight, cod).await?;
        self.inner.quotes.insert(key, quote.clone()).await;
        Ok(quote)
    }

    /// Serviceability straight from FShip, bypassing the quote cache.
    ///
    /// # Errors
    ///
    /// Returns `FshipError` if the request fails or FShip answers non-2xx.
    #[instrument(skip(self))]
    pub async fn live_serviceability(
        &self,
        pincode: &str,
        weight: Decimal,
        cod: Decimal,
    ) -> Result<Value, FshipError> {
        let body = serde_json::json!({
            "pincode": pincode,
            "weight": rust_decimal::prelude::ToPrimitive::to_f64(&weight),
            "cod": rust_decimal::prelude::ToPrimitive::to_f64(&cod),
        });
        self.post("/courier/serviceability", &body).await
    }

    /// Fetch tracking events for an AWB number.
    ///
    /// # Errors
    ///
    /// Returns `FshipError` if the request fails or FShip answers non-2xx.
    #[instrument(skip(self))]
    pub async fn track(&self, awb_number: &str) -> Result<Value, FshipError> {
        self.post(
            "/orders/tracking",
            &serde_json::json!({ "awb_number": awb_number }),
        )
        .await
    }
}

/// Courier details from a successful `/orders/create` answer.
///
/// Returns `None` unless FShip reported `success: true` with a shipment id.
#[must_use]
pub fn shipment_info(response: &Value) -> Option<ShipmentInfo> {
    if response.get("success").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let text = |key: &str| {
        response.get(key).and_then(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    };
    Some(ShipmentInfo {
        shipment_id: text("shipment_id")?,
        tracking_id: text("awb_number"),
        courier_name: text("courier_name"),
    })
}

/// A delivery option offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingOption {
    #[serde(rename = "type")]
    pub kind: DeliveryOption,
    pub days: &'static str,
    pub charge: i64,
    pub description: &'static str,
}

impl ShippingOption {
    fn new(kind: DeliveryOption, charge: i64) -> Self {
        Self {
            kind,
            days: kind.days(),
            charge,
            description: kind.description(),
        }
    }
}

/// Both delivery options at their flat charges.
#[must_use]
pub fn default_options() -> Vec<ShippingOption> {
    [DeliveryOption::Standard, DeliveryOption::Express]
        .into_iter()
        .map(|kind| ShippingOption::new(kind, kind.default_charge()))
        .collect()
}

/// Delivery options priced from a serviceability answer.
///
/// Returns `None` when FShip says the pincode is not serviceable. Quoted
/// charges are rounded and never exceed the flat charge; a missing or zero
/// quote uses the flat charge.
#[must_use]
pub fn quoted_options(quote: &Value) -> Option<Vec<ShippingOption>> {
    if quote.get("serviceable").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let charge = |key: &str, kind: DeliveryOption| {
        let ceiling = kind.default_charge();
        #[allow(clippy::cast_possible_truncation)]
        let quoted = quote
            .get(key)
            .and_then(Value::as_f64)
            .filter(|c| c.is_finite() && *c != 0.0)
            .map_or(ceiling, |c| c.round() as i64);
        quoted.min(ceiling)
    };
    Some(vec![
        ShippingOption::new(
            DeliveryOption::Standard,
            charge("standard_charge", DeliveryOption::Standard),
        ),
        ShippingOption::new(
            DeliveryOption::Express,
            charge("express_charge", DeliveryOption::Express),
        ),
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hridved_core::PaymentMethod;
    use serde_json::json;

    use super::*;
    use crate::models::order::tests::sample_order;

    #[test]
    fn test_default_options() {
        let options = default_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].charge, 40);
        assert_eq!(options[1].charge, 100);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json[0]["type"], "Standard");
        assert_eq!(json[1]["days"], "1-2");
        assert_eq!(json[1]["description"], "Express Delivery");
    }

    #[test]
    fn test_quoted_options_capped_and_rounded() {
        let options =
            quoted_options(&json!({"standard_charge": 32.6, "express_charge": 180})).unwrap();
        assert_eq!(options[0].charge, 33);
        assert_eq!(options[1].charge, 100);
    }

    #[test]
    fn test_quoted_options_missing_or_zero_use_flat() {
        let options = quoted_options(&json!({"standard_charge": 0})).unwrap();
        assert_eq!(options[0].charge, 40);
        assert_eq!(options[1].charge, 100);
    }

    #[test]
    fn test_quoted_options_not_serviceable() {
        assert!(quoted_options(&json!({"serviceable": false})).is_none());
    }

    #[test]
    fn test_shipment_info() {
        let info = shipment_info(&json!({
            "success": true,
            "shipment_id": 99812,
            "awb_number": "AWB123",
            "courier_name": "Delhivery"
        }))
        .unwrap();
        assert_eq!(info.shipment_id, "99812");
        assert_eq!(info.tracking_id.as_deref(), Some("AWB123"));
        assert_eq!(info.courier_name.as_deref(), Some("Delhivery"));

        assert!(shipment_info(&json!({"success": false, "shipment_id": "1"})).is_none());
        assert!(shipment_info(&json!({"success": true})).is_none());
    }

    #[test]
    fn test_create_shipment_payload() {
        let mut order = sample_order();
        order.payment_method = PaymentMethod::Cod;
        let json = serde_json::to_value(CreateShipment::from_order(&order)).unwrap();

        assert_eq!(json["order_id"], "42");
        assert_eq!(json["consignee_name"], "Asha Verma");
        assert_eq!(json["consignee_address"], "12 MG Road, Near City Park");
        assert_eq!(json["payment_mode"], "COD");
        assert_eq!(json["cod_amount"], 1090.0);
        assert_eq!(json["products"][0]["sku"], "5");
        assert_eq!(json["products"][0]["qty"], 2);
        assert_eq!(json["weight"], 0.5);
    }

    #[test]
    fn test_prepaid_shipment_collects_nothing() {
        let json = serde_json::to_value(CreateShipment::from_order(&sample_order())).unwrap();
        assert_eq!(json["payment_mode"], "Prepaid");
        assert_eq!(json["cod_amount"], 0.0);
    }

    #[tokio::test]
    async fn test_live_check_ignores_cached_quote() {
        // Nothing listens on port 1, so any real request fails
        let client = FshipClient::new(&FshipConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
        })
        .unwrap();
        let key = QuoteKey {
            pincode: "560001".to_string(),
            weight: DEFAULT_WEIGHT.normalize(),
            cod: Decimal::ZERO.normalize(),
        };
        client
            .inner
            .quotes
            .insert(key, json!({"serviceable": true}))
            .await;

        let cached = client
            .check_serviceability("560001", DEFAULT_WEIGHT, Decimal::ZERO)
            .await
            .unwrap();
        assert_eq!(cached["serviceable"], true);

        let live = client
            .live_serviceability("560001", DEFAULT_WEIGHT, Decimal::ZERO)
            .await;
        assert!(matches!(live, Err(FshipError::Request(_))));
    }

    #[test]
    fn test_default_weight() {
        assert_eq!(DEFAULT_WEIGHT.to_string(), "0.5");
    }
}
