//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - "API is running..."
//! GET  /health, /health/ready              - Liveness and readiness
//!
//! # Accounts
//! /api/users                               - Register, login, logout, profile, wishlist, admin CRUD
//! /api/auth                                - Google/Facebook token exchange, OAuth status
//!
//! # Catalog
//! /api/products                            - Listing, top rated, detail, reviews, admin CRUD
//! /api/categories                          - Categories (admin writes)
//!
//! # Shopping
//! /api/cart                                - Persistent cart
//! /api/addresses                           - Saved addresses
//! /api/checkout                            - Address-based checkout, Razorpay confirmation
//! /api/orders                              - Orders, pay, deliver
//! /api/coupons                             - Promo codes
//!
//! # Payments and shipping
//! /api/razorpay                            - Order, verify, public key
//! /api/config/stripe                       - Stripe publishable key
//! /api/payment                             - Stripe intents, PhonePe create and callback
//! /api/shipping                            - FShip rates, shipments, tracking
//!
//! # Content
//! /api/blogs                               - Blog CMS
//! /api/about, /api/content, /api/tips      - Site content
//! /api/contact                             - Contact form
//! /api/upload                              - Image uploads (admin)
//!
//! # Consultations
//! /api/doctors                             - Doctor profiles
//! /api/doctor-bookings                     - Paid consultation bookings
//! /api/admin/stats                         - Dashboard
//! ```

pub mod addresses;
pub mod admin;
pub mod blogs;
pub mod bookings;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod content;
pub mod coupons;
pub mod doctors;
pub mod oauth;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shipping;
pub mod upload;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri},
    routing::{get, post, put},
};

use crate::error::AppError;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(users::register)
                .layer(auth_rate_limiter())
                .get(users::list),
        )
        .route("/auth", post(users::login).layer(auth_rate_limiter()))
        .route("/logout", post(users::logout))
        .route("/profile", get(users::profile).put(users::update_profile))
        .route("/wishlist", get(users::wishlist))
        .route(
            "/wishlist/{product_id}",
            post(users::add_to_wishlist).delete(users::remove_from_wishlist),
        )
        .route(
            "/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
}

/// Create the OAuth routes router.
pub fn oauth_routes() -> Router<AppState> {
    Router::new()
        .route("/google", post(oauth::google).layer(auth_rate_limiter()))
        .route("/facebook", post(oauth::facebook).layer(auth_rate_limiter()))
        .route("/status", get(oauth::status))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/top", get(products::top))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/reviews", post(products::create_review))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::show).post(cart::add_item).delete(cart::clear),
        )
        .route("/{product_id}", axum::routing::delete(cart::remove_item))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(addresses::list).post(addresses::create))
        .route(
            "/{id}",
            get(addresses::show)
                .put(addresses::update)
                .delete(addresses::delete),
        )
        .route("/{id}/default", put(addresses::set_default))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/create-order", post(checkout::create_order))
        .route("/order/{id}", get(checkout::show_order))
        .route("/confirm-payment/{id}", put(checkout::confirm_payment))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/mine", get(orders::mine))
        .route("/{id}", get(orders::show))
        .route("/{id}/pay", put(orders::pay))
        .route("/{id}/deliver", put(orders::deliver))
}

/// Create the Razorpay routes router.
pub fn razorpay_routes() -> Router<AppState> {
    Router::new()
        .route("/order", post(payments::razorpay_order))
        .route("/verify", post(payments::razorpay_verify))
        .route("/key", get(payments::razorpay_key))
}

/// Create the Stripe and PhonePe routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route("/create", post(payments::phonepe_create))
        .route(
            "/status/{merchant_transaction_id}",
            post(payments::phonepe_status),
        )
}

/// Create the shipping routes router.
pub fn shipping_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/serviceability",
            post(shipping::serviceability).layer(api_rate_limiter()),
        )
        .route("/create-shipment", post(shipping::create_shipment))
        .route("/track/{order_id}", get(shipping::track))
        .route("/health", get(shipping::health))
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::list).post(coupons::create))
        .route(
            "/validate",
            post(coupons::validate).layer(api_rate_limiter()),
        )
        .route("/{id}", put(coupons::update).delete(coupons::delete))
}

/// Create the blog routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blogs::list).post(blogs::create))
        .route("/categories", get(blogs::categories))
        .route("/admin/all", get(blogs::admin_list))
        .route(
            "/{id}",
            get(blogs::show).put(blogs::update).delete(blogs::delete),
        )
        .route("/{id}/related", get(blogs::related))
        .route("/{id}/toggle-status", put(blogs::toggle_status))
}

/// Create the tip routes router.
pub fn tip_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(content::tips).post(content::create_tip))
        .route(
            "/{id}",
            get(content::tip)
                .put(content::update_tip)
                .delete(content::delete_tip),
        )
}

/// Create the upload routes router.
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(upload::single))
        .route("/multiple", post(upload::multiple))
}

/// Create the doctor routes router.
pub fn doctor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(doctors::list).post(doctors::create))
        .route(
            "/{id}",
            get(doctors::show)
                .put(doctors::update)
                .delete(doctors::delete),
        )
}

/// Create the consultation booking routes router.
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bookings::mine))
        .route("/doctor-booking", post(bookings::initiate))
        .route("/verify-doctor-booking", post(bookings::verify))
        .route("/admin/all", get(bookings::admin_list))
        .route("/admin/{id}", put(bookings::admin_update))
        .route("/{id}", get(bookings::show))
        .route("/{id}/cancel", put(bookings::cancel))
}

/// Create every `/api` route group.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/auth", oauth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/addresses", address_routes())
        .nest("/checkout", checkout_routes())
        .nest("/orders", order_routes())
        .nest("/razorpay", razorpay_routes())
        .route("/config/stripe", get(payments::stripe_config))
        .nest("/payment", payment_routes())
        .nest("/shipping", shipping_routes())
        .nest("/coupons", coupon_routes())
        .nest("/blogs", blog_routes())
        .route("/about", get(content::about).put(content::update_about))
        .route("/content", get(content::sections))
        .route("/content/{section}", put(content::update_section))
        .nest("/tips", tip_routes())
        .route(
            "/contact",
            post(content::create_contact)
                .layer(api_rate_limiter())
                .get(content::contacts),
        )
        .nest("/upload", upload_routes())
        .nest("/doctors", doctor_routes())
        .nest("/doctor-bookings", booking_routes())
        .route("/admin/stats", get(admin::stats))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .fallback(not_found)
}

async fn root() -> &'static str {
    "API is running..."
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Not Found - {}", uri.path()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, header::CONTENT_TYPE};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::tests::test_config;

    /// Router over a pool that never connects; only paths that stop before
    /// the database can be exercised.
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/hridved_test")
            .unwrap();
        let state = AppState::new(test_config(), pool).unwrap();
        crate::app(state)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get_path(path: &str) -> (StatusCode, Vec<u8>) {
        send(Request::get(path).body(Body::empty()).unwrap()).await
    }

    fn json(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (status, body) = get_path("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"API is running...");

        let (status, body) = get_path("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let (status, body) = get_path("/api/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body = json(&body);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not Found - /api/nothing-here");
    }

    #[tokio::test]
    async fn test_protected_route_without_token() {
        let (status, body) = get_path("/api/users/profile").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&body)["message"], "Not authorized, no token");
    }

    #[tokio::test]
    async fn test_bad_numeric_id() {
        let (status, body) = get_path("/api/products/not-a-number").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["message"], "Invalid resource ID format");
    }

    #[tokio::test]
    async fn test_unconfigured_gateways() {
        let (status, body) = get_path("/api/razorpay/key").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json(&body)["message"], "Razorpay is not configured");

        let (status, body) = get_path("/api/config/stripe").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["publicKey"], "");
    }

    #[tokio::test]
    async fn test_oauth_status_without_credentials() {
        let (status, body) = get_path("/api/auth/status").await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["googleClientId"], "NOT_CONFIGURED");
        assert_eq!(body["facebookAppId"], "NOT_CONFIGURED");
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let request = Request::post("/api/coupons/validate")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.5")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_security_headers_and_request_id() {
        let response = app()
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let headers = response.headers();
        assert_eq!(headers["x-request-id"], "req-123");
        assert_eq!(headers["x-content-type-options"], "nosniff");
        assert_eq!(headers["x-frame-options"], "DENY");
    }
}
