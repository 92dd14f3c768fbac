//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one transaction per request)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (origin allowlist plus `*.vercel.app` previews)
//! 5. Security headers
//! 6. Rate limiting (governor), on auth and public write endpoints only
//!
//! Authentication is not a layer: handlers opt in through the
//! [`RequireAuth`], [`RequireAdmin`] and [`OptionalAuth`] extractors.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth};
pub use cors::cors_layer;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
