//! CORS for the storefront and admin frontends.
//!
//! Exact origins come from configuration; any `https://*.vercel.app` preview
//! deployment is accepted as well. Credentials are allowed so the `jwt`
//! cookie travels with cross-origin requests.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
    request::Parts,
};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREVIEW_SUFFIX: &str = ".vercel.app";

/// Build the CORS layer for the configured origin allowlist.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Arc<[String]> = origins.iter().map(|o| o.trim_end_matches('/').to_string()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .is_ok_and(|origin| is_allowed_origin(origin, &allowed))
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

fn is_allowed_origin(origin: &str, allowed: &[String]) -> bool {
    if allowed.iter().any(|a| a == origin) {
        return true;
    }
    origin
        .strip_prefix("https://")
        .and_then(|host| host.strip_suffix(PREVIEW_SUFFIX))
        .is_some_and(|sub| !sub.is_empty() && !sub.contains(['/', ':']))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist() -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "https://www.hridved.in".to_string(),
        ]
    }

    #[test]
    fn test_exact_origins() {
        assert!(is_allowed_origin("https://www.hridved.in", &allowlist()));
        assert!(is_allowed_origin("http://localhost:5173", &allowlist()));
        assert!(!is_allowed_origin("https://evil.example", &allowlist()));
        assert!(!is_allowed_origin("http://localhost:3000", &allowlist()));
    }

    #[test]
    fn test_vercel_previews() {
        assert!(is_allowed_origin("https://hridved-git-main.vercel.app", &allowlist()));
        assert!(!is_allowed_origin("http://hridved.vercel.app", &allowlist()));
        assert!(!is_allowed_origin("https://.vercel.app", &allowlist()));
        assert!(!is_allowed_origin("https://vercel.app.evil.example", &allowlist()));
        assert!(!is_allowed_origin("https://evil.example/x.vercel.app", &allowlist()));
    }
}
