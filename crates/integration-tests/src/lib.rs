//! End-to-end tests for the Hridved API.
//!
//! # Running Tests
//!
//! ```bash
//! # Apply migrations and start the server
//! cargo run -p hridved-cli -- migrate
//! cargo run -p hridved-api
//!
//! # Run the ignored tests against it
//! API_BASE_URL=http://localhost:5000 cargo test -p hridved-integration-tests -- --ignored
//! ```
//!
//! Every test is `#[ignore]`d so a plain `cargo test` never needs a server.

use reqwest::Client;

/// Base URL of the API under test (`API_BASE_URL`, default port 5000).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Full URL for an `/api` path.
#[must_use]
pub fn api_url(path: &str) -> String {
    format!("{}/api{path}", api_base_url())
}

/// A client that keeps the `jwt` cookie between requests.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A fresh address so repeated runs never collide.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_email_is_valid() {
        let email = unique_email();
        assert!(hridved_core::Email::parse(&email).is_ok());
        assert_ne!(email, unique_email());
    }
}
