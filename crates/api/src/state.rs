//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::cloudinary::CloudinaryClient;
use crate::services::fship::{FshipClient, FshipError};
use crate::services::oauth::OAuthClient;
use crate::services::payments::{PhonePeClient, RazorpayClient, StripeClient};

/// Timeout for outbound gateway and OAuth calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("fship client error: {0}")]
    Fship(#[from] FshipError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections, configuration and the
/// vendor clients. Optional integrations are `None` when their
/// credentials aren't configured.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    razorpay: Option<RazorpayClient>,
    stripe: Option<StripeClient>,
    phonepe: Option<PhonePeClient>,
    fship: FshipClient,
    oauth: OAuthClient,
    cloudinary: Option<CloudinaryClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("hridved-api/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let razorpay = config
            .razorpay
            .as_ref()
            .map(|c| RazorpayClient::new(http.clone(), c));
        let stripe = config
            .stripe
            .secret_key
            .clone()
            .map(|key| StripeClient::new(http.clone(), key));
        let phonepe = config
            .phonepe
            .as_ref()
            .map(|c| PhonePeClient::new(http.clone(), c));
        let fship = FshipClient::new(&config.fship)?;
        let cloudinary = config
            .cloudinary
            .as_ref()
            .map(|c| CloudinaryClient::new(http.clone(), c));
        let oauth = OAuthClient::new(http);

        if razorpay.is_none() {
            tracing::warn!("Razorpay is not configured; Razorpay checkout is disabled");
        }
        if phonepe.is_none() {
            tracing::warn!("PhonePe is not configured; PhonePe checkout is disabled");
        }
        if !fship.is_configured() {
            tracing::warn!("FSHIP_API_KEY is not set; shipping calls will be unsigned");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                razorpay,
                stripe,
                phonepe,
                fship,
                oauth,
                cloudinary,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn razorpay(&self) -> Option<&RazorpayClient> {
        self.inner.razorpay.as_ref()
    }

    #[must_use]
    pub fn stripe(&self) -> Option<&StripeClient> {
        self.inner.stripe.as_ref()
    }

    #[must_use]
    pub fn phonepe(&self) -> Option<&PhonePeClient> {
        self.inner.phonepe.as_ref()
    }

    #[must_use]
    pub fn fship(&self) -> &FshipClient {
        &self.inner.fship
    }

    #[must_use]
    pub fn oauth(&self) -> &OAuthClient {
        &self.inner.oauth
    }

    #[must_use]
    pub fn cloudinary(&self) -> Option<&CloudinaryClient> {
        self.inner.cloudinary.as_ref()
    }
}
