//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `API_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 5000)
//! - `APP_ENV` / `NODE_ENV` - `production` enables `Secure` cookies
//! - `FRONTEND_URL` - Storefront origin (default: <http://localhost:5173>)
//! - `FRONTEND_REDIRECT_URL` - Where payment callbacks land (default: `FRONTEND_URL`)
//! - `CORS_ALLOWED_ORIGINS` - Comma-separated origin allowlist
//! - `RAZORPAY_KEY_ID` + `RAZORPAY_KEY_SECRET`
//! - `STRIPE_SECRET_KEY`, `STRIPE_PUBLISHABLE_KEY`
//! - `PHONEPE_MERCHANT_ID` + `PHONEPE_SALT_KEY` + `PHONEPE_SALT_INDEX`, `PHONEPE_BASE_URL`
//! - `FSHIP_API_KEY`, `FSHIP_BASE_URL` (default: <https://api.fship.in/v1>)
//! - `GOOGLE_CLIENT_ID`, `FACEBOOK_APP_ID` - Reported by `/api/auth/status`
//! - `CLOUDINARY_CLOUD_NAME` + `CLOUDINARY_API_KEY` + `CLOUDINARY_API_SECRET`
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! Vendor groups joined with `+` must be set together or not at all.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "https://www.hridved.in",
    "https://hridved.in",
    "https://hridved-opal.vercel.app",
];

const DEFAULT_PHONEPE_BASE_URL: &str = "https://api-preprod.phonepe.com/apis/pg-sandbox/pg/v1";
const DEFAULT_FSHIP_BASE_URL: &str = "https://api.fship.in/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Whether the server runs in production (controls cookie `Secure`)
    pub production: bool,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Storefront origin, used to build PhonePe redirect URLs
    pub frontend_url: String,
    /// Base URL that payment success/failure redirects point at
    pub frontend_redirect_url: String,
    /// Exact origins allowed by CORS (`*.vercel.app` previews are always allowed)
    pub cors_origins: Vec<String>,
    pub razorpay: Option<RazorpayConfig>,
    pub stripe: StripeConfig,
    pub phonepe: Option<PhonePeConfig>,
    pub fship: FshipConfig,
    pub oauth: OAuthConfig,
    pub cloudinary: Option<CloudinaryConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Razorpay API credentials.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Stripe keys. Either may be absent; the publishable key is served to the
/// browser as-is.
#[derive(Clone, Default)]
pub struct StripeConfig {
    pub secret_key: Option<SecretString>,
    pub publishable_key: Option<String>,
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("publishable_key", &self.publishable_key)
            .finish()
    }
}

/// PhonePe standard checkout credentials.
#[derive(Clone)]
pub struct PhonePeConfig {
    pub merchant_id: String,
    pub salt_key: SecretString,
    pub salt_index: String,
    /// Base URL ending in `/pg/v1`
    pub base_url: String,
}

impl std::fmt::Debug for PhonePeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhonePeConfig")
            .field("merchant_id", &self.merchant_id)
            .field("salt_key", &"[REDACTED]")
            .field("salt_index", &self.salt_index)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// FShip shipping aggregator settings.
#[derive(Clone)]
pub struct FshipConfig {
    /// Base URL without a trailing slash
    pub base_url: String,
    /// Sent as the `signature` header; requests go out unsigned when absent
    pub api_key: Option<SecretString>,
}

impl std::fmt::Debug for FshipConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FshipConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Public OAuth client identifiers.
#[derive(Debug, Clone, Default)]
pub struct OAuthConfig {
    pub google_client_id: Option<String>,
    pub facebook_app_id: Option<String>,
}

/// Cloudinary signed-upload credentials.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// if a vendor group is only partially set, or if the JWT secret fails
    /// validation (length, placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("API_DATABASE_URL")?;
        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;

        let production = get_optional_env("APP_ENV")
            .or_else(|| get_optional_env("NODE_ENV"))
            .is_some_and(|env| env.eq_ignore_ascii_case("production"));

        let jwt_secret = get_validated_secret("JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "JWT_SECRET")?;

        let frontend_url = trim_url(&get_env_or_default("FRONTEND_URL", "http://localhost:5173"));
        let frontend_redirect_url = get_optional_env("FRONTEND_REDIRECT_URL")
            .map_or_else(|| frontend_url.clone(), |url| trim_url(&url));

        let cors_origins = get_optional_env("CORS_ALLOWED_ORIGINS").map_or_else(
            || DEFAULT_ALLOWED_ORIGINS.iter().map(ToString::to_string).collect(),
            |raw| parse_origin_list(&raw),
        );

        Ok(Self {
            database_url,
            host,
            port,
            production,
            jwt_secret,
            frontend_url,
            frontend_redirect_url,
            cors_origins,
            razorpay: RazorpayConfig::from_env()?,
            stripe: StripeConfig::from_env(),
            phonepe: PhonePeConfig::from_env()?,
            fship: FshipConfig::from_env(),
            oauth: OAuthConfig::from_env(),
            cloudinary: CloudinaryConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: get_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: get_rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some([key_id, key_secret]) =
            get_optional_group(["RAZORPAY_KEY_ID", "RAZORPAY_KEY_SECRET"])?
        else {
            return Ok(None);
        };
        Ok(Some(Self {
            key_id,
            key_secret: SecretString::from(key_secret),
        }))
    }
}

impl StripeConfig {
    fn from_env() -> Self {
        Self {
            secret_key: get_optional_env("STRIPE_SECRET_KEY").map(SecretString::from),
            publishable_key: get_optional_env("STRIPE_PUBLISHABLE_KEY"),
        }
    }
}

impl PhonePeConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some([merchant_id, salt_key, salt_index]) = get_optional_group([
            "PHONEPE_MERCHANT_ID",
            "PHONEPE_SALT_KEY",
            "PHONEPE_SALT_INDEX",
        ])?
        else {
            return Ok(None);
        };
        Ok(Some(Self {
            merchant_id,
            salt_key: SecretString::from(salt_key),
            salt_index,
            base_url: trim_url(&get_env_or_default(
                "PHONEPE_BASE_URL",
                DEFAULT_PHONEPE_BASE_URL,
            )),
        }))
    }
}

impl FshipConfig {
    fn from_env() -> Self {
        Self {
            base_url: trim_url(&get_env_or_default("FSHIP_BASE_URL", DEFAULT_FSHIP_BASE_URL)),
            api_key: get_optional_env("FSHIP_API_KEY").map(SecretString::from),
        }
    }
}

impl OAuthConfig {
    fn from_env() -> Self {
        Self {
            google_client_id: get_optional_env("GOOGLE_CLIENT_ID"),
            facebook_app_id: get_optional_env("FACEBOOK_APP_ID"),
        }
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some([cloud_name, api_key, api_secret]) = get_optional_group([
            "CLOUDINARY_CLOUD_NAME",
            "CLOUDINARY_API_KEY",
            "CLOUDINARY_API_SECRET",
        ])?
        else {
            return Ok(None);
        };
        Ok(Some(Self {
            cloud_name,
            api_key,
            api_secret: SecretString::from(api_secret),
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Read a group of variables that only make sense together.
///
/// Returns `None` when none are set and an error naming the first missing
/// key when only some are.
fn get_optional_group<const N: usize>(
    keys: [&str; N],
) -> Result<Option<[String; N]>, ConfigError> {
    let values = keys.map(get_optional_env);
    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    if let Some(missing) = keys
        .iter()
        .zip(values.iter())
        .find_map(|(key, value)| value.is_none().then_some(*key))
    {
        return Err(ConfigError::MissingEnvVar(missing.to_string()));
    }
    Ok(Some(values.map(Option::unwrap_or_default)))
}

/// Parse a sample rate in `0.0..=1.0`.
fn get_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(raw) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = raw
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ));
    }
    Ok(rate)
}

fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(trim_url)
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Validate that the JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// A complete configuration for unit tests; no vendors configured.
    pub(crate) fn test_config() -> ApiConfig {
        ApiConfig {
            database_url: SecretString::from("postgres://localhost/hridved_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            production: false,
            jwt_secret: SecretString::from("kR9$vTq2!Lm7@Zx4#Wp8&Hs3^Nb6*Jd1"),
            frontend_url: "http://localhost:5173".to_string(),
            frontend_redirect_url: "http://localhost:5173".to_string(),
            cors_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(ToString::to_string).collect(),
            razorpay: None,
            stripe: StripeConfig::default(),
            phonepe: None,
            fship: FshipConfig {
                base_url: DEFAULT_FSHIP_BASE_URL.to_string(),
                api_key: None,
            },
            oauth: OAuthConfig::default(),
            cloudinary: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-jwt-secret-here", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("abababababababababababababababab", "JWT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("kR9$vTq2!Lm7@Zx4#Wp8&Hs3^Nb6*Jd1", "JWT_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_length() {
        assert!(validate_jwt_secret(&SecretString::from("short"), "JWT_SECRET").is_err());
        assert!(validate_jwt_secret(&SecretString::from("a".repeat(32)), "JWT_SECRET").is_ok());
    }

    #[test]
    fn test_parse_origin_list() {
        let origins = parse_origin_list(" https://hridved.in/ ,, http://localhost:5173 ");
        assert_eq!(origins, vec!["https://hridved.in", "http://localhost:5173"]);
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://api.fship.in/v1//"), "https://api.fship.in/v1");
        assert_eq!(trim_url(" http://localhost:5173 "), "http://localhost:5173");
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_vendor_configs_debug_redacts_secrets() {
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_visible".to_string(),
            key_secret: SecretString::from("rzp_hidden_value"),
        };
        let phonepe = PhonePeConfig {
            merchant_id: "PGTESTPAYUAT".to_string(),
            salt_key: SecretString::from("phonepe_hidden_value"),
            salt_index: "1".to_string(),
            base_url: DEFAULT_PHONEPE_BASE_URL.to_string(),
        };

        let debug_output = format!("{razorpay:?} {phonepe:?}");

        assert!(debug_output.contains("rzp_test_visible"));
        assert!(debug_output.contains("PGTESTPAYUAT"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("rzp_hidden_value"));
        assert!(!debug_output.contains("phonepe_hidden_value"));
    }
}
