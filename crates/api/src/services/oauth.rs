//! Google and Facebook profile lookups for social login.
//!
//! The browser completes the provider's OAuth flow and hands us the token;
//! we exchange it for the user's profile and never see a password.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{instrument, warn};

use hridved_core::OAuthProvider;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const FACEBOOK_ME_URL: &str = "https://graph.facebook.com/me";
const FACEBOOK_FIELDS: &str = "id,name,email,picture.width(500).height(500)";

/// The provider rejected the token or could not be reached.
#[derive(Debug, Error)]
#[error("{provider} token verification failed: {reason}")]
pub struct OAuthError {
    pub provider: OAuthProvider,
    pub reason: String,
}

/// Profile fields shared by both providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthProfile {
    pub provider: OAuthProvider,
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: Value,
    email: Option<String>,
    name: Option<String>,
    #[serde(default)]
    picture: Value,
}

impl RawProfile {
    fn into_profile(self, provider: OAuthProvider) -> OAuthProfile {
        let id = match self.id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        // Google sends a URL, Facebook nests it under picture.data.url
        let picture = match &self.picture {
            Value::String(url) => Some(url.clone()),
            other => other
                .pointer("/data/url")
                .and_then(Value::as_str)
                .map(String::from),
        }
        .filter(|url| !url.is_empty());

        OAuthProfile {
            provider,
            id,
            email: self.email,
            name: self.name,
            picture,
        }
    }
}

/// Client for the provider profile endpoints.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    client: Client,
}

impl OAuthClient {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the Google profile for an access or ID token.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError` if Google rejects the token.
    #[instrument(skip_all)]
    pub async fn google_profile(&self, token: &str) -> Result<OAuthProfile, OAuthError> {
        let request = self.client.get(GOOGLE_USERINFO_URL).bearer_auth(token);
        self.fetch(OAuthProvider::Google, request).await
    }

    /// Fetch the Facebook profile for an access token.
    ///
    /// # Errors
    ///
    /// Returns `OAuthError` if Facebook rejects the token.
    #[instrument(skip_all)]
    pub async fn facebook_profile(&self, access_token: &str) -> Result<OAuthProfile, OAuthError> {
        let request = self
            .client
            .get(FACEBOOK_ME_URL)
            .query(&[("access_token", access_token), ("fields", FACEBOOK_FIELDS)]);
        self.fetch(OAuthProvider::Facebook, request).await
    }

    async fn fetch(
        &self,
        provider: OAuthProvider,
        request: reqwest::RequestBuilder,
    ) -> Result<OAuthProfile, OAuthError> {
        let fail = |reason: String| {
            warn!(%provider, %reason, "OAuth profile lookup failed");
            OAuthError { provider, reason }
        };

        let response = request.send().await.map_err(|e| fail(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(format!("status {status}")));
        }

        let raw: RawProfile = response.json().await.map_err(|e| fail(e.to_string()))?;
        Ok(raw.into_profile(provider))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(provider: OAuthProvider, value: Value) -> OAuthProfile {
        serde_json::from_value::<RawProfile>(value)
            .unwrap()
            .into_profile(provider)
    }

    #[test]
    fn test_google_profile() {
        let profile = parse(
            OAuthProvider::Google,
            json!({
                "id": "110248495921238986420",
                "email": "asha@gmail.com",
                "verified_email": true,
                "name": "Asha Verma",
                "picture": "https://lh3.googleusercontent.com/a/asha"
            }),
        );
        assert_eq!(profile.id, "110248495921238986420");
        assert_eq!(profile.email.as_deref(), Some("asha@gmail.com"));
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://lh3.googleusercontent.com/a/asha")
        );
    }

    #[test]
    fn test_facebook_profile_nested_picture() {
        let profile = parse(
            OAuthProvider::Facebook,
            json!({
                "id": "10224",
                "name": "Ravi",
                "picture": {"data": {"url": "https://graph.facebook.com/pic.jpg", "width": 500}}
            }),
        );
        assert_eq!(profile.provider, OAuthProvider::Facebook);
        assert_eq!(profile.email, None);
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://graph.facebook.com/pic.jpg")
        );
    }

    #[test]
    fn test_numeric_id_and_missing_picture() {
        let profile = parse(OAuthProvider::Facebook, json!({"id": 10224, "picture": ""}));
        assert_eq!(profile.id, "10224");
        assert_eq!(profile.picture, None);
    }
}
