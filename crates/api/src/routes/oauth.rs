//! Social login routes (`/api/auth`).

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::extract::AppJson;
use crate::models::{User, UserResponse};
use crate::services::auth::{AuthService, cookie, jwt};
use crate::services::oauth::OAuthProfile;
use crate::state::AppState;

const NOT_CONFIGURED: &str = "NOT_CONFIGURED";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleLoginRequest {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

/// POST /api/auth/google
///
/// # Errors
///
/// Returns 400 without a token, 401 "Failed to verify Google token".
pub async fn google(
    State(state): State<AppState>,
    AppJson(req): AppJson<GoogleLoginRequest>,
) -> Result<Response> {
    let token = present(req.access_token)
        .or_else(|| present(req.id_token))
        .ok_or_else(|| AppError::BadRequest("Access token or ID token is required".to_string()))?;

    let profile = state
        .oauth()
        .google_profile(&token)
        .await
        .map_err(|_| AppError::Unauthorized("Failed to verify Google token".to_string()))?;

    finish_login(&state, &profile).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookLoginRequest {
    pub access_token: Option<String>,
}

/// POST /api/auth/facebook
///
/// # Errors
///
/// Returns 400 without a token, 401 "Failed to verify Facebook token".
pub async fn facebook(
    State(state): State<AppState>,
    AppJson(req): AppJson<FacebookLoginRequest>,
) -> Result<Response> {
    let token = present(req.access_token)
        .ok_or_else(|| AppError::BadRequest("Access token is required".to_string()))?;

    let profile = state
        .oauth()
        .facebook_profile(&token)
        .await
        .map_err(|_| AppError::Unauthorized("Failed to verify Facebook token".to_string()))?;

    finish_login(&state, &profile).await
}

async fn finish_login(state: &AppState, profile: &OAuthProfile) -> Result<Response> {
    let user: User = AuthService::new(state.pool())
        .login_with_oauth(profile)
        .await?;

    let token = jwt::issue_token(&state.config().jwt_secret, user.id)?;
    Ok((
        [(SET_COOKIE, cookie::session_cookie(&token, state.config().production))],
        AppJson(json!({
            "message": "Logged in successfully",
            "user": UserResponse::from(&user),
        })),
    )
        .into_response())
}

fn present(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub google_client_id: String,
    pub facebook_app_id: String,
}

/// GET /api/auth/status
pub async fn status(State(state): State<AppState>) -> AppJson<AuthStatus> {
    let oauth = &state.config().oauth;
    let or_missing = |value: &Option<String>| {
        value
            .clone()
            .unwrap_or_else(|| NOT_CONFIGURED.to_string())
    };
    AppJson(AuthStatus {
        google_client_id: or_missing(&oauth.google_client_id),
        facebook_app_id: or_missing(&oauth.facebook_app_id),
    })
}
