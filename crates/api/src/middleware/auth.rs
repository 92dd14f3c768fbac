//! Authentication extractors.
//!
//! The session token is read from the `jwt` cookie, or from an
//! `Authorization: Bearer` header for clients that can't hold cookies.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn my_orders(
//!     State(state): State<AppState>,
//!     RequireAuth(user): RequireAuth,
//! ) -> Result<Json<Vec<Order>>> {
//!     ...
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::{AuthError, AuthService, cookie::token_from_headers};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
pub struct RequireAuth(pub User);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub User);

/// Extractor that resolves the user when a valid token is present.
///
/// Never rejects; a missing or bad token yields `None`.
pub struct OptionalAuth(pub Option<User>);

async fn authenticate(parts: &Parts, state: &AppState) -> Result<User, AppError> {
    let token = token_from_headers(&parts.headers)
        .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

    let user = AuthService::new(state.pool())
        .user_for_token(&state.config().jwt_secret, &token)
        .await
        .map_err(|e| match e {
            AuthError::UserNotFound => {
                AppError::Unauthorized("Not authorized, user not found".to_string())
            }
            AuthError::InvalidToken(_) => {
                AppError::Unauthorized("Not authorized, token failed".to_string())
            }
            other => AppError::Auth(other),
        })?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state).await?;
        if !user.is_admin {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Non-admin hit admin route");
            return Err(AppError::Unauthorized(
                "Not authorized as an admin".to_string(),
            ));
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if token_from_headers(&parts.headers).is_none() {
            return Ok(Self(None));
        }
        Ok(Self(authenticate(parts, state).await.ok()))
    }
}
