//! Account routes: registration, password login, profile, wishlist and
//! admin user management.

use axum::{
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use hridved_core::{Email, ProductId, UserId};

use crate::db::users::ProfileUpdate;
use crate::db::{ProductRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Product, User, UserResponse};
use crate::services::auth::{self, AuthService, cookie, jwt};
use crate::state::AppState;

/// Issue a session token for `user` and respond with the user and cookie.
pub(crate) fn signed_in(state: &AppState, user: &User, status: StatusCode) -> Result<Response> {
    let token = jwt::issue_token(&state.config().jwt_secret, user.id)?;
    let cookie = cookie::session_cookie(&token, state.config().production);
    Ok((
        status,
        [(SET_COOKIE, cookie)],
        AppJson(UserResponse::from(user)),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/users
///
/// # Errors
///
/// Returns 400 for a taken email, a bad email or a short password.
pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<Response> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_field("name", "Name is required"));
    }

    let user = AuthService::new(state.pool())
        .register_with_password(name, &req.email, &req.password)
        .await?;
    tracing::info!(user_id = %user.id, "User registered");

    signed_in(&state, &user, StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/users/auth
///
/// # Errors
///
/// Returns 401 "Invalid email or password".
pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response> {
    let user = AuthService::new(state.pool())
        .login_with_password(&req.email, &req.password)
        .await?;
    signed_in(&state, &user, StatusCode::OK)
}

/// POST /api/users/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    crate::error::clear_sentry_user();
    (
        [(SET_COOKIE, cookie::clear_cookie(state.config().production))],
        AppJson(json!({ "message": "Logged out successfully" })),
    )
        .into_response()
}

/// GET /api/users/profile
pub async fn profile(RequireAuth(user): RequireAuth) -> AppJson<UserResponse> {
    AppJson(UserResponse::from(&user))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
}

/// PUT /api/users/profile
///
/// Omitted or empty fields keep their stored values.
///
/// # Errors
///
/// Returns 400 for a bad or taken email, or a short password.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<ProfileRequest>,
) -> Result<AppJson<UserResponse>> {
    let email = non_empty(req.email.as_deref())
        .map(Email::parse)
        .transpose()
        .map_err(|_| AppError::invalid_field("email", "Please provide a valid email"))?;

    let password_hash = match non_empty(req.password.as_deref()) {
        Some(password) => {
            auth::validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    let update = ProfileUpdate {
        name: non_empty(req.name.as_deref()),
        email: email.as_ref(),
        password_hash: password_hash.as_deref(),
        phone: req.phone.as_deref().map(str::trim),
        avatar: req.avatar.as_deref().map(str::trim),
    };
    let user = UserRepository::new(state.pool())
        .update_profile(user.id, &update)
        .await?;

    Ok(AppJson(UserResponse::from(&user)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// =============================================================================
// Wishlist
// =============================================================================

/// GET /api/users/wishlist
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Vec<Product>>> {
    let products = UserRepository::new(state.pool()).wishlist(user.id).await?;
    Ok(AppJson(products))
}

/// POST /api/users/wishlist/{productId}
///
/// # Errors
///
/// Returns 404 "Product not found".
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<AppJson<Vec<Product>>> {
    ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let users = UserRepository::new(state.pool());
    users.add_to_wishlist(user.id, product_id).await?;
    Ok(AppJson(users.wishlist(user.id).await?))
}

/// DELETE /api/users/wishlist/{productId}
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<AppJson<Vec<Product>>> {
    let users = UserRepository::new(state.pool());
    users.remove_from_wishlist(user.id, product_id).await?;
    Ok(AppJson(users.wishlist(user.id).await?))
}

// =============================================================================
// Admin
// =============================================================================

/// GET /api/users
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<AppJson<Vec<UserResponse>>> {
    let users = UserRepository::new(state.pool()).list().await?;
    Ok(AppJson(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
///
/// # Errors
///
/// Returns 404 "User not found".
pub async fn get(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<UserId>,
) -> Result<AppJson<UserResponse>> {
    let user = find_user(&state, id).await?;
    Ok(AppJson(UserResponse::from(&user)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

/// PUT /api/users/{id}
///
/// # Errors
///
/// Returns 404 "User not found", or 400 for a bad or taken email.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<UserId>,
    AppJson(req): AppJson<AdminUpdateRequest>,
) -> Result<AppJson<UserResponse>> {
    find_user(&state, id).await?;

    let email = non_empty(req.email.as_deref())
        .map(Email::parse)
        .transpose()
        .map_err(|_| AppError::invalid_field("email", "Please provide a valid email"))?;

    let user = UserRepository::new(state.pool())
        .admin_update(id, non_empty(req.name.as_deref()), email.as_ref(), req.is_admin)
        .await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, is_admin = user.is_admin, "User updated by admin");

    Ok(AppJson(UserResponse::from(&user)))
}

/// DELETE /api/users/{id}
///
/// # Errors
///
/// Returns 404 "User not found", or 400 when the target is an admin.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<UserId>,
) -> Result<AppJson<serde_json::Value>> {
    let user = find_user(&state, id).await?;
    if user.is_admin {
        return Err(AppError::BadRequest("Can not delete admin user".to_string()));
    }

    UserRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "User deleted");

    Ok(AppJson(json!({ "message": "User removed" })))
}

async fn find_user(state: &AppState, id: UserId) -> Result<User> {
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}
