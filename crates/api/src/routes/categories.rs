//! Category routes (`/api/categories`).

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use hridved_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// GET /api/categories
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(State(state): State<AppState>) -> Result<AppJson<Vec<Category>>> {
    Ok(AppJson(CategoryRepository::new(state.pool()).list().await?))
}

/// GET /api/categories/{id}
///
/// # Errors
///
/// Returns 404 "Category not found".
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<CategoryId>,
) -> Result<AppJson<Category>> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(AppJson)
        .ok_or_else(not_found)
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

/// POST /api/categories
///
/// # Errors
///
/// Returns 400 without a name or when the name is taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<(StatusCode, AppJson<Category>)> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::invalid_field("name", "Category name is required"))?;

    let category = CategoryRepository::new(state.pool())
        .create(
            name,
            req.description.as_deref().unwrap_or_default(),
            req.image.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, AppJson(category)))
}

/// PUT /api/categories/{id}
///
/// # Errors
///
/// Returns 404 "Category not found" or 400 when the new name is taken.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<CategoryId>,
    AppJson(req): AppJson<CategoryRequest>,
) -> Result<AppJson<Category>> {
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let category = CategoryRepository::new(state.pool())
        .update(id, name, req.description.as_deref(), req.image.as_deref())
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => not_found(),
            other => other.into(),
        })?;
    Ok(AppJson(category))
}

/// DELETE /api/categories/{id}
///
/// # Errors
///
/// Returns 404 "Category not found".
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<CategoryId>,
) -> Result<AppJson<Value>> {
    if !CategoryRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }
    Ok(AppJson(json!({ "message": "Category removed" })))
}
