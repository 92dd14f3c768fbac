//! Catalog routes (`/api/products`).

use axum::{extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hridved_core::validation::{MAX_PRICE, is_valid_product_name};
use hridved_core::{FieldErrors, Pagination, ProductId};

use crate::db::products::{ProductFilter, ProductSort, ProductUpdate};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Product, ProductDetail};
use crate::state::AppState;

/// Catalog page size.
const PAGE_SIZE: u32 = 12;

/// Number of products in the "top rated" strip.
const TOP_RATED: i64 = 3;

/// Raw listing query. Values are parsed leniently: anything unparsable is
/// treated as absent rather than rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub is_bestseller: Option<String>,
    pub sort: Option<String>,
    pub page_number: Option<String>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            keyword: self.keyword.clone().filter(|k| !k.trim().is_empty()),
            category: self.category.clone().filter(|c| !c.trim().is_empty()),
            min_price: parse_price(self.min_price.as_deref()),
            max_price: parse_price(self.max_price.as_deref()),
            is_bestseller: self.is_bestseller.as_deref().and_then(|v| match v {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            }),
            sort: ProductSort::from_query(self.sort.as_deref()),
        }
    }

    fn pagination(&self) -> Pagination {
        let page = self.page_number.as_deref().and_then(|p| p.trim().parse().ok());
        Pagination::new(page, Some(PAGE_SIZE), PAGE_SIZE)
    }
}

fn parse_price(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: u32,
    pub pages: i64,
}

/// GET /api/products
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> Result<AppJson<ProductPage>> {
    let pagination = query.pagination();
    let (products, total) = ProductRepository::new(state.pool())
        .list(
            &query.filter(),
            i64::from(pagination.limit()),
            pagination.offset(),
        )
        .await?;

    Ok(AppJson(ProductPage {
        products,
        page: pagination.page(),
        pages: pagination.total_pages(total),
    }))
}

/// GET /api/products/top
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn top(State(state): State<AppState>) -> Result<AppJson<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .top_rated(TOP_RATED)
        .await?;
    Ok(AppJson(products))
}

/// GET /api/products/{id}
///
/// # Errors
///
/// Returns 404 "Product not found".
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<ProductId>,
) -> Result<AppJson<ProductDetail>> {
    let repo = ProductRepository::new(state.pool());
    let product = repo.get_by_id(id).await?.ok_or_else(not_found)?;
    let reviews = repo.reviews(id).await?;
    Ok(AppJson(ProductDetail { product, reviews }))
}

fn not_found() -> AppError {
    AppError::NotFound("Product not found".to_string())
}

/// POST /api/products
///
/// # Errors
///
/// Returns 500 if the insert fails.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<(StatusCode, AppJson<Product>)> {
    let product = ProductRepository::new(state.pool())
        .create_sample(admin.id)
        .await?;
    tracing::info!(product_id = %product.id, admin_id = %admin.id, "Sample product created");
    Ok((StatusCode::CREATED, AppJson(product)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub count_in_stock: Option<i32>,
    pub is_bestseller: Option<bool>,
}

impl UpdateProductRequest {
    /// Merge onto the stored product and validate the result.
    fn apply_to(self, current: &Product) -> Result<ProductUpdate> {
        let update = ProductUpdate {
            name: self.name.map_or_else(|| current.name.clone(), |n| n.trim().to_string()),
            price: self.price.unwrap_or(current.price),
            description: self.description.unwrap_or_else(|| current.description.clone()),
            image: self.image.unwrap_or_else(|| current.image.clone()),
            images: self.images,
            brand: self.brand,
            category: self.category.unwrap_or_else(|| current.category.clone()),
            count_in_stock: self.count_in_stock.unwrap_or(current.count_in_stock),
            is_bestseller: self.is_bestseller.unwrap_or(current.is_bestseller),
        };

        let mut errors = FieldErrors::new();
        errors
            .check(
                is_valid_product_name(&update.name),
                "name",
                "Product name must be between 3 and 200 characters",
            )
            .check(
                update.price >= Decimal::ZERO && update.price < MAX_PRICE,
                "price",
                "Price must be between 0 and 999999",
            )
            .check(
                update.count_in_stock >= 0,
                "countInStock",
                "Stock cannot be negative",
            );
        errors.into_result().map_err(|errors| AppError::Validation {
            message: "Validation failed".to_string(),
            errors,
        })?;

        Ok(update)
    }
}

/// PUT /api/products/{id}
///
/// # Errors
///
/// Returns 404 "Product not found" or 400 on validation failure.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<ProductId>,
    AppJson(req): AppJson<UpdateProductRequest>,
) -> Result<AppJson<Product>> {
    let repo = ProductRepository::new(state.pool());
    let current = repo.get_by_id(id).await?.ok_or_else(not_found)?;
    let product = repo.update(id, &req.apply_to(&current)?).await?;
    Ok(AppJson(product))
}

/// DELETE /api/products/{id}
///
/// # Errors
///
/// Returns 404 "Product not found".
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<ProductId>,
) -> Result<AppJson<Value>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }
    tracing::info!(product_id = %id, admin_id = %admin.id, "Product deleted");
    Ok(AppJson(json!({ "message": "Product removed" })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: Option<i16>,
    #[serde(default)]
    pub comment: String,
}

/// POST /api/products/{id}/reviews
///
/// # Errors
///
/// Returns 404 "Product not found", 400 "Product already reviewed" or 400
/// for a rating outside 1-5.
pub async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(id): AppPath<ProductId>,
    AppJson(req): AppJson<ReviewRequest>,
) -> Result<(StatusCode, AppJson<Value>)> {
    let rating = req
        .rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| AppError::invalid_field("rating", "Rating must be between 1 and 5"))?;

    let repo = ProductRepository::new(state.pool());
    repo.get_by_id(id).await?.ok_or_else(not_found)?;

    match repo
        .add_review(id, user.id, &user.name, rating, req.comment.trim())
        .await
    {
        Ok(()) => Ok((StatusCode::CREATED, AppJson(json!({ "message": "Review added" })))),
        Err(RepositoryError::Conflict(_)) => {
            Err(AppError::BadRequest("Product already reviewed".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_parsing_is_lenient() {
        let query = ProductQuery {
            keyword: Some("  ".to_string()),
            min_price: Some("100".to_string()),
            max_price: Some("abc".to_string()),
            is_bestseller: Some("true".to_string()),
            sort: Some("price-desc".to_string()),
            page_number: Some("zero".to_string()),
            ..ProductQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.keyword, None);
        assert_eq!(filter.min_price, Some(Decimal::from(100)));
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.is_bestseller, Some(true));
        assert_eq!(filter.sort, ProductSort::PriceDesc);
        assert_eq!(query.pagination().page(), 1);
    }

    #[test]
    fn test_pagination_uses_page_size() {
        let query = ProductQuery {
            page_number: Some("3".to_string()),
            ..ProductQuery::default()
        };
        let p = query.pagination();
        assert_eq!(p.limit(), 12);
        assert_eq!(p.offset(), 24);
    }
}
