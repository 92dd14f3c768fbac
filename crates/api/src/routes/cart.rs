//! Persistent cart routes (`/api/cart`). Every route requires a session.

use axum::extract::State;
use rust_decimal::Decimal;
use serde::Deserialize;

use hridved_core::ProductId;
use hridved_core::validation::is_valid_quantity;

use crate::db::CartRepository;
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAuth;
use crate::models::{Cart, CartItem};
use crate::state::AppState;

/// GET /api/cart
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(user.id)
        .await?;
    Ok(AppJson(cart))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    pub qty: Option<i64>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub price: Decimal,
}

impl AddItemRequest {
    fn into_item(self) -> Result<CartItem> {
        let product_id = self
            .product
            .ok_or_else(|| AppError::invalid_field("product", "Product is required"))?;
        let qty = self
            .qty
            .filter(|q| is_valid_quantity(*q))
            .and_then(|q| i32::try_from(q).ok())
            .ok_or_else(|| AppError::invalid_field("qty", "Quantity must be between 1 and 10000"))?;

        Ok(CartItem {
            product_id,
            name: self.name,
            qty,
            image: self.image,
            price: self.price,
        })
    }
}

/// POST /api/cart
///
/// Adds a line, or replaces the quantity of an existing one.
///
/// # Errors
///
/// Returns 400 for a missing product or out-of-range quantity.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppJson(req): AppJson<AddItemRequest>,
) -> Result<AppJson<Cart>> {
    let item = req.into_item()?;
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.upsert_item(cart.id, &item).await?;
    Ok(AppJson(carts.get_or_create(user.id).await?))
}

/// DELETE /api/cart/{productId}
///
/// # Errors
///
/// Returns 404 "Cart not found".
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    AppPath(product_id): AppPath<ProductId>,
) -> Result<AppJson<Cart>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.find_for_user(user.id).await?.ok_or_else(cart_not_found)?;
    carts.remove_item(cart.id, product_id).await?;
    Ok(AppJson(carts.get_or_create(user.id).await?))
}

/// DELETE /api/cart
///
/// # Errors
///
/// Returns 404 "Cart not found".
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AppJson<Cart>> {
    let carts = CartRepository::new(state.pool());
    let mut cart = carts.find_for_user(user.id).await?.ok_or_else(cart_not_found)?;
    carts.clear(cart.id).await?;
    cart.cart_items.clear();
    Ok(AppJson(cart))
}

fn cart_not_found() -> AppError {
    AppError::NotFound("Cart not found".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(qty: Option<i64>) -> AddItemRequest {
        serde_json::from_value(serde_json::json!({
            "product": 5,
            "name": "Chyawanprash",
            "qty": qty,
            "image": "/images/chyawanprash.jpg",
            "price": 349.0,
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_item() {
        let item = request(Some(3)).into_item().unwrap();
        assert_eq!(item.product_id, ProductId::new(5));
        assert_eq!(item.qty, 3);
        assert_eq!(item.price, Decimal::from(349));
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(request(Some(0)).into_item().is_err());
        assert!(request(Some(10_001)).into_item().is_err());
        assert!(request(None).into_item().is_err());
    }

    #[test]
    fn test_product_required() {
        let req: AddItemRequest =
            serde_json::from_value(serde_json::json!({ "qty": 1 })).unwrap();
        assert!(matches!(req.into_item(), Err(AppError::Validation { .. })));
    }
}
