//! Cart repository. Each user has at most one cart; lines are keyed by product.

use sqlx::PgPool;

use hridved_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's cart with its lines, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn find_for_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let cart = sqlx::query_as::<_, Cart>(&format!(
            "SELECT {CART_COLUMNS} FROM hridved.carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match cart {
            Some(mut cart) => {
                cart.cart_items = self.items(cart.id).await?;
                Ok(Some(cart))
            }
            None => Ok(None),
        }
    }

    /// The user's cart, created empty on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        sqlx::query(
            "INSERT INTO hridved.carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        self.find_for_user(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Insert a line, or replace the quantity and details of an existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn upsert_item(&self, cart_id: CartId, item: &CartItem) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO hridved.cart_items (cart_id, product_id, name, qty, image, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (cart_id, product_id) DO UPDATE
            SET qty = EXCLUDED.qty,
                name = EXCLUDED.name,
                image = EXCLUDED.image,
                price = EXCLUDED.price
            ",
        )
        .bind(cart_id)
        .bind(item.product_id)
        .bind(&item.name)
        .bind(item.qty)
        .bind(&item.image)
        .bind(item.price)
        .execute(&mut *tx)
        .await?;

        touch(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove one line. Removing a product that isn't in the cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM hridved.cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        touch(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Remove every line but keep the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM hridved.cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;
        touch(&mut tx, cart_id).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Drop the user's cart entirely (after a successful payment).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM hridved.carts WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let items = sqlx::query_as::<_, CartItem>(
            r"
            SELECT product_id, name, qty, image, price
            FROM hridved.cart_items
            WHERE cart_id = $1
            ORDER BY added_at ASC
            ",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;
        Ok(items)
    }
}

async fn touch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    cart_id: CartId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE hridved.carts SET updated_at = NOW() WHERE id = $1")
        .bind(cart_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
