//! Product repository: catalog queries, admin edits and reviews.

use rust_decimal::Decimal;
use sqlx::PgPool;

use hridved_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::{Product, Review};

pub(crate) const PRODUCT_COLUMNS: &str = "id, user_id, name, image, images, brand, category, \
    description, price, count_in_stock, rating, num_reviews, is_bestseller, created_at, updated_at";

/// Sort orders accepted by the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Newest,
}

impl ProductSort {
    /// Parse the `sort` query value; unknown values fall back to the default order.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price-asc") => Self::PriceAsc,
            Some("price-desc") => Self::PriceDesc,
            Some("newest") => Self::Newest,
            _ => Self::Default,
        }
    }

    const fn order_by(self) -> &'static str {
        match self {
            Self::PriceAsc => "price ASC, id ASC",
            Self::PriceDesc => "price DESC, id ASC",
            Self::Newest => "created_at DESC, id DESC",
            Self::Default => "id ASC",
        }
    }
}

/// Catalog listing filters. Every `None` is "don't filter".
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_bestseller: Option<bool>,
    pub sort: ProductSort,
}

/// Admin product edit. `images` is kept when `None`.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub image: String,
    pub images: Option<Vec<String>>,
    pub brand: Option<String>,
    pub category: String,
    pub count_in_stock: i32,
    pub is_bestseller: bool,
}

/// Escape `LIKE` wildcards in user input and wrap it for a substring match.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

const FILTER_CLAUSE: &str = r"
    WHERE ($1::text IS NULL OR name ILIKE $1)
      AND ($2::text IS NULL OR category = $2)
      AND ($3::numeric IS NULL OR price >= $3)
      AND ($4::numeric IS NULL OR price <= $4)
      AND ($5::boolean IS NULL OR is_bestseller = $5)
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One page of the filtered catalog plus the total number of matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let keyword = filter
            .keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(contains_pattern);

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM hridved.products {FILTER_CLAUSE}"
        ))
        .bind(keyword.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.is_bestseller)
        .fetch_one(self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM hridved.products {FILTER_CLAUSE} \
             ORDER BY {} LIMIT $6 OFFSET $7",
            filter.sort.order_by()
        ))
        .bind(keyword.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.min_price)
        .bind(filter.max_price)
        .bind(filter.is_bestseller)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((products, count))
    }

    /// Highest-rated products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM hridved.products ORDER BY rating DESC, id ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(products)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM hridved.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(product)
    }

    /// Reviews for a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reviews(&self, id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let reviews = sqlx::query_as::<_, Review>(
            r"
            SELECT id, product_id, user_id, name, rating, comment, created_at
            FROM hridved.product_reviews
            WHERE product_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;
        Ok(reviews)
    }

    /// Insert the placeholder product the admin UI then edits.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_sample(&self, user_id: UserId) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            r"
            INSERT INTO hridved.products
                (user_id, name, image, brand, category, description, price, count_in_stock)
            VALUES ($1, 'Sample name', '/images/sample.jpg', 'Sample brand',
                    'Sample category', 'Sample description', 0, 0)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(product)
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(&format!(
            r"
            UPDATE hridved.products
            SET name = $2,
                price = $3,
                description = $4,
                image = $5,
                images = COALESCE($6, images),
                brand = COALESCE($7, brand),
                category = $8,
                count_in_stock = $9,
                is_bestseller = $10,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.price)
        .bind(&update.description)
        .bind(&update.image)
        .bind(update.images.as_deref())
        .bind(update.brand.as_deref())
        .bind(&update.category)
        .bind(update.count_in_stock)
        .bind(update.is_bestseller)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a review and recompute the product's rating and review count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed the product.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_review(
        &self,
        id: ProductId,
        user_id: UserId,
        name: &str,
        rating: i16,
        comment: &str,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO hridved.product_reviews (product_id, user_id, name, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(rating)
        .bind(comment)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        sqlx::query(
            r"
            UPDATE hridved.products p
            SET num_reviews = r.n,
                rating = r.avg,
                updated_at = NOW()
            FROM (
                SELECT COUNT(*)::int AS n, COALESCE(AVG(rating), 0)::float8 AS avg
                FROM hridved.product_reviews
                WHERE product_id = $1
            ) r
            WHERE p.id = $1
            ",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_from_query() {
        assert_eq!(ProductSort::from_query(Some("price-asc")), ProductSort::PriceAsc);
        assert_eq!(ProductSort::from_query(Some("price-desc")), ProductSort::PriceDesc);
        assert_eq!(ProductSort::from_query(Some("newest")), ProductSort::Newest);
        assert_eq!(ProductSort::from_query(Some("rating")), ProductSort::Default);
        assert_eq!(ProductSort::from_query(None), ProductSort::Default);
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("neem"), "%neem%");
        assert_eq!(contains_pattern("100%_pure"), "%100\\%\\_pure%");
    }
}
