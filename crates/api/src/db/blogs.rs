//! Blog repository.
//!
//! `views`, `status` and `is_featured` are nullable in older rows, so reads
//! coalesce them to their defaults.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use hridved_core::{BlogCategory, BlogId, BlogStatus, UserId};

use super::RepositoryError;
use super::products::contains_pattern;
use crate::models::Blog;

const BLOG_COLUMNS: &str = "id, title, slug, short_description, content, excerpt, image, author, \
    author_image, user_id, category, tags, meta_title, meta_description, read_time, \
    COALESCE(views, 0) AS views, COALESCE(status, 'draft') AS status, \
    COALESCE(is_featured, FALSE) AS is_featured, published_at, created_at, updated_at";

/// Same as [`BLOG_COLUMNS`] without the post body.
const BLOG_LIST_COLUMNS: &str = "id, title, slug, short_description, NULL::text AS content, \
    excerpt, image, author, author_image, user_id, category, tags, meta_title, meta_description, \
    read_time, COALESCE(views, 0) AS views, COALESCE(status, 'draft') AS status, \
    COALESCE(is_featured, FALSE) AS is_featured, published_at, created_at, updated_at";

/// A post to insert; derived fields are already filled in.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image: String,
    pub author: String,
    pub author_image: String,
    pub user_id: Option<UserId>,
    pub category: BlogCategory,
    pub tags: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub read_time: String,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
}

/// Public listing filters.
#[derive(Debug, Clone, Default)]
pub struct BlogFilter {
    pub search: Option<String>,
    pub category: Option<BlogCategory>,
    pub tag: Option<String>,
}

/// A row the backfill command inspects, with raw nullable columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BackfillRow {
    pub id: BlogId,
    pub title: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub views: Option<i32>,
    pub status: Option<BlogStatus>,
    pub is_featured: Option<bool>,
}

/// Repository for blog database operations.
pub struct BlogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Published posts matching the filter, featured first then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_published(
        &self,
        filter: &BlogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Blog>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE status = 'published'
              AND ($1::text IS NULL
                   OR title ILIKE $1
                   OR short_description ILIKE $1
                   OR content ILIKE $1
                   OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE t ILIKE $1))
              AND ($2::hridved.blog_category IS NULL OR category = $2)
              AND ($3::text IS NULL OR EXISTS (SELECT 1 FROM unnest(tags) t WHERE lower(t) = lower($3)))
        ";

        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);
        let tag = filter.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM hridved.blogs {WHERE}"))
            .bind(search.as_deref())
            .bind(filter.category)
            .bind(tag)
            .fetch_one(self.pool)
            .await?;

        let blogs = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_LIST_COLUMNS} FROM hridved.blogs {WHERE} \
             ORDER BY COALESCE(is_featured, FALSE) DESC, published_at DESC NULLS LAST, id DESC \
             LIMIT $4 OFFSET $5"
        ))
        .bind(search.as_deref())
        .bind(filter.category)
        .bind(tag)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((blogs, total))
    }

    /// Published post count per category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_counts(&self) -> Result<Vec<(BlogCategory, i64)>, RepositoryError> {
        let rows = sqlx::query_as::<_, (BlogCategory, i64)>(
            r"
            SELECT category, COUNT(*)
            FROM hridved.blogs
            WHERE status = 'published'
            GROUP BY category
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Admin listing over every status, newest first.
    ///
    /// `search` matches title, author or category label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(
        &self,
        search: Option<&str>,
        status: Option<BlogStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Blog>, i64), RepositoryError> {
        const WHERE: &str = r"
            WHERE ($1::text IS NULL
                   OR title ILIKE $1
                   OR author ILIKE $1
                   OR category::text ILIKE $1)
              AND ($2::hridved.blog_status IS NULL OR COALESCE(status, 'draft') = $2)
        ";

        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(contains_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM hridved.blogs {WHERE}"))
            .bind(search.as_deref())
            .bind(status)
            .fetch_one(self.pool)
            .await?;

        let blogs = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_LIST_COLUMNS} FROM hridved.blogs {WHERE} \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(search.as_deref())
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok((blogs, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: BlogId) -> Result<Option<Blog>, RepositoryError> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM hridved.blogs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(blog)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>, RepositoryError> {
        let blog = sqlx::query_as::<_, Blog>(&format!(
            "SELECT {BLOG_COLUMNS} FROM hridved.blogs WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(blog)
    }

    /// Bump the view counter and return the updated post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    pub async fn record_view(&self, id: BlogId) -> Result<Blog, RepositoryError> {
        sqlx::query_as::<_, Blog>(&format!(
            r"
            UPDATE hridved.blogs SET views = COALESCE(views, 0) + 1
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Other published posts sharing the category or any tag, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn related(&self, blog: &Blog, limit: i64) -> Result<Vec<Blog>, RepositoryError> {
        let blogs = sqlx::query_as::<_, Blog>(&format!(
            r"
            SELECT {BLOG_LIST_COLUMNS}
            FROM hridved.blogs
            WHERE id <> $1
              AND status = 'published'
              AND (category = $2 OR tags && $3)
            ORDER BY published_at DESC NULLS LAST, id DESC
            LIMIT $4
            "
        ))
        .bind(blog.id)
        .bind(blog.category)
        .bind(&blog.tags)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(blogs)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("slug")` if the slug is taken.
    pub async fn create(&self, blog: &NewBlog) -> Result<Blog, RepositoryError> {
        sqlx::query_as::<_, Blog>(&format!(
            r"
            INSERT INTO hridved.blogs (
                title, slug, short_description, content, excerpt, image, author,
                author_image, user_id, category, tags, meta_title, meta_description,
                read_time, views, status, is_featured, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, 0, $15, $16, $17)
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(&blog.title)
        .bind(&blog.slug)
        .bind(blog.short_description.as_deref())
        .bind(blog.content.as_deref())
        .bind(blog.excerpt.as_deref())
        .bind(&blog.image)
        .bind(&blog.author)
        .bind(&blog.author_image)
        .bind(blog.user_id)
        .bind(blog.category)
        .bind(&blog.tags)
        .bind(blog.meta_title.as_deref())
        .bind(blog.meta_description.as_deref())
        .bind(&blog.read_time)
        .bind(blog.status)
        .bind(blog.is_featured)
        .bind(blog.published_at)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)
    }

    /// Write back every editable field of an existing post.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Conflict("slug")` if the slug is taken.
    pub async fn save(&self, blog: &Blog) -> Result<Blog, RepositoryError> {
        sqlx::query_as::<_, Blog>(&format!(
            r"
            UPDATE hridved.blogs
            SET title = $2, slug = $3, short_description = $4, content = $5, excerpt = $6,
                image = $7, author = $8, author_image = $9, category = $10, tags = $11,
                meta_title = $12, meta_description = $13, read_time = $14, status = $15,
                is_featured = $16, published_at = $17, updated_at = NOW()
            WHERE id = $1
            RETURNING {BLOG_COLUMNS}
            "
        ))
        .bind(blog.id)
        .bind(&blog.title)
        .bind(blog.slug.as_deref())
        .bind(blog.short_description.as_deref())
        .bind(blog.content.as_deref())
        .bind(blog.excerpt.as_deref())
        .bind(&blog.image)
        .bind(&blog.author)
        .bind(&blog.author_image)
        .bind(blog.category)
        .bind(&blog.tags)
        .bind(blog.meta_title.as_deref())
        .bind(blog.meta_description.as_deref())
        .bind(&blog.read_time)
        .bind(blog.status)
        .bind(blog.is_featured)
        .bind(blog.published_at)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::from_write)?
        .ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BlogId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.blogs WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every post (used by `seed blogs --clear`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM hridved.blogs")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // Backfill
    // =========================================================================

    /// Every post with raw (uncoalesced) columns.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn backfill_rows(&self) -> Result<Vec<BackfillRow>, RepositoryError> {
        let rows = sqlx::query_as::<_, BackfillRow>(
            r"
            SELECT id, title, slug, short_description, content, excerpt, meta_title,
                   meta_description, views, status, is_featured
            FROM hridved.blogs
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Write a repaired backfill row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict("slug")` if the derived slug is taken.
    pub async fn apply_backfill(&self, row: &BackfillRow) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE hridved.blogs
            SET slug = $2, short_description = $3, meta_title = $4, meta_description = $5,
                views = $6, status = $7, is_featured = $8,
                published_at = CASE WHEN $7 = 'published' THEN COALESCE(published_at, created_at)
                                    ELSE published_at END,
                updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(row.id)
        .bind(row.slug.as_deref())
        .bind(row.short_description.as_deref())
        .bind(row.meta_title.as_deref())
        .bind(row.meta_description.as_deref())
        .bind(row.views)
        .bind(row.status)
        .bind(row.is_featured)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;
        Ok(())
    }
}
