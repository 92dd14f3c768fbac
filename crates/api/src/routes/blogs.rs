//! Blog CMS routes (`/api/blogs`).
//!
//! Readers see published posts only; admins manage drafts under the same
//! prefix.

use axum::{extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use hridved_core::{BlogCategory, BlogId, BlogStatus, PageInfo, Pagination, slugify};
use hridved_core::validation::FieldErrors;

use crate::db::blogs::{BlogFilter, NewBlog};
use crate::db::{BlogRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::RequireAdmin;
use crate::models::{Blog, User};
use crate::models::blog::{BlogText, DEFAULT_AUTHOR_IMAGE, first_published, truncate};
use crate::state::AppState;

const PUBLIC_PAGE_SIZE: u32 = 12;
const ADMIN_PAGE_SIZE: u32 = 20;
const RELATED_LIMIT: i64 = 3;
const DEFAULT_READ_TIME: &str = "5 min read";

const DUPLICATE_TITLE: &str = "A blog with this title already exists. Please use a different title.";

fn not_found() -> AppError {
    AppError::NotFound("Blog not found".to_string())
}

fn parse_u32(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct BlogPage {
    pub blogs: Vec<Blog>,
    pub pagination: PageInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
    pub status: Option<String>,
}

impl BlogQuery {
    fn pagination(&self, default_limit: u32) -> Pagination {
        Pagination::new(
            parse_u32(self.page.as_deref()),
            parse_u32(self.limit.as_deref()),
            default_limit,
        )
    }
}

/// GET /api/blogs
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn list(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BlogQuery>,
) -> Result<AppJson<BlogPage>> {
    let pagination = query.pagination(PUBLIC_PAGE_SIZE);

    let category = match non_empty(query.category.as_deref()) {
        Some(raw) => match raw.parse::<BlogCategory>() {
            Ok(category) => Some(category),
            // No post can be in a category that doesn't exist.
            Err(_) => {
                return Ok(AppJson(BlogPage {
                    blogs: Vec::new(),
                    pagination: PageInfo::new(pagination, 0),
                }));
            }
        },
        None => None,
    };
    let filter = BlogFilter {
        search: query.search.clone(),
        category,
        tag: query.tag.clone(),
    };

    let (blogs, total) = BlogRepository::new(state.pool())
        .list_published(
            &filter,
            i64::from(pagination.limit()),
            pagination.offset(),
        )
        .await?;

    Ok(AppJson(BlogPage {
        blogs,
        pagination: PageInfo::new(pagination, total),
    }))
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub name: BlogCategory,
    pub count: i64,
}

/// Pair every category with its published count, zero when absent.
fn category_counts(counts: &[(BlogCategory, i64)]) -> Vec<CategoryCount> {
    BlogCategory::ALL
        .into_iter()
        .map(|name| CategoryCount {
            name,
            count: counts
                .iter()
                .find(|(c, _)| *c == name)
                .map_or(0, |(_, n)| *n),
        })
        .collect()
}

/// GET /api/blogs/categories
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn categories(State(state): State<AppState>) -> Result<AppJson<Vec<CategoryCount>>> {
    let counts = BlogRepository::new(state.pool()).published_counts().await?;
    Ok(AppJson(category_counts(&counts)))
}

/// GET /api/blogs/admin/all
///
/// # Errors
///
/// Returns 400 for an unknown status filter.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppQuery(query): AppQuery<BlogQuery>,
) -> Result<AppJson<BlogPage>> {
    let pagination = query.pagination(ADMIN_PAGE_SIZE);
    let status = non_empty(query.status.as_deref())
        .map(str::parse::<BlogStatus>)
        .transpose()
        .map_err(|_| AppError::BadRequest("Invalid status filter".to_string()))?;

    let (blogs, total) = BlogRepository::new(state.pool())
        .list_all(
            query.search.as_deref(),
            status,
            i64::from(pagination.limit()),
            pagination.offset(),
        )
        .await?;

    Ok(AppJson(BlogPage {
        blogs,
        pagination: PageInfo::new(pagination, total),
    }))
}

/// GET /api/blogs/{slugOrId}
///
/// A numeric value is tried as an id, then as a slug. Each read counts as a
/// view.
///
/// # Errors
///
/// Returns 404 "Blog not found".
pub async fn show(
    State(state): State<AppState>,
    AppPath(slug_or_id): AppPath<String>,
) -> Result<AppJson<Blog>> {
    let blogs = BlogRepository::new(state.pool());

    let by_id = match slug_or_id.parse::<BlogId>() {
        Ok(id) => blogs.get_by_id(id).await?,
        Err(_) => None,
    };
    let blog = match by_id {
        Some(blog) => blog,
        None => blogs.get_by_slug(&slug_or_id).await?.ok_or_else(not_found)?,
    };

    let blog = blogs.record_view(blog.id).await.map_err(|e| match e {
        RepositoryError::NotFound => not_found(),
        other => AppError::Database(other),
    })?;
    Ok(AppJson(blog))
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<String>,
}

/// GET /api/blogs/{id}/related
///
/// # Errors
///
/// Returns 404 "Blog not found".
pub async fn related(
    State(state): State<AppState>,
    AppPath(id): AppPath<BlogId>,
    AppQuery(query): AppQuery<RelatedQuery>,
) -> Result<AppJson<Vec<Blog>>> {
    let limit = query
        .limit
        .as_deref()
        .and_then(|l| l.trim().parse::<i64>().ok())
        .filter(|l| (1..=i64::from(Pagination::MAX_LIMIT)).contains(l))
        .unwrap_or(RELATED_LIMIT);

    let blogs = BlogRepository::new(state.pool());
    let blog = blogs.get_by_id(id).await?.ok_or_else(not_found)?;
    Ok(AppJson(blogs.related(&blog, limit).await?))
}

/// Body for creating or editing a post. Every field is optional so that
/// the same shape serves partial updates.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image: Option<String>,
    pub category: Option<BlogCategory>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub author_image: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub read_time: Option<String>,
    pub status: Option<BlogStatus>,
    pub is_featured: Option<bool>,
}

fn owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Length limits shared by create and update.
fn check_lengths(
    title: &str,
    short_description: Option<&str>,
    excerpt: Option<&str>,
    meta_title: Option<&str>,
    meta_description: Option<&str>,
) -> Result<()> {
    let within = |value: Option<&str>, max: usize| value.is_none_or(|v| v.chars().count() <= max);
    let mut errors = FieldErrors::new();
    errors
        .check(
            within(Some(title), 200),
            "title",
            "Title cannot exceed 200 characters",
        )
        .check(
            within(short_description, 500),
            "shortDescription",
            "Short description cannot exceed 500 characters",
        )
        .check(within(excerpt, 300), "excerpt", "Excerpt cannot exceed 300 characters")
        .check(
            within(meta_title, 60),
            "metaTitle",
            "Meta title cannot exceed 60 characters",
        )
        .check(
            within(meta_description, 160),
            "metaDescription",
            "Meta description cannot exceed 160 characters",
        );
    errors.into_result().map_err(|errors| AppError::Validation {
        message: "Validation failed".to_string(),
        errors,
    })
}

impl BlogRequest {
    /// Build a new draft (unless a status is given) from a create request.
    fn into_new(self, admin: &User) -> Result<NewBlog> {
        let (Some(title), Some(content), Some(image), Some(category), Some(author)) = (
            owned(self.title.as_deref()),
            owned(self.content.as_deref()),
            owned(self.image.as_deref()),
            self.category,
            owned(self.author.as_deref()),
        ) else {
            return Err(AppError::BadRequest(
                "Please provide title, content, image, category, and author".to_string(),
            ));
        };

        let mut text = BlogText {
            slug: Some(slugify(&title)),
            short_description: owned(self.short_description.as_deref()),
            excerpt: owned(self.excerpt.as_deref()),
            content: Some(content),
            meta_title: owned(self.meta_title.as_deref()),
            meta_description: owned(self.meta_description.as_deref()),
            title,
        };
        let excerpt = text.default_excerpt();
        if text.short_description.is_none() {
            text.short_description = text
                .excerpt
                .clone()
                .or_else(|| text.content.as_deref().map(|c| truncate(c, 200)));
        }
        let text = text.derived();
        check_lengths(
            &text.title,
            text.short_description.as_deref(),
            excerpt.as_deref(),
            text.meta_title.as_deref(),
            text.meta_description.as_deref(),
        )?;
        let status = self.status.unwrap_or_default();

        let new = NewBlog {
            title: text.title,
            slug: text.slug.unwrap_or_default(),
            short_description: text.short_description,
            content: text.content,
            excerpt,
            image,
            author,
            author_image: owned(self.author_image.as_deref())
                .unwrap_or_else(|| DEFAULT_AUTHOR_IMAGE.to_string()),
            user_id: Some(admin.id),
            category,
            tags: clean_tags(self.tags.unwrap_or_default()),
            meta_title: text.meta_title,
            meta_description: text.meta_description,
            read_time: owned(self.read_time.as_deref())
                .unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
            status,
            is_featured: self.is_featured.unwrap_or(false),
            published_at: first_published(status, None, Utc::now()),
        };
        Ok(new)
    }

    /// Apply a partial update. Blank strings leave the stored value alone.
    fn apply_to(self, blog: &mut Blog) {
        if let Some(title) = owned(self.title.as_deref()) {
            if non_empty(self.slug.as_deref()).is_none() {
                blog.slug = Some(slugify(&title));
            }
            blog.title = title;
        }
        if let Some(slug) = owned(self.slug.as_deref()) {
            blog.slug = Some(slug);
        }
        if let Some(v) = owned(self.short_description.as_deref()) {
            blog.short_description = Some(v);
        }
        if let Some(v) = owned(self.content.as_deref()) {
            blog.content = Some(v);
        }
        if let Some(v) = owned(self.excerpt.as_deref()) {
            blog.excerpt = Some(v);
        }
        if let Some(v) = owned(self.image.as_deref()) {
            blog.image = v;
        }
        if let Some(category) = self.category {
            blog.category = category;
        }
        if let Some(tags) = self.tags {
            blog.tags = clean_tags(tags);
        }
        if let Some(v) = owned(self.author.as_deref()) {
            blog.author = v;
        }
        if let Some(v) = owned(self.author_image.as_deref()) {
            blog.author_image = v;
        }
        if let Some(v) = owned(self.meta_title.as_deref()) {
            blog.meta_title = Some(v);
        }
        if let Some(v) = owned(self.meta_description.as_deref()) {
            blog.meta_description = Some(v);
        }
        if let Some(v) = owned(self.read_time.as_deref()) {
            blog.read_time = v;
        }
        if let Some(status) = self.status {
            blog.status = status;
        }
        if let Some(featured) = self.is_featured {
            blog.is_featured = featured;
        }
    }
}

fn save_error(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::Conflict(_) => AppError::BadRequest(DUPLICATE_TITLE.to_string()),
        RepositoryError::NotFound => not_found(),
        other => AppError::Database(other),
    }
}

/// POST /api/blogs
///
/// # Errors
///
/// Returns 400 when a required field is missing or the title's slug is taken.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(req): AppJson<BlogRequest>,
) -> Result<(StatusCode, AppJson<Blog>)> {
    let new = req.into_new(&admin)?;
    let blogs = BlogRepository::new(state.pool());

    if blogs.get_by_slug(&new.slug).await?.is_some() {
        return Err(AppError::BadRequest(DUPLICATE_TITLE.to_string()));
    }

    let blog = blogs.create(&new).await.map_err(save_error)?;
    tracing::info!(blog_id = %blog.id, slug = ?blog.slug, admin_id = %admin.id, "Blog created");
    Ok((StatusCode::CREATED, AppJson(blog)))
}

/// PUT /api/blogs/{id}
///
/// # Errors
///
/// Returns 404 "Blog not found", or 400 for a taken slug or over-long field.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<BlogId>,
    AppJson(req): AppJson<BlogRequest>,
) -> Result<AppJson<Blog>> {
    let blogs = BlogRepository::new(state.pool());
    let mut blog = blogs.get_by_id(id).await?.ok_or_else(not_found)?;

    req.apply_to(&mut blog);
    blog.prepare_save(Utc::now());
    check_lengths(
        &blog.title,
        blog.short_description.as_deref(),
        blog.excerpt.as_deref(),
        blog.meta_title.as_deref(),
        blog.meta_description.as_deref(),
    )?;

    let blog = blogs.save(&blog).await.map_err(save_error)?;
    tracing::info!(blog_id = %blog.id, "Blog updated");
    Ok(AppJson(blog))
}

/// PUT /api/blogs/{id}/toggle-status
///
/// # Errors
///
/// Returns 404 "Blog not found".
pub async fn toggle_status(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<BlogId>,
) -> Result<AppJson<Blog>> {
    let blogs = BlogRepository::new(state.pool());
    let mut blog = blogs.get_by_id(id).await?.ok_or_else(not_found)?;

    blog.status = blog.status.toggled();
    blog.prepare_save(Utc::now());

    let blog = blogs.save(&blog).await.map_err(save_error)?;
    tracing::info!(blog_id = %blog.id, status = ?blog.status, "Blog status toggled");
    Ok(AppJson(blog))
}

/// DELETE /api/blogs/{id}
///
/// # Errors
///
/// Returns 404 "Blog not found".
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<BlogId>,
) -> Result<AppJson<Value>> {
    if !BlogRepository::new(state.pool()).delete(id).await? {
        return Err(not_found());
    }
    tracing::info!(blog_id = %id, "Blog deleted");
    Ok(AppJson(json!({ "message": "Blog deleted successfully" })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hridved_core::UserId;

    use super::*;
    use crate::models::user::tests::sample_user;

    fn admin() -> User {
        User {
            id: UserId::new(1),
            is_admin: true,
            ..sample_user()
        }
    }

    fn request(json: &str) -> BlogRequest {
        serde_json::from_str(json).unwrap()
    }

    fn stored(title: &str) -> Blog {
        let now = Utc::now();
        Blog {
            id: BlogId::new(7),
            title: title.to_string(),
            slug: Some(slugify(title)),
            short_description: Some("Short".to_string()),
            content: Some("Body".to_string()),
            excerpt: None,
            image: "/images/neem.jpg".to_string(),
            author: "Dr. Rao".to_string(),
            author_image: DEFAULT_AUTHOR_IMAGE.to_string(),
            user_id: None,
            category: BlogCategory::Ayurveda,
            tags: vec!["neem".to_string()],
            meta_title: Some(title.to_string()),
            meta_description: Some("Short".to_string()),
            read_time: DEFAULT_READ_TIME.to_string(),
            views: 0,
            status: BlogStatus::Draft,
            is_featured: false,
            published_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_requires_core_fields() {
        let err = request(r#"{"title": "Neem", "content": "Body"}"#)
            .into_new(&admin())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::BadRequest(msg) if msg == "Please provide title, content, image, category, and author"
        ));
    }

    #[test]
    fn test_create_derives_defaults() {
        let body = "c".repeat(400);
        let new = request(&format!(
            r#"{{"title": "Neem for Skin", "content": "{body}", "image": "/n.jpg",
                "category": "Skin Care", "author": "Dr. Rao", "tags": [" neem ", ""]}}"#
        ))
        .into_new(&admin())
        .unwrap();

        assert_eq!(new.slug, "neem-for-skin");
        assert_eq!(new.short_description.as_deref().unwrap().len(), 200);
        assert_eq!(new.excerpt.as_deref().unwrap().len(), 300);
        assert_eq!(new.meta_title.as_deref(), Some("Neem for Skin"));
        assert_eq!(new.author_image, DEFAULT_AUTHOR_IMAGE);
        assert_eq!(new.read_time, DEFAULT_READ_TIME);
        assert_eq!(new.status, BlogStatus::Draft);
        assert_eq!(new.tags, vec!["neem".to_string()]);
        assert!(new.published_at.is_none());
        assert_eq!(new.user_id, Some(UserId::new(1)));
    }

    #[test]
    fn test_create_published_stamps_date() {
        let new = request(
            r#"{"title": "Yoga", "content": "Body", "image": "/y.jpg",
                "category": "Yoga", "author": "A", "status": "published"}"#,
        )
        .into_new(&admin())
        .unwrap();
        assert!(new.published_at.is_some());
    }

    #[test]
    fn test_title_change_regenerates_slug() {
        let mut blog = stored("Neem");
        request(r#"{"title": "Neem Oil Uses"}"#).apply_to(&mut blog);
        assert_eq!(blog.slug.as_deref(), Some("neem-oil-uses"));

        let mut blog = stored("Neem");
        request(r#"{"title": "Neem Oil Uses", "slug": "neem-oil"}"#).apply_to(&mut blog);
        assert_eq!(blog.slug.as_deref(), Some("neem-oil"));
    }

    #[test]
    fn test_update_ignores_blank_fields() {
        let mut blog = stored("Neem");
        request(r#"{"title": "  ", "author": "", "isFeatured": true}"#).apply_to(&mut blog);
        assert_eq!(blog.title, "Neem");
        assert_eq!(blog.author, "Dr. Rao");
        assert!(blog.is_featured);
    }

    #[test]
    fn test_length_limits() {
        assert!(check_lengths("Neem", Some("Short"), None, Some("Neem"), None).is_ok());
        let long = "m".repeat(61);
        let Err(AppError::Validation { errors, .. }) =
            check_lengths("Neem", None, None, Some(&long), None)
        else {
            panic!("expected validation error");
        };
        assert!(errors.get("metaTitle").is_some());
    }

    #[test]
    fn test_create_rejects_long_meta_title() {
        let title = "t".repeat(10);
        let meta = "m".repeat(70);
        let result = request(&format!(
            r#"{{"title": "{title}", "content": "Body", "image": "/i.jpg",
                "category": "Yoga", "author": "A", "metaTitle": "{meta}"}}"#
        ))
        .into_new(&admin());
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_category_counts_cover_all_categories() {
        let counts = category_counts(&[(BlogCategory::Yoga, 4)]);
        assert_eq!(counts.len(), 10);
        let yoga = counts.iter().find(|c| c.name == BlogCategory::Yoga).unwrap();
        assert_eq!(yoga.count, 4);
        assert!(counts.iter().filter(|c| c.name != BlogCategory::Yoga).all(|c| c.count == 0));
        let json = serde_json::to_value(&counts[0]).unwrap();
        assert_eq!(json["name"], "Skin Care");
    }
}
