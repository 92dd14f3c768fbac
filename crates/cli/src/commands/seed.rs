//! Seed commands.
//!
//! The YAML file holds a list of posts:
//!
//! ```yaml
//! - title: "Ayurvedic Morning Rituals"
//!   content: "Start with tongue scraping..."
//!   author: "Dr. Meera"
//!   category: "General Wellness"
//!   readTime: "5 min read"
//!   image: "https://res.cloudinary.com/.../morning.jpg"
//!   isFeatured: true
//! ```

use std::path::Path;

use chrono::Utc;
use serde::Deserialize;

use hridved_api::db::blogs::NewBlog;
use hridved_api::db::{BlogRepository, RepositoryError};
use hridved_api::models::blog::{BlogText, DEFAULT_AUTHOR_IMAGE};
use hridved_core::{BlogCategory, BlogStatus};

use super::{CliError, connect};

const DEFAULT_AUTHOR: &str = "Hridved";
const DEFAULT_READ_TIME: &str = "5 min read";

/// One post as written in the seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedBlog {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub read_time: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Insert every post in `file` as published.
///
/// Posts whose slug already exists are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the database
/// is unreachable.
pub async fn blogs(file: &str, clear: bool) -> Result<(), CliError> {
    let posts = load(Path::new(file))?;
    tracing::info!(count = posts.len(), file, "Loaded seed posts");

    let pool = connect().await?;
    let repo = BlogRepository::new(&pool);

    if clear {
        let removed = repo.delete_all().await?;
        tracing::info!(removed, "Cleared existing blogs");
    }

    let mut created = 0_usize;
    let mut skipped = 0_usize;
    for post in posts {
        let blog = new_blog(post);
        if repo.get_by_slug(&blog.slug).await?.is_some() {
            tracing::info!(slug = %blog.slug, "Blog already exists, skipping");
            skipped += 1;
            continue;
        }
        match repo.create(&blog).await {
            Ok(saved) => {
                created += 1;
                tracing::info!(id = %saved.id, title = %saved.title, "Created blog");
            }
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(slug = %blog.slug, "Blog already exists, skipping");
                skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(created, skipped, "Blog seeding complete");
    Ok(())
}

fn load(path: &Path) -> Result<Vec<SeedBlog>, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_yaml::from_str(&raw)?)
}

/// Category label from the file, or `Other` when it is unknown.
fn category(label: Option<&str>) -> BlogCategory {
    let Some(label) = label else {
        return BlogCategory::Other;
    };
    label.parse().unwrap_or_else(|_| {
        tracing::warn!(category = label, "Unknown blog category, using Other");
        BlogCategory::Other
    })
}

fn new_blog(post: SeedBlog) -> NewBlog {
    let text = BlogText {
        title: post.title,
        slug: post.slug,
        short_description: post.short_description,
        content: post.content,
        excerpt: post.excerpt,
        meta_title: None,
        meta_description: None,
    }
    .derived();
    let excerpt = text.default_excerpt();

    NewBlog {
        slug: text.slug.unwrap_or_default(),
        title: text.title,
        short_description: text.short_description,
        content: text.content,
        excerpt,
        image: post.image,
        author: post.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        author_image: post
            .author_image
            .unwrap_or_else(|| DEFAULT_AUTHOR_IMAGE.to_string()),
        user_id: None,
        category: category(post.category.as_deref()),
        tags: post.tags,
        meta_title: text.meta_title,
        meta_description: text.meta_description,
        read_time: post
            .read_time
            .unwrap_or_else(|| DEFAULT_READ_TIME.to_string()),
        status: BlogStatus::Published,
        is_featured: post.is_featured,
        published_at: Some(Utc::now()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels() {
        assert_eq!(category(Some("Skin Care")), BlogCategory::SkinCare);
        assert_eq!(category(Some("Tips & Tricks")), BlogCategory::TipsAndTricks);
        assert_eq!(category(Some("Diet & Nutrition")), BlogCategory::Other);
        assert_eq!(category(None), BlogCategory::Other);
    }

    #[test]
    fn test_new_blog_derivations() {
        let yaml = r#"
- title: "Triphala for Digestion"
  content: "Triphala is a blend of three fruits."
  category: "Ayurveda"
  readTime: "4 min read"
  isFeatured: true
"#;
        let posts: Vec<SeedBlog> = serde_yaml::from_str(yaml).unwrap();
        let blog = new_blog(posts.into_iter().next().unwrap());

        assert_eq!(blog.slug, "triphala-for-digestion");
        assert_eq!(blog.category, BlogCategory::Ayurveda);
        assert_eq!(blog.status, BlogStatus::Published);
        assert!(blog.is_featured);
        assert!(blog.published_at.is_some());
        assert_eq!(blog.author, DEFAULT_AUTHOR);
        assert_eq!(blog.author_image, DEFAULT_AUTHOR_IMAGE);
        assert_eq!(
            blog.excerpt.as_deref(),
            Some("Triphala is a blend of three fruits.")
        );
        assert_eq!(blog.meta_title.as_deref(), Some("Triphala for Digestion"));
    }

    #[test]
    fn test_bundled_seed_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed/blogs.yaml");
        let posts = load(&path).unwrap();
        assert!(!posts.is_empty());
        assert!(posts.iter().all(|p| !p.title.is_empty()));
    }
}
