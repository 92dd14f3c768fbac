//! Blog posts and the field derivations applied whenever one is saved.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hridved_core::{BlogCategory, BlogId, BlogStatus, UserId, slugify};

/// Placeholder used when a post has no author image.
pub const DEFAULT_AUTHOR_IMAGE: &str = "https://via.placeholder.com/150";

/// Placeholder short description when nothing else is available.
pub const NO_DESCRIPTION: &str = "No description provided";

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Blog {
    #[serde(rename = "_id")]
    pub id: BlogId,
    pub title: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    /// `None` in list responses, which omit the body.
    #[serde(skip_serializing_if = "Option::is_none")]
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
    pub views: i32,
    pub status: BlogStatus,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Blog {
    /// Re-apply the save-time derivations after an edit.
    ///
    /// `published_at` is stamped the first time the post is published and
    /// kept when it is later unpublished.
    pub fn prepare_save(&mut self, now: DateTime<Utc>) {
        let text = BlogText {
            title: self.title.clone(),
            slug: self.slug.take(),
            short_description: self.short_description.take(),
            content: self.content.clone(),
            excerpt: self.excerpt.clone(),
            meta_title: self.meta_title.take(),
            meta_description: self.meta_description.take(),
        }
        .derived();
        self.slug = text.slug;
        self.short_description = text.short_description;
        self.meta_title = text.meta_title;
        self.meta_description = text.meta_description;
        self.published_at = first_published(self.status, self.published_at, now);
    }
}

/// `published_at` after a save with `status`.
#[must_use]
pub fn first_published(
    status: BlogStatus,
    published_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, published_at) {
        (BlogStatus::Published, None) => Some(now),
        (_, existing) => existing,
    }
}

/// The text fields a save derives from one another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogText {
    pub title: String,
    pub slug: Option<String>,
    pub short_description: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl BlogText {
    /// Fill every derivable field that is missing or blank.
    ///
    /// Slug from the title, short description from excerpt or content, meta
    /// title from the title and meta description from the short description.
    #[must_use]
    pub fn derived(mut self) -> Self {
        if blank(self.slug.as_deref()) {
            self.slug = Some(slugify(&self.title));
        }
        if blank(self.short_description.as_deref()) {
            self.short_description = Some(
                non_blank(self.excerpt.as_deref())
                    .map(str::to_string)
                    .or_else(|| non_blank(self.content.as_deref()).map(|c| truncate(c, 200)))
                    .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            );
        }
        if blank(self.meta_title.as_deref()) {
            self.meta_title = Some(truncate(&self.title, 60));
        }
        if blank(self.meta_description.as_deref()) {
            self.meta_description = self
                .short_description
                .as_deref()
                .map(|d| truncate(d, 160));
        }
        self
    }

    /// Excerpt for a new post: the given one, else the first 300 characters
    /// of the short description or content.
    #[must_use]
    pub fn default_excerpt(&self) -> Option<String> {
        non_blank(self.excerpt.as_deref())
            .map(str::to_string)
            .or_else(|| {
                non_blank(self.short_description.as_deref())
                    .or_else(|| non_blank(self.content.as_deref()))
                    .map(|text| truncate(text, 300))
            })
    }
}

fn blank(value: Option<&str>) -> bool {
    non_blank(value).is_none()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// First `max` characters of `text`, on a char boundary.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn text(title: &str) -> BlogText {
        BlogText {
            title: title.to_string(),
            ..BlogText::default()
        }
    }

    #[test]
    fn test_derives_from_title_and_content() {
        let mut t = text("Ashwagandha & Sleep: A Guide");
        t.content = Some("a".repeat(450));
        let d = t.derived();
        assert_eq!(d.slug.as_deref(), Some("ashwagandha-sleep-a-guide"));
        assert_eq!(d.short_description.as_deref().unwrap().len(), 200);
        assert_eq!(d.meta_title.as_deref(), Some("Ashwagandha & Sleep: A Guide"));
        assert_eq!(d.meta_description.as_deref().unwrap().len(), 160);
    }

    #[test]
    fn test_excerpt_preferred_for_short_description() {
        let mut t = text("Triphala");
        t.excerpt = Some("Three fruits, one tonic.".to_string());
        t.content = Some("Long body".to_string());
        let d = t.derived();
        assert_eq!(d.short_description.as_deref(), Some("Three fruits, one tonic."));
    }

    #[test]
    fn test_blank_fields_are_replaced() {
        let mut t = text("Neem");
        t.slug = Some("   ".to_string());
        let d = t.derived();
        assert_eq!(d.slug.as_deref(), Some("neem"));
        assert_eq!(d.short_description.as_deref(), Some(NO_DESCRIPTION));
    }

    #[test]
    fn test_explicit_values_kept() {
        let mut t = text("A very long title that keeps going well past the sixty character limit");
        t.slug = Some("custom-slug".to_string());
        t.meta_title = Some("Short".to_string());
        let d = t.derived();
        assert_eq!(d.slug.as_deref(), Some("custom-slug"));
        assert_eq!(d.meta_title.as_deref(), Some("Short"));
    }

    #[test]
    fn test_default_excerpt() {
        let mut t = text("Tulsi");
        assert_eq!(t.default_excerpt(), None);
        t.content = Some("b".repeat(400));
        assert_eq!(t.default_excerpt().unwrap().len(), 300);
        t.short_description = Some("Holy basil".to_string());
        assert_eq!(t.default_excerpt().as_deref(), Some("Holy basil"));
    }

    #[test]
    fn test_first_published_stamped_once() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::days(3);
        assert_eq!(first_published(BlogStatus::Draft, None, now), None);
        assert_eq!(first_published(BlogStatus::Published, None, now), Some(now));
        assert_eq!(
            first_published(BlogStatus::Published, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(first_published(BlogStatus::Draft, Some(earlier), now), Some(earlier));
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("आयुर्वेद", 3), "आयु");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
