//! Blog maintenance commands.

use hridved_api::db::BlogRepository;
use hridved_api::db::blogs::BackfillRow;
use hridved_api::models::blog::BlogText;
use hridved_core::BlogStatus;

use super::{CliError, connect};

/// Fill derived fields and null defaults on every post that needs it.
///
/// A failing row is logged and skipped.
///
/// # Errors
///
/// Returns an error if the posts cannot be loaded.
pub async fn backfill() -> Result<(), CliError> {
    let pool = connect().await?;
    let repo = BlogRepository::new(&pool);

    let rows = repo.backfill_rows().await?;
    let total = rows.len();
    let mut updated = 0_usize;
    let mut errors = 0_usize;

    for row in rows {
        let Some(fixed) = repair(row) else {
            continue;
        };
        match repo.apply_backfill(&fixed).await {
            Ok(()) => {
                updated += 1;
                tracing::info!(id = %fixed.id, title = %fixed.title, "Updated blog");
            }
            Err(e) => {
                errors += 1;
                tracing::error!(id = %fixed.id, error = %e, "Failed to update blog");
            }
        }
    }

    tracing::info!(updated, errors, total, "Blog backfill complete");
    Ok(())
}

/// The repaired row, or `None` when nothing changes.
fn repair(row: BackfillRow) -> Option<BackfillRow> {
    let text = BlogText {
        title: row.title.clone(),
        slug: row.slug.clone(),
        short_description: row.short_description.clone(),
        content: row.content.clone(),
        excerpt: row.excerpt.clone(),
        meta_title: row.meta_title.clone(),
        meta_description: row.meta_description.clone(),
    }
    .derived();

    let fixed = BackfillRow {
        slug: text.slug,
        short_description: text.short_description,
        meta_title: text.meta_title,
        meta_description: text.meta_description,
        views: Some(row.views.unwrap_or(0)),
        status: Some(row.status.unwrap_or(BlogStatus::Published)),
        is_featured: Some(row.is_featured.unwrap_or(false)),
        ..row.clone()
    };

    let changed = fixed.slug != row.slug
        || fixed.short_description != row.short_description
        || fixed.meta_title != row.meta_title
        || fixed.meta_description != row.meta_description
        || fixed.views != row.views
        || fixed.status != row.status
        || fixed.is_featured != row.is_featured;

    changed.then_some(fixed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hridved_core::BlogId;

    use super::*;

    fn complete_row() -> BackfillRow {
        BackfillRow {
            id: BlogId::new(1),
            title: "Morning Rituals".to_string(),
            slug: Some("morning-rituals".to_string()),
            short_description: Some("Start the day well".to_string()),
            content: Some("Oil pulling, tongue scraping and warm water.".to_string()),
            excerpt: None,
            meta_title: Some("Morning Rituals".to_string()),
            meta_description: Some("Start the day well".to_string()),
            views: Some(12),
            status: Some(BlogStatus::Draft),
            is_featured: Some(true),
        }
    }

    #[test]
    fn test_complete_row_is_untouched() {
        assert!(repair(complete_row()).is_none());
    }

    #[test]
    fn test_missing_fields_are_derived() {
        let row = BackfillRow {
            slug: None,
            short_description: Some("   ".to_string()),
            meta_title: None,
            meta_description: None,
            ..complete_row()
        };
        let fixed = repair(row).unwrap();
        assert_eq!(fixed.slug.as_deref(), Some("morning-rituals"));
        assert_eq!(
            fixed.short_description.as_deref(),
            Some("Oil pulling, tongue scraping and warm water.")
        );
        assert_eq!(fixed.meta_title.as_deref(), Some("Morning Rituals"));
        assert_eq!(fixed.status, Some(BlogStatus::Draft));
    }

    #[test]
    fn test_null_defaults() {
        let row = BackfillRow {
            views: None,
            status: None,
            is_featured: None,
            ..complete_row()
        };
        let fixed = repair(row).unwrap();
        assert_eq!(fixed.views, Some(0));
        assert_eq!(fixed.status, Some(BlogStatus::Published));
        assert_eq!(fixed.is_featured, Some(false));
    }
}
