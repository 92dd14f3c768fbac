//! Home page sections and the about page singleton.

use sqlx::PgPool;
use sqlx::types::Json;

use super::RepositoryError;
use crate::models::{AboutPage, ContentItem, ContentSection, CoreValue};

const SECTION_COLUMNS: &str =
    "id, section, title, subtitle, image, cta_text, cta_link, items, created_at, updated_at";

const ABOUT_COLUMNS: &str = "id, hero_title, hero_description, hero_image, our_story_title, \
    our_story_description, founded_year, experise_count, healed_count, mission_title, \
    mission_description, vision_title, vision_description, core_values, team_image1, \
    team_image2, team_image3, team_image4, created_at, updated_at";

/// Section fields to overwrite; `None` keeps what is stored.
#[derive(Debug, Clone, Default)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub items: Option<Vec<ContentItem>>,
}

/// About page fields to overwrite; `None` keeps what is stored.
#[derive(Debug, Clone, Default)]
pub struct AboutPatch {
    pub hero_title: Option<String>,
    pub hero_description: Option<String>,
    pub hero_image: Option<String>,
    pub our_story_title: Option<String>,
    pub our_story_description: Option<String>,
    pub founded_year: Option<String>,
    pub experise_count: Option<String>,
    pub healed_count: Option<String>,
    pub mission_title: Option<String>,
    pub mission_description: Option<String>,
    pub vision_title: Option<String>,
    pub vision_description: Option<String>,
    pub values: Option<Vec<CoreValue>>,
    pub team_image1: Option<String>,
    pub team_image2: Option<String>,
    pub team_image3: Option<String>,
    pub team_image4: Option<String>,
}

/// Repository for site content.
pub struct ContentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContentRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sections(&self) -> Result<Vec<ContentSection>, RepositoryError> {
        let sections = sqlx::query_as::<_, ContentSection>(&format!(
            "SELECT {SECTION_COLUMNS} FROM hridved.content_sections ORDER BY section"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(sections)
    }

    /// Create the section or merge the patch into it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_section(
        &self,
        section: &str,
        patch: &SectionPatch,
    ) -> Result<ContentSection, RepositoryError> {
        let updated = sqlx::query_as::<_, ContentSection>(&format!(
            r"
            INSERT INTO hridved.content_sections
                (section, title, subtitle, image, cta_text, cta_link, items)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, '[]'::jsonb))
            ON CONFLICT (section) DO UPDATE
            SET title = COALESCE($2, content_sections.title),
                subtitle = COALESCE($3, content_sections.subtitle),
                image = COALESCE($4, content_sections.image),
                cta_text = COALESCE($5, content_sections.cta_text),
                cta_link = COALESCE($6, content_sections.cta_link),
                items = COALESCE($7, content_sections.items),
                updated_at = NOW()
            RETURNING {SECTION_COLUMNS}
            "
        ))
        .bind(section)
        .bind(patch.title.as_deref())
        .bind(patch.subtitle.as_deref())
        .bind(patch.image.as_deref())
        .bind(patch.cta_text.as_deref())
        .bind(patch.cta_link.as_deref())
        .bind(patch.items.as_ref().map(Json))
        .fetch_one(self.pool)
        .await?;
        Ok(updated)
    }

    /// The about page, created with its defaults on first read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn about(&self) -> Result<AboutPage, RepositoryError> {
        let existing = sqlx::query_as::<_, AboutPage>(&format!(
            "SELECT {ABOUT_COLUMNS} FROM hridved.about_page ORDER BY id LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;

        if let Some(about) = existing {
            return Ok(about);
        }

        let created = sqlx::query_as::<_, AboutPage>(&format!(
            "INSERT INTO hridved.about_page DEFAULT VALUES RETURNING {ABOUT_COLUMNS}"
        ))
        .fetch_one(self.pool)
        .await?;
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_about(&self, patch: &AboutPatch) -> Result<AboutPage, RepositoryError> {
        let current = self.about().await?;

        let updated = sqlx::query_as::<_, AboutPage>(&format!(
            r"
            UPDATE hridved.about_page
            SET hero_title = COALESCE($2, hero_title),
                hero_description = COALESCE($3, hero_description),
                hero_image = COALESCE($4, hero_image),
                our_story_title = COALESCE($5, our_story_title),
                our_story_description = COALESCE($6, our_story_description),
                founded_year = COALESCE($7, founded_year),
                experise_count = COALESCE($8, experise_count),
                healed_count = COALESCE($9, healed_count),
                mission_title = COALESCE($10, mission_title),
                mission_description = COALESCE($11, mission_description),
                vision_title = COALESCE($12, vision_title),
                vision_description = COALESCE($13, vision_description),
                core_values = COALESCE($14, core_values),
                team_image1 = COALESCE($15, team_image1),
                team_image2 = COALESCE($16, team_image2),
                team_image3 = COALESCE($17, team_image3),
                team_image4 = COALESCE($18, team_image4),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ABOUT_COLUMNS}
            "
        ))
        .bind(current.id)
        .bind(patch.hero_title.as_deref())
        .bind(patch.hero_description.as_deref())
        .bind(patch.hero_image.as_deref())
        .bind(patch.our_story_title.as_deref())
        .bind(patch.our_story_description.as_deref())
        .bind(patch.founded_year.as_deref())
        .bind(patch.experise_count.as_deref())
        .bind(patch.healed_count.as_deref())
        .bind(patch.mission_title.as_deref())
        .bind(patch.mission_description.as_deref())
        .bind(patch.vision_title.as_deref())
        .bind(patch.vision_description.as_deref())
        .bind(patch.values.as_ref().map(Json))
        .bind(patch.team_image1.as_deref())
        .bind(patch.team_image2.as_deref())
        .bind(patch.team_image3.as_deref())
        .bind(patch.team_image4.as_deref())
        .fetch_one(self.pool)
        .await?;
        Ok(updated)
    }
}
