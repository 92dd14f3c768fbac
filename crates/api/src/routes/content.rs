//! Site content routes: about page, home page sections, tips and contact.

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use hridved_core::TipId;
use hridved_core::validation::{FieldErrors, is_valid_email};

use crate::db::content::{AboutPatch, SectionPatch};
use crate::db::{ContactRepository, ContentRepository, RepositoryError, TipRepository};
use crate::error::{AppError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireAdmin;
use crate::models::{AboutPage, Contact, ContentItem, ContentSection, CoreValue, Tip};
use crate::state::AppState;

/// Trimmed value, or `None` when blank.
fn provided(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// About
// =============================================================================

/// GET /api/about
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn about(State(state): State<AppState>) -> Result<AppJson<AboutPage>> {
    let page = ContentRepository::new(state.pool()).about().await?;
    Ok(AppJson(page))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutRequest {
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

impl From<AboutRequest> for AboutPatch {
    fn from(req: AboutRequest) -> Self {
        Self {
            hero_title: provided(req.hero_title),
            hero_description: provided(req.hero_description),
            hero_image: provided(req.hero_image),
            our_story_title: provided(req.our_story_title),
            our_story_description: provided(req.our_story_description),
            founded_year: provided(req.founded_year),
            experise_count: provided(req.experise_count),
            healed_count: provided(req.healed_count),
            mission_title: provided(req.mission_title),
            mission_description: provided(req.mission_description),
            vision_title: provided(req.vision_title),
            vision_description: provided(req.vision_description),
            values: req.values.filter(|v| !v.is_empty()),
            team_image1: provided(req.team_image1),
            team_image2: provided(req.team_image2),
            team_image3: provided(req.team_image3),
            team_image4: provided(req.team_image4),
        }
    }
}

/// PUT /api/about
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn update_about(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(req): AppJson<AboutRequest>,
) -> Result<AppJson<AboutPage>> {
    let page = ContentRepository::new(state.pool())
        .update_about(&AboutPatch::from(req))
        .await?;
    tracing::info!(admin_id = %admin.id, "About page updated");
    Ok(AppJson(page))
}

// =============================================================================
// Home page sections
// =============================================================================

/// GET /api/content
///
/// Sections keyed by name.
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn sections(
    State(state): State<AppState>,
) -> Result<AppJson<BTreeMap<String, ContentSection>>> {
    let sections = ContentRepository::new(state.pool()).sections().await?;
    Ok(AppJson(
        sections
            .into_iter()
            .map(|s| (s.section.clone(), s))
            .collect(),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub items: Option<Vec<ContentItem>>,
}

impl From<SectionRequest> for SectionPatch {
    fn from(req: SectionRequest) -> Self {
        Self {
            title: provided(req.title),
            subtitle: provided(req.subtitle),
            image: provided(req.image),
            cta_text: provided(req.cta_text),
            cta_link: provided(req.cta_link),
            items: req.items,
        }
    }
}

/// PUT /api/content/{section}
///
/// Creates the section on first write.
///
/// # Errors
///
/// Returns 400 for a blank section name.
pub async fn update_section(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(section): AppPath<String>,
    AppJson(req): AppJson<SectionRequest>,
) -> Result<AppJson<ContentSection>> {
    let section = section.trim();
    if section.is_empty() {
        return Err(AppError::BadRequest("Section is required".to_string()));
    }

    let updated = ContentRepository::new(state.pool())
        .upsert_section(section, &SectionPatch::from(req))
        .await?;
    tracing::info!(section, "Content section saved");
    Ok(AppJson(updated))
}

// =============================================================================
// Tips
// =============================================================================

fn tip_not_found() -> AppError {
    AppError::NotFound("Tip not found".to_string())
}

/// GET /api/tips
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn tips(State(state): State<AppState>) -> Result<AppJson<Vec<Tip>>> {
    Ok(AppJson(TipRepository::new(state.pool()).list().await?))
}

/// GET /api/tips/{id}
///
/// # Errors
///
/// Returns 404 "Tip not found".
pub async fn tip(
    State(state): State<AppState>,
    AppPath(id): AppPath<TipId>,
) -> Result<AppJson<Tip>> {
    let tip = TipRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(tip_not_found)?;
    Ok(AppJson(tip))
}

/// POST /api/tips
///
/// Creates a placeholder tip for the admin to edit.
///
/// # Errors
///
/// Returns 500 if the insert fails.
pub async fn create_tip(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> Result<(StatusCode, AppJson<Tip>)> {
    let tip = TipRepository::new(state.pool()).create_sample().await?;
    tracing::info!(tip_id = %tip.id, admin_id = %admin.id, "Tip created");
    Ok((StatusCode::CREATED, AppJson(tip)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TipRequest {
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
}

impl TipRequest {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        errors
            .check(!self.title.trim().is_empty(), "title", "Title is required")
            .check(
                !self.description.trim().is_empty(),
                "description",
                "Description is required",
            );
        errors.into_result().map_err(|errors| AppError::Validation {
            message: "Please provide title and description".to_string(),
            errors,
        })
    }
}

/// PUT /api/tips/{id}
///
/// Replaces every field.
///
/// # Errors
///
/// Returns 404 "Tip not found" or 400 when title or description is blank.
pub async fn update_tip(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<TipId>,
    AppJson(req): AppJson<TipRequest>,
) -> Result<AppJson<Tip>> {
    req.validate()?;
    let tip = TipRepository::new(state.pool())
        .update(
            id,
            req.title.trim(),
            req.description.trim(),
            req.image.trim(),
            req.category.trim(),
        )
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => tip_not_found(),
            other => AppError::Database(other),
        })?;
    Ok(AppJson(tip))
}

/// DELETE /api/tips/{id}
///
/// # Errors
///
/// Returns 404 "Tip not found".
pub async fn delete_tip(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    AppPath(id): AppPath<TipId>,
) -> Result<AppJson<Value>> {
    if !TipRepository::new(state.pool()).delete(id).await? {
        return Err(tip_not_found());
    }
    tracing::info!(tip_id = %id, "Tip removed");
    Ok(AppJson(json!({ "message": "Tip removed" })))
}

// =============================================================================
// Contact
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactRequest {
    fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        let mut errors = FieldErrors::new();
        errors
            .check(!self.name.trim().is_empty(), "name", "Name is required")
            .check(!email.is_empty(), "email", "Email is required")
            .check(
                email.is_empty() || is_valid_email(email),
                "email",
                "Please provide a valid email",
            )
            .check(
                !self.message.trim().is_empty(),
                "message",
                "Message is required",
            );
        errors.into_result().map_err(|errors| {
            let message = errors
                .get("email")
                .filter(|_| !email.is_empty())
                .unwrap_or("Please provide name, email and message")
                .to_string();
            AppError::Validation { message, errors }
        })
    }
}

/// POST /api/contact
///
/// # Errors
///
/// Returns 400 when a required field is missing or the email is invalid.
pub async fn create_contact(
    State(state): State<AppState>,
    AppJson(req): AppJson<ContactRequest>,
) -> Result<(StatusCode, AppJson<Contact>)> {
    req.validate()?;
    let contact = ContactRepository::new(state.pool())
        .create(
            req.name.trim(),
            &req.email.trim().to_lowercase(),
            req.phone.trim(),
            req.message.trim(),
        )
        .await?;
    tracing::info!(contact_id = %contact.id, "Contact message received");
    Ok((StatusCode::CREATED, AppJson(contact)))
}

/// GET /api/contact
///
/// # Errors
///
/// Returns 500 if the query fails.
pub async fn contacts(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<AppJson<Vec<Contact>>> {
    Ok(AppJson(ContactRepository::new(state.pool()).list().await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_about_patch_skips_blank_values() {
        let req: AboutRequest = serde_json::from_str(
            r#"{"heroTitle": "Rooted in Ayurveda", "heroDescription": "  ", "values": []}"#,
        )
        .unwrap();
        let patch = AboutPatch::from(req);
        assert_eq!(patch.hero_title.as_deref(), Some("Rooted in Ayurveda"));
        assert!(patch.hero_description.is_none());
        assert!(patch.values.is_none());
        assert!(patch.team_image1.is_none());
    }

    #[test]
    fn test_section_patch_keeps_items_when_given() {
        let req: SectionRequest = serde_json::from_str(
            r#"{"title": "Hero", "ctaText": "", "items": [{"title": "Herbal"}]}"#,
        )
        .unwrap();
        let patch = SectionPatch::from(req);
        assert_eq!(patch.title.as_deref(), Some("Hero"));
        assert!(patch.cta_text.is_none());
        assert_eq!(patch.items.unwrap()[0].title, "Herbal");
    }

    #[test]
    fn test_tip_requires_title_and_description() {
        let req = TipRequest {
            title: "Drink warm water".to_string(),
            ..TipRequest::default()
        };
        let Err(AppError::Validation { errors, .. }) = req.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.get("description"), Some("Description is required"));
        assert!(errors.get("title").is_none());
    }

    #[test]
    fn test_contact_validation() {
        let ok = ContactRequest {
            name: "Ravi".to_string(),
            email: "ravi@example.com".to_string(),
            phone: String::new(),
            message: "Do you ship to Pune?".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = ContactRequest {
            email: "ravi@".to_string(),
            ..ok
        };
        let Err(AppError::Validation { message, .. }) = bad_email.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Please provide a valid email");

        let Err(AppError::Validation { message, .. }) = ContactRequest::default().validate()
        else {
            panic!("expected validation error");
        };
        assert_eq!(message, "Please provide name, email and message");
    }
}
