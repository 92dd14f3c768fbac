//! Site content: home page sections, the about page, tips and contact messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use hridved_core::{ContactId, ContentSectionId, TipId};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
}

/// One named block of the home page (hero, banners, features...).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ContentSection {
    #[serde(rename = "_id")]
    pub id: ContentSectionId,
    pub section: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub image: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
    pub items: Json<Vec<ContentItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreValue {
    pub title: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AboutPage {
    #[serde(rename = "_id")]
    pub id: i32,
    pub hero_title: String,
    pub hero_description: String,
    pub hero_image: String,
    pub our_story_title: String,
    pub our_story_description: String,
    pub founded_year: String,
    pub experise_count: String,
    pub healed_count: String,
    pub mission_title: String,
    pub mission_description: String,
    pub vision_title: String,
    pub vision_description: String,
    #[serde(rename = "values")]
    pub core_values: Json<Vec<CoreValue>>,
    pub team_image1: Option<String>,
    pub team_image2: Option<String>,
    pub team_image3: Option<String>,
    pub team_image4: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tip {
    #[serde(rename = "_id")]
    pub id: TipId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
