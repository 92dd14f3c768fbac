//! User accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hridved_core::{Email, OAuthProvider, UserId};

/// A user account row.
///
/// `password_hash` is `None` for accounts created through Google or Facebook.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password_hash: Option<String>,
    pub is_admin: bool,
    pub avatar: String,
    pub profile_image: String,
    pub oauth_provider: OAuthProvider,
    pub oauth_id: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The public shape of a user returned by every auth and profile endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
    pub avatar: String,
    pub profile_image: String,
    pub oauth_provider: OAuthProvider,
    pub phone: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        // OAuth accounts only carry the provider picture
        let avatar = if user.avatar.is_empty() {
            user.profile_image.clone()
        } else {
            user.avatar.clone()
        };
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            avatar,
            profile_image: user.profile_image.clone(),
            oauth_provider: user.oauth_provider,
            phone: user.phone.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_user() -> User {
        User {
            id: UserId::new(7),
            name: "Asha Verma".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            password_hash: None,
            is_admin: false,
            avatar: String::new(),
            profile_image: "https://lh3.googleusercontent.com/a/asha".to_string(),
            oauth_provider: OAuthProvider::Google,
            oauth_id: "1093".to_string(),
            phone: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_avatar_falls_back_to_profile_image() {
        let user = sample_user();
        let response = UserResponse::from(&user);
        assert_eq!(response.avatar, user.profile_image);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["_id"], 7);
        assert_eq!(json["email"], "asha@example.com");
        assert_eq!(json["oauthProvider"], "google");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_explicit_avatar_wins() {
        let mut user = sample_user();
        user.avatar = "/uploads/asha.png".to_string();
        assert_eq!(UserResponse::from(&user).avatar, "/uploads/asha.png");
    }
}
