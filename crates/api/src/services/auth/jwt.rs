//! Session tokens: HS256 JWTs carrying the user id.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use hridved_core::UserId;

use super::AuthError;

/// Token lifetime in seconds (30 days).
pub const TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: UserId,
    pub iat: i64,
    pub exp: i64,
}

/// Sign a token for `user_id` valid for [`TOKEN_TTL_SECS`].
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn issue_token(secret: &SecretString, user_id: UserId) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        user_id,
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(AuthError::TokenEncoding)
}

/// Verify a token's signature and expiry and return its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` for any malformed, forged or expired token.
pub fn verify_token(secret: &SecretString, token: &str) -> Result<Claims, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(AuthError::InvalidToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kR9$vTq2!Lm7@Zx4#Wp8&Hs3^Nb6*Jd1")
    }

    #[test]
    fn test_issue_and_verify() {
        let token = issue_token(&secret(), UserId::new(42)).unwrap();
        let claims = verify_token(&secret(), &token).unwrap();
        assert_eq!(claims.user_id, UserId::new(42));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&secret(), UserId::new(42)).unwrap();
        let other = SecretString::from("zX8#pL3!qW6@mN1$vB4%tR7^yH2&kJ5*");
        assert!(matches!(
            verify_token(&other, &token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: UserId::new(1),
            iat: now - TOKEN_TTL_SECS - 3600,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&secret(), &token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(verify_token(&secret(), "not.a.jwt").is_err());
        assert!(verify_token(&secret(), "").is_err());
    }

    #[test]
    fn test_claims_use_user_id_key() {
        let token = issue_token(&secret(), UserId::new(5)).unwrap();
        let payload = token.split('.').nth(1).unwrap();
        let json = base64::Engine::decode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            payload,
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["userId"], 5);
    }
}
