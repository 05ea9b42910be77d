//! Token issuance and verification.
//!
//! Keys are derived from the shared HS256 secret, loaded once at startup and
//! immutable thereafter. Two token kinds exist: bearer access tokens (24h)
//! and single-purpose password-reset tokens (1h). A reset token is never
//! accepted where an access token is expected, and vice versa.

use authority_client::Role;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
pub const RESET_TOKEN_TTL_HOURS: i64 = 1;

static ENCODING_KEY: OnceCell<EncodingKey> = OnceCell::new();
static DECODING_KEY: OnceCell<DecodingKey> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Reset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
}

/// Install the signing secret. Called once from `main` before the server
/// starts; repeated calls are ignored so tests can initialize freely.
pub fn initialize(secret: &str) {
    let _ = ENCODING_KEY.set(EncodingKey::from_secret(secret.as_bytes()));
    let _ = DECODING_KEY.set(DecodingKey::from_secret(secret.as_bytes()));
}

fn encoding_key() -> AppResult<&'static EncodingKey> {
    ENCODING_KEY
        .get()
        .ok_or_else(|| AppError::Internal("jwt keys not initialized".into()))
}

fn decoding_key() -> AppResult<&'static DecodingKey> {
    DECODING_KEY
        .get()
        .ok_or_else(|| AppError::Internal("jwt keys not initialized".into()))
}

fn issue(user_id: Uuid, role: Role, ttl_hours: i64, token_type: TokenType) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(ttl_hours)).timestamp(),
        token_type,
    };
    encode(&Header::new(Algorithm::HS256), &claims, encoding_key()?)
        .map_err(|e| AppError::Internal(format!("jwt encode: {e}")))
}

pub fn issue_access_token(user_id: Uuid, role: Role) -> AppResult<String> {
    issue(user_id, role, ACCESS_TOKEN_TTL_HOURS, TokenType::Access)
}

pub fn issue_reset_token(user_id: Uuid, role: Role) -> AppResult<String> {
    issue(user_id, role, RESET_TOKEN_TTL_HOURS, TokenType::Reset)
}

/// Decode and verify a token, requiring it to be of the expected kind.
/// Expiry and signature failures collapse into one rejection; callers do not
/// learn which check failed.
pub fn verify_token(token: &str, expected: TokenType) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // No grace window past `exp`; the default 60s leeway would let expired
    // tokens keep authenticating across every service that calls verify.
    validation.leeway = 0;
    let data = decode::<Claims>(token, decoding_key()?, &validation)
        .map_err(|_| AppError::InvalidOrExpiredToken)?;
    if data.claims.token_type != expected {
        return Err(AppError::InvalidOrExpiredToken);
    }
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_keys() {
        // OnceCell ignores repeated sets, so every test may call this.
        initialize("test-secret-for-unit-tests");
    }

    #[test]
    fn access_token_round_trips() {
        init_test_keys();
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, Role::Admin).unwrap();
        let claims = verify_token(&token, TokenType::Access).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn access_token_lives_twenty_four_hours() {
        init_test_keys();
        let token = issue_access_token(Uuid::new_v4(), Role::User).unwrap();
        let claims = verify_token(&token, TokenType::Access).unwrap();
        let ttl = claims.exp - claims.iat;
        assert_eq!(ttl, 24 * 3600);
    }

    #[test]
    fn reset_token_lives_one_hour() {
        init_test_keys();
        let token = issue_reset_token(Uuid::new_v4(), Role::User).unwrap();
        let claims = verify_token(&token, TokenType::Reset).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn reset_token_is_not_an_access_token() {
        init_test_keys();
        let token = issue_reset_token(Uuid::new_v4(), Role::User).unwrap();
        let err = verify_token(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AppError::InvalidOrExpiredToken));
    }

    #[test]
    fn access_token_is_not_a_reset_token() {
        init_test_keys();
        let token = issue_access_token(Uuid::new_v4(), Role::User).unwrap();
        assert!(verify_token(&token, TokenType::Reset).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        init_test_keys();
        assert!(verify_token("not-a-jwt", TokenType::Access).is_err());
    }

    #[test]
    fn expired_token_is_rejected_without_leeway() {
        init_test_keys();
        // Expired one minute ago, inside jsonwebtoken's default leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::User,
            iat: now - 3600,
            exp: now - 60,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            encoding_key().unwrap(),
        )
        .unwrap();

        let err = verify_token(&token, TokenType::Access).unwrap_err();
        assert!(matches!(err, AppError::InvalidOrExpiredToken));
    }

    #[test]
    fn expired_token_just_past_exp_is_rejected() {
        init_test_keys();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: Role::Admin,
            iat: now - 3600,
            exp: now - 1,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            encoding_key().unwrap(),
        )
        .unwrap();

        assert!(verify_token(&token, TokenType::Access).is_err());
    }
}
