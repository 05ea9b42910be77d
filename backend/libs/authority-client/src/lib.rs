//! Shared authentication contract for resource services.
//!
//! The identity service is the only holder of the token signing secret.
//! Every other service authenticates inbound requests by presenting the
//! bearer token to the identity service's `/api/auth/verify` endpoint
//! through an [`AuthorityClient`], then attaches the verified identity to
//! the request via [`RemoteAuthMiddleware`].

pub mod client;
pub mod error;
pub mod middleware;

pub use client::{
    AuthorityClient, CachingAuthority, HttpAuthorityClient, DEFAULT_NEGATIVE_TTL,
    DEFAULT_VERIFY_TIMEOUT,
};
pub use error::{AuthRejection, AuthorityError};
pub use middleware::{bearer_token, AuthContext, RemoteAuthMiddleware};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity role carried in tokens and verification responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful token verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Wire shape of the identity service's verification response.
///
/// Field names follow the frontend-facing JSON contract.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn verify_response_uses_camel_case() {
        let resp = VerifyResponse {
            valid: true,
            user_id: Uuid::nil(),
            role: Role::User,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("userId").is_some());
        assert_eq!(json["role"], "user");
    }
}
