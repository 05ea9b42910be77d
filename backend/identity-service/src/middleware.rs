//! Bearer-token extraction for the identity service's own protected routes.
//! Token verification is local here; the other services go through the
//! remote verify endpoint instead.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use authority_client::Role;
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;
use crate::security::jwt::{self, TokenType};

/// Authenticated caller, extracted from the Authorization header.
#[derive(Debug, Clone, Copy)]
pub struct AuthedUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthedUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

fn extract(req: &HttpRequest) -> Result<AuthedUser, AppError> {
    let token = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::MissingToken)?;

    let claims =
        jwt::verify_token(token, TokenType::Access).map_err(|_| AppError::InvalidToken)?;
    Ok(AuthedUser {
        user_id: claims.sub,
        role: claims.role,
    })
}

impl FromRequest for AuthedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
