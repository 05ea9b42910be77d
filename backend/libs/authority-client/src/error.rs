use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Outcome of asking the authority about a token, other than success.
///
/// `Rejected` means the authority answered and said no. `Unavailable` means
/// we never got an answer (network error, timeout, or a non-auth failure
/// status) — callers must NOT treat it as authenticated.
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("token rejected by authority")]
    Rejected,

    #[error("authority unavailable: {0}")]
    Unavailable(String),
}

/// Request-terminating authentication failure, rendered as the standard
/// structured error payload.
#[derive(Debug, Error)]
pub enum AuthRejection {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Authentication service unavailable")]
    UpstreamUnavailable,

    #[error("Admin access required")]
    Forbidden,
}

impl AuthRejection {
    fn code(&self) -> &'static str {
        match self {
            AuthRejection::MissingToken => "MISSING_TOKEN",
            AuthRejection::InvalidToken => "INVALID_TOKEN",
            AuthRejection::UpstreamUnavailable => "UPSTREAM_UNAVAILABLE",
            AuthRejection::Forbidden => "FORBIDDEN",
        }
    }
}

impl ResponseError for AuthRejection {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthRejection::MissingToken | AuthRejection::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthRejection::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AuthRejection::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }))
    }
}

impl From<AuthorityError> for AuthRejection {
    fn from(err: AuthorityError) -> Self {
        match err {
            AuthorityError::Rejected => AuthRejection::InvalidToken,
            AuthorityError::Unavailable(_) => AuthRejection::UpstreamUnavailable,
        }
    }
}
