//! Google ID token verification against the tokeninfo endpoint.

use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    email: Option<String>,
    email_verified: Option<String>,
    name: Option<String>,
}

#[derive(Debug)]
pub struct GoogleProfile {
    pub email: String,
    pub name: String,
}

/// Validate a client-supplied Google ID token and extract the profile.
/// The audience must match our client id; accepting any audience would let
/// tokens minted for other applications log in here.
pub async fn verify_id_token(
    http: &Client,
    client_id: &str,
    id_token: &str,
) -> AppResult<GoogleProfile> {
    let response = http
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("google tokeninfo request: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::InvalidCredentials);
    }

    let info = response
        .json::<GoogleTokenInfo>()
        .await
        .map_err(|e| AppError::Internal(format!("google tokeninfo parse: {e}")))?;

    if info.aud != client_id {
        tracing::warn!("google token audience mismatch");
        return Err(AppError::InvalidCredentials);
    }
    if info.email_verified.as_deref() != Some("true") {
        return Err(AppError::InvalidCredentials);
    }

    let email = info.email.ok_or(AppError::InvalidCredentials)?;
    let name = info.name.unwrap_or_else(|| email.clone());
    Ok(GoogleProfile { email, name })
}
