//! Owner lookup through the identity service's admin directory. Used only
//! to resolve the email address for status notifications; every failure is
//! reported as `None` and the notification is skipped.

use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DirectoryUser {
    pub email: String,
    pub name: String,
}

pub async fn lookup_user(
    http: &Client,
    auth_service_url: &str,
    bearer_token: &str,
    user_id: Uuid,
) -> Option<DirectoryUser> {
    let url = format!(
        "{}/api/admin/users/{user_id}",
        auth_service_url.trim_end_matches('/')
    );
    let response = match http.get(&url).bearer_auth(bearer_token).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "identity directory unreachable");
            return None;
        }
    };
    if !response.status().is_success() {
        // Non-admin callers get 403 here; the notification is simply skipped.
        tracing::debug!(%user_id, status = %response.status(), "directory lookup refused");
        return None;
    }
    match response.json::<DirectoryUser>().await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::warn!(%user_id, error = %e, "directory response malformed");
            None
        }
    }
}
