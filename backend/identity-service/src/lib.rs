//! Identity service: account signup and login, Google sign-in, password
//! reset over email, bearer-token verification for the other services, and
//! the admin user directory.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod validators;

use sqlx::PgPool;

use crate::services::email::Mailer;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub mailer: Mailer,
    pub http: reqwest::Client,
    pub google_client_id: Option<String>,
    pub frontend_url: String,
}
