//! Tracking service: public shipment lookup, role-gated status mutation
//! with real-time push and best-effort email notification, and PDF export.
//! Shares the shipments table with the shipment service; the shipment
//! service owns the schema and its migrations.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use authority_client::AuthorityClient;
use sqlx::PgPool;
use status_events::StatusFeed;

use crate::services::email::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub feed: StatusFeed,
    pub authority: Arc<dyn AuthorityClient>,
    pub mailer: Mailer,
    pub http: reqwest::Client,
    pub auth_service_url: String,
}
