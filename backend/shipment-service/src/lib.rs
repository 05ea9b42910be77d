//! Shipment service: shipment CRUD for authenticated identities, admin
//! listing, and real-time status push over WebSocket. Authentication is
//! delegated to the identity service per request.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;

use std::sync::Arc;

use authority_client::AuthorityClient;
use sqlx::PgPool;
use status_events::StatusFeed;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub feed: StatusFeed,
    pub authority: Arc<dyn AuthorityClient>,
}
