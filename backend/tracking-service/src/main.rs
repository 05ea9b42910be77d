use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use authority_client::{CachingAuthority, HttpAuthorityClient};
use sqlx::postgres::PgPoolOptions;
use status_events::StatusFeed;
use tracing_subscriber::EnvFilter;

use tracking_service::services::email::Mailer;
use tracking_service::{config::Config, error::AppError, routes, AppState};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    // The shipment service owns the schema; this service only reads and
    // flips the status column.
    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    let verifier = HttpAuthorityClient::new(&config.auth_service_url, config.auth_verify_timeout)
        .map_err(|e| AppError::StartServer(format!("authority client: {e}")))?;
    let authority: Arc<dyn authority_client::AuthorityClient> =
        Arc::new(CachingAuthority::new(verifier, config.auth_negative_ttl));

    let mailer = Mailer::new(config.smtp.as_ref())?;

    let state = AppState {
        db,
        feed: StatusFeed::new(),
        authority,
        mailer,
        http: reqwest::Client::new(),
        auth_service_url: config.auth_service_url.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%bind_addr, auth = %config.auth_service_url, "starting tracking-service");

    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .configure(move |cfg| routes::configure_routes(cfg, &state))
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(e.to_string()))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
