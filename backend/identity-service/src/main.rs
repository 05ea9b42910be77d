use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use identity_service::services::email::Mailer;
use identity_service::{config::Config, error::AppError, routes, security::jwt, AppState};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .map_err(|e| AppError::StartServer(format!("migrations: {e}")))?;

    jwt::initialize(&config.jwt_secret);

    let mailer = Mailer::new(config.smtp.as_ref())?;
    if !mailer.is_enabled() {
        tracing::warn!("reset emails will be logged, not delivered");
    }

    let state = AppState {
        db,
        mailer,
        http: reqwest::Client::new(),
        google_client_id: config.google_client_id.clone(),
        frontend_url: config.frontend_url.clone(),
    };

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%bind_addr, "starting identity-service");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .configure(routes::configure_routes)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(e.to_string()))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(e.to_string()))?;

    Ok(())
}
