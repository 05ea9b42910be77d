use actix_web::{web, HttpResponse};
use authority_client::RemoteAuthMiddleware;

use crate::handlers::{tracking, ws};
use crate::AppState;

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Tracking Service is running...")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    // Public surface: tracking lookup needs no token.
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/track/{id}", web::get().to(tracking::track))
        .route("/ws", web::get().to(ws::status_feed));

    cfg.service(
        web::scope("")
            .wrap(RemoteAuthMiddleware::new(state.authority.clone()))
            .route("/updateStatus/{id}", web::put().to(tracking::update_status))
            .route(
                "/api/shipment/{id}/pdf",
                web::get().to(tracking::export_pdf),
            ),
    );
}
