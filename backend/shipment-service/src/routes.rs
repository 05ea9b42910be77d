use actix_web::{web, HttpResponse};
use authority_client::RemoteAuthMiddleware;

use crate::handlers::{shipments, ws};
use crate::AppState;

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Shipment Service is running...")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check))
        .route("/ws", web::get().to(ws::status_feed));

    // Everything below requires a verified identity.
    cfg.service(
        web::scope("")
            .wrap(RemoteAuthMiddleware::new(state.authority.clone()))
            .route("/ship", web::post().to(shipments::create_shipment))
            .route("/products", web::get().to(shipments::list_shipments))
            .route("/products/{id}", web::get().to(shipments::get_shipment))
            .route("/products/{id}", web::put().to(shipments::update_shipment))
            .route("/products/{id}", web::delete().to(shipments::delete_shipment))
            .route(
                "/api/user/shipments",
                web::get().to(shipments::list_user_shipments),
            )
            .route(
                "/api/admin/shipments",
                web::get().to(shipments::list_all_shipments),
            ),
    );
}
