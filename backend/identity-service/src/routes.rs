use actix_web::{web, HttpResponse};

use crate::handlers::{admin, auth};

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Authentication Service is running...")
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check));

    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(auth::signup))
            .route("/login", web::post().to(auth::login))
            .route("/google-login", web::post().to(auth::google_login))
            .route("/verify", web::get().to(auth::verify))
            .route("/forgot-password", web::post().to(auth::forgot_password))
            .route("/reset-password", web::post().to(auth::reset_password)),
    );

    cfg.service(
        web::scope("/api/admin")
            .route("/users", web::get().to(admin::list_users))
            .route("/users", web::delete().to(admin::bulk_delete_users))
            .route("/users/search", web::get().to(admin::search_users))
            .route("/users/{id}", web::get().to(admin::get_user))
            .route("/users/{id}", web::put().to(admin::update_user))
            .route("/users/{id}", web::delete().to(admin::delete_user))
            .route("/profile", web::get().to(admin::get_profile))
            .route("/profile", web::put().to(admin::update_profile)),
    );
}
