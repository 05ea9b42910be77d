//! Handler-level flows over the real routes. These need a PostgreSQL
//! instance reachable via TEST_DATABASE_URL and are ignored by default.

use actix_web::{test, web, App};
use authority_client::Role;
use identity_service::db::user_repo;
use identity_service::routes;
use identity_service::security::{jwt, password};
use identity_service::services::email::Mailer;
use identity_service::AppState;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_state() -> AppState {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    let db = PgPool::connect(&url).await.expect("connect test db");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");
    jwt::initialize("http-flow-test-secret");

    AppState {
        db,
        mailer: Mailer::new(None).expect("no-op mailer"),
        http: reqwest::Client::new(),
        google_client_id: None,
        frontend_url: "http://localhost:5173".into(),
    }
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.com", Uuid::new_v4())
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn signup_login_and_verify_flow() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let email = unique_email("flow");
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(json!({
                "name": "Flow User",
                "email": email,
                "password": "hunter22"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    // Wrong password is indistinguishable from an unknown account.
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "wrong-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");

    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "hunter22" }))
            .to_request(),
    )
    .await;
    let token = body["token"].as_str().expect("login token").to_string();

    // The same token the resource services would forward verifies here.
    let body: serde_json::Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/api/auth/verify")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["role"], "user");
}

#[actix_web::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn profile_password_change_requires_current_password() {
    let state = test_state().await;
    let db = state.db.clone();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(routes::configure_routes),
    )
    .await;

    let email = unique_email("admin");
    let hash = password::hash_password("old-password").unwrap();
    let admin = user_repo::create(&db, "Admin", &email, &hash, Role::Admin)
        .await
        .unwrap();
    let token = jwt::issue_access_token(admin.id, Role::Admin).unwrap();
    let auth = ("Authorization", format!("Bearer {token}"));

    // New password without the current one is a validation failure.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/admin/profile")
            .insert_header(auth.clone())
            .set_json(json!({ "newPassword": "brand-new-pw" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    // A wrong current password is rejected and changes nothing.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/admin/profile")
            .insert_header(auth.clone())
            .set_json(json!({
                "currentPassword": "not-it",
                "newPassword": "brand-new-pw"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "old-password" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    // Re-proving the current password lets the change through.
    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri("/api/admin/profile")
            .insert_header(auth)
            .set_json(json!({
                "currentPassword": "old-password",
                "newPassword": "brand-new-pw"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": "brand-new-pw" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
}
