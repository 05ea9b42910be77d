//! Database-backed flows. These need a PostgreSQL instance reachable via
//! TEST_DATABASE_URL and are ignored by default.

use authority_client::Role;
use chrono::{Duration, Utc};
use identity_service::db::user_repo;
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    let pool = PgPool::connect(&url).await.expect("connect test db");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

fn unique_email(tag: &str) -> String {
    format!("{tag}-{}@example.com", Uuid::new_v4())
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn duplicate_email_is_rejected() {
    let pool = test_pool().await;
    let email = unique_email("dup");
    user_repo::create(&pool, "First", &email, "hash-a", Role::User)
        .await
        .unwrap();
    let err = user_repo::create(&pool, "Second", &email, "hash-b", Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, sqlx::Error::Database(db) if db.is_unique_violation()));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn reset_token_claim_is_exclusive_while_unexpired() {
    let pool = test_pool().await;
    let user = user_repo::create(&pool, "Reset", &unique_email("reset"), "hash", Role::User)
        .await
        .unwrap();
    let expires = Utc::now() + Duration::hours(1);

    assert!(user_repo::claim_reset_token(&pool, user.id, "digest-1", expires)
        .await
        .unwrap());
    // Second claim loses while the first is live.
    assert!(!user_repo::claim_reset_token(&pool, user.id, "digest-2", expires)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn expired_reset_token_can_be_replaced() {
    let pool = test_pool().await;
    let user = user_repo::create(&pool, "Expired", &unique_email("exp"), "hash", Role::User)
        .await
        .unwrap();

    let past = Utc::now() - Duration::minutes(5);
    assert!(user_repo::claim_reset_token(&pool, user.id, "digest-old", past)
        .await
        .unwrap());
    let future = Utc::now() + Duration::hours(1);
    assert!(user_repo::claim_reset_token(&pool, user.id, "digest-new", future)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn consume_reset_token_is_single_use() {
    let pool = test_pool().await;
    let user = user_repo::create(&pool, "Consume", &unique_email("con"), "hash", Role::User)
        .await
        .unwrap();
    let expires = Utc::now() + Duration::hours(1);
    user_repo::claim_reset_token(&pool, user.id, "digest", expires)
        .await
        .unwrap();

    let updated = user_repo::consume_reset_token(&pool, "digest", "new-hash")
        .await
        .unwrap();
    assert_eq!(updated.map(|u| u.id), Some(user.id));

    // Replay fails: the stored digest was cleared.
    assert!(user_repo::consume_reset_token(&pool, "digest", "other-hash")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn bulk_delete_guard_detects_admins() {
    let pool = test_pool().await;
    let admin = user_repo::create(&pool, "Admin", &unique_email("adm"), "hash", Role::Admin)
        .await
        .unwrap();
    let user = user_repo::create(&pool, "User", &unique_email("usr"), "hash", Role::User)
        .await
        .unwrap();

    assert!(user_repo::any_admin(&pool, &[admin.id, user.id]).await.unwrap());
    assert!(!user_repo::any_admin(&pool, &[user.id]).await.unwrap());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn email_lookup_is_exact_on_normalized_form() {
    let pool = test_pool().await;
    let email = unique_email("case");
    user_repo::create(&pool, "Case", &email, "hash", Role::User)
        .await
        .unwrap();

    assert!(user_repo::find_by_email(&pool, &email).await.unwrap().is_some());
    // Storage holds the lowered form only; the raw mixed-case string misses.
    assert!(user_repo::find_by_email(&pool, &email.to_uppercase())
        .await
        .unwrap()
        .is_none());
}
