//! Database-backed tracking flows; ignored unless TEST_DATABASE_URL points
//! at a PostgreSQL instance with the shipments schema applied.

use sqlx::PgPool;
use status_events::ShipmentStatus;
use tracking_service::db::shipment_repo;
use uuid::Uuid;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL not set");
    PgPool::connect(&url).await.expect("connect test db")
}

async fn seed_shipment(pool: &PgPool, owner: Uuid, tracking_number: &str) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO shipments
           (user_id, name, price, sender, receiver, from_location, to_location, tracking_number)
         VALUES ($1, 'Parcel', 10, 'Alice', 'Bob', 'Berlin', 'Paris', $2)
         RETURNING id",
    )
    .bind(owner)
    .bind(tracking_number)
    .fetch_one(pool)
    .await
    .expect("seed shipment")
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn lookup_works_by_id_and_tracking_number() {
    let pool = test_pool().await;
    let tracking = format!("TRK-test-{}", Uuid::new_v4());
    let id = seed_shipment(&pool, Uuid::new_v4(), &tracking).await;

    let by_id = shipment_repo::find_by_id(&pool, id).await.unwrap().unwrap();
    let by_tracking = shipment_repo::find_by_tracking_number(&pool, &tracking)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_id.id, by_tracking.id);
    assert_eq!(by_id.status, ShipmentStatus::Pending);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn status_update_persists() {
    let pool = test_pool().await;
    let tracking = format!("TRK-test-{}", Uuid::new_v4());
    let id = seed_shipment(&pool, Uuid::new_v4(), &tracking).await;

    let updated = shipment_repo::update_status(&pool, id, ShipmentStatus::Delivered)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, ShipmentStatus::Delivered);

    let reread = shipment_repo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(reread.status, ShipmentStatus::Delivered);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance (TEST_DATABASE_URL)"]
async fn unknown_shipment_updates_nothing() {
    let pool = test_pool().await;
    assert!(shipment_repo::update_status(&pool, Uuid::new_v4(), ShipmentStatus::Lost)
        .await
        .unwrap()
        .is_none());
}
