//! Read and status-update access to the shipments table.

use sqlx::PgPool;
use status_events::ShipmentStatus;
use uuid::Uuid;

use crate::models::Shipment;

const SHIPMENT_COLUMNS: &str = "id, user_id, name, category, description, price, sender, \
     receiver, from_location, to_location, address, priority, tracking_number, status, \
     from_lat, from_lng, to_lat, to_lng, created_at, updated_at";

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_tracking_number(
    pool: &PgPool,
    tracking_number: &str,
) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE tracking_number = $1"
    ))
    .bind(tracking_number)
    .fetch_optional(pool)
    .await
}

pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ShipmentStatus,
) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "UPDATE shipments SET status = $2, updated_at = NOW()
         WHERE id = $1
         RETURNING {SHIPMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(pool)
    .await
}
