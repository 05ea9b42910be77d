//! Shipment repository. Owner-scoped queries take the caller's user id so
//! records owned by someone else are indistinguishable from missing ones.

use sqlx::PgPool;
use status_events::ShipmentStatus;
use uuid::Uuid;

use crate::models::{CreateShipmentRequest, Shipment, UpdateShipmentRequest};

const SHIPMENT_COLUMNS: &str = "id, user_id, name, category, description, price, sender, \
     receiver, from_location, to_location, address, priority, tracking_number, status, \
     from_lat, from_lng, to_lat, to_lng, created_at, updated_at";

/// Whitelisted sort columns; anything else falls back to `created_at`.
fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("updated_at") => "updated_at",
        Some("price") => "price",
        Some("name") => "name",
        _ => "created_at",
    }
}

fn sort_order(requested: Option<&str>) -> &'static str {
    match requested {
        Some("asc") => "ASC",
        _ => "DESC",
    }
}

pub async fn create(
    pool: &PgPool,
    user_id: Uuid,
    tracking_number: &str,
    req: &CreateShipmentRequest,
) -> Result<Shipment, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "INSERT INTO shipments
           (user_id, name, category, description, price, sender, receiver,
            from_location, to_location, address, priority, tracking_number,
            from_lat, from_lng, to_lat, to_lng)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
         RETURNING {SHIPMENT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(req.name.trim())
    .bind(&req.category)
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.sender)
    .bind(&req.receiver)
    .bind(&req.from_location)
    .bind(&req.to_location)
    .bind(&req.address)
    .bind(req.priority.as_deref().unwrap_or("standard"))
    .bind(tracking_number)
    .bind(req.from_lat)
    .bind(req.from_lng)
    .bind(req.to_lat)
    .bind(req.to_lng)
    .fetch_one(pool)
    .await
}

pub async fn find_owned(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn list_owned(pool: &PgPool, user_id: Uuid) -> Result<Vec<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Owner-scoped listing with optional status/priority filters and a
/// whitelisted sort key.
pub async fn list_owned_filtered(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<ShipmentStatus>,
    priority: Option<&str>,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> Result<Vec<Shipment>, sqlx::Error> {
    let query = format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments
         WHERE user_id = $1
           AND ($2::shipment_status IS NULL OR status = $2)
           AND ($3::text IS NULL OR priority = $3)
         ORDER BY {} {}",
        sort_column(sort_by),
        sort_order(order),
    );
    sqlx::query_as::<_, Shipment>(&query)
        .bind(user_id)
        .bind(status)
        .bind(priority)
        .fetch_all(pool)
        .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

/// Partial update scoped to the owner; returns None when the record is
/// missing or not theirs.
pub async fn update_owned(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
    req: &UpdateShipmentRequest,
) -> Result<Option<Shipment>, sqlx::Error> {
    sqlx::query_as::<_, Shipment>(&format!(
        "UPDATE shipments
         SET name = COALESCE($3, name),
             category = COALESCE($4, category),
             description = COALESCE($5, description),
             price = COALESCE($6, price),
             address = COALESCE($7, address),
             priority = COALESCE($8, priority),
             status = COALESCE($9, status),
             updated_at = NOW()
         WHERE id = $1 AND user_id = $2
         RETURNING {SHIPMENT_COLUMNS}"
    ))
    .bind(id)
    .bind(user_id)
    .bind(req.name.as_deref().map(str::trim))
    .bind(&req.category)
    .bind(&req.description)
    .bind(req.price)
    .bind(&req.address)
    .bind(&req.priority)
    .bind(req.status)
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

pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM shipments WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_falls_back_to_created_at() {
        assert_eq!(sort_column(Some("created_at; DROP TABLE users")), "created_at");
        assert_eq!(sort_column(Some("price")), "price");
        assert_eq!(sort_column(None), "created_at");
    }

    #[test]
    fn order_defaults_to_descending() {
        assert_eq!(sort_order(Some("asc")), "ASC");
        assert_eq!(sort_order(Some("sideways")), "DESC");
        assert_eq!(sort_order(None), "DESC");
    }
}
