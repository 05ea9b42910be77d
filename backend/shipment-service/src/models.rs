use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use status_events::ShipmentStatus;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: f64,
    pub sender: String,
    pub receiver: String,
    pub from_location: String,
    pub to_location: String,
    pub address: Option<String>,
    pub priority: String,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub from_lat: Option<f64>,
    pub from_lng: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShipmentRequest {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: f64,
    #[validate(length(min = 1, message = "sender is required"))]
    pub sender: String,
    #[validate(length(min = 1, message = "receiver is required"))]
    pub receiver: String,
    #[validate(length(min = 1, message = "fromLocation is required"))]
    pub from_location: String,
    #[validate(length(min = 1, message = "toLocation is required"))]
    pub to_location: String,
    pub address: Option<String>,
    pub priority: Option<String>,
    pub from_lat: Option<f64>,
    pub from_lng: Option<f64>,
    pub to_lat: Option<f64>,
    pub to_lng: Option<f64>,
}

/// Partial update; a present `status` field triggers a status event.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShipmentRequest {
    #[validate(length(min = 1, max = 200, message = "name must not be empty"))]
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "price must not be negative"))]
    pub price: Option<f64>,
    pub address: Option<String>,
    pub priority: Option<String>,
    pub status: Option<ShipmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ShipmentListQuery {
    pub status: Option<ShipmentStatus>,
    pub priority: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Tracking codes look like `TRK-1712345678901-4821`; unique enough in
/// practice, and the column's unique constraint backstops collisions.
pub fn generate_tracking_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(1000..10000);
    format!("TRK-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_number_shape() {
        let tn = generate_tracking_number();
        let parts: Vec<&str> = tn.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TRK");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn tracking_numbers_differ() {
        let distinct: std::collections::HashSet<String> =
            (0..16).map(|_| generate_tracking_number()).collect();
        assert!(distinct.len() > 1);
    }
}
