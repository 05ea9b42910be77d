use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use status_events::ShipmentStatus;
use uuid::Uuid;

/// Read model over the shipments table.
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

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ShipmentStatus,
}
