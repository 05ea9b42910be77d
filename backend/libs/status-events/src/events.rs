use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shipment_status")]
pub enum ShipmentStatus {
    Pending,
    Delivered,
    Received,
    Lost,
}

impl ShipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Received => "Received",
            ShipmentStatus::Lost => "Lost",
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral status-change notification. Exists only on the wire between a
/// mutation and the subscribers connected at that moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    /// Identity that owns the shipment; the routing key.
    pub user_id: Uuid,
    pub shipment_id: Uuid,
    pub status: ShipmentStatus,
}

impl StatusEvent {
    pub fn new(user_id: Uuid, shipment_id: Uuid, status: ShipmentStatus) -> Self {
        Self {
            user_id,
            shipment_id,
            status,
        }
    }

    /// Event name as emitted to clients.
    pub fn channel(&self) -> String {
        format!("statusUpdate:{}", self.user_id)
    }

    /// Client-facing JSON payload.
    pub fn to_wire(&self) -> serde_json::Value {
        serde_json::json!({
            "event": self.channel(),
            "shipmentId": self.shipment_id,
            "status": self.status,
        })
    }
}
