//! Real-time shipment status fan-out.
//!
//! A per-process, non-durable publish/subscribe channel keyed by identity
//! id. Delivery is at-most-once: an event published while no connection is
//! subscribed under the owning identity is dropped silently, and clients
//! are expected to reconcile via a pull query after reconnecting.

pub mod events;
pub mod feed;
pub mod session;
pub mod ws;

pub use events::{ShipmentStatus, StatusEvent};
pub use feed::{StatusFeed, SubscriptionId};
pub use session::StatusFeedSession;
