pub mod shipments;
pub mod ws;
