pub mod tracking;
pub mod ws;
