pub mod shipment_repo;
