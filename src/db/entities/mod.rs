//! SeaORM entities for the inventory tables.

pub mod pod;
pub mod vps_server;
