//! Concrete adapter implementations for ports.

pub mod memory_store;
pub mod fixed_price_adapter;
pub mod uuid_id_adapter;
pub mod file_config_adapter;
