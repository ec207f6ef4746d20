//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod demo_router;
pub mod file_config_adapter;
