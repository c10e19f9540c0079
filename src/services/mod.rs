//! Business logic services.

pub mod aggregator;
pub mod management_client;
pub mod query_port;
