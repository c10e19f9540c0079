//! Domain models shared by the aggregation engine and the HTTP surface.

pub mod pagination;
pub mod stats;
