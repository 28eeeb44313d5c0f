//! Metapackage tying the point ledger crates together for end-to-end tests

pub use api_gateway;
pub use common;
pub use point_service;
