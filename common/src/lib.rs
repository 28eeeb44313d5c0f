//! Common types and utilities for the point ledger
//!
//! This library contains the domain models and the unified error type shared by
//! the point service and the HTTP gateway.

pub mod error;
pub mod model;

/// Re-export important types
pub use error::{Error, Result, ErrorExt};
pub use model::point::{PointHistory, TransactionType, UserId, UserPoint};

// Re-export utoipa for use in model ToSchema derives
#[cfg(feature = "utoipa")]
pub use utoipa;
