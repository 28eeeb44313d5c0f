//! API handlers
//!
//! Each handler follows the same pattern:
//! - Extract state, path and body using Axum extractors
//! - Check the amount against the configured policy
//! - Call the point service
//! - Wrap the result in the standardized response format

pub mod point;
pub mod response;
pub mod validation;

pub use response::{ApiListResponse, ApiResponse};
pub use validation::AmountPolicy;
