//! HTTP gateway for the point service

pub mod api;
pub mod config;
pub mod error;

use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Json, Router,
};
use point_service::PointService;
use utoipa::OpenApi;

use crate::api::AmountPolicy;
use crate::config::AppConfig;

/// API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        api::point::get_point,
        api::point::get_histories,
        api::point::charge,
        api::point::use_point,
    ),
    components(
        schemas(
            api::point::PointRequest,
            common::model::point::UserPoint,
            common::model::point::PointHistory,
            common::model::point::TransactionType,
            error::ErrorResponse,
            error::ErrorInfo,
        )
    ),
    tags(
        (name = "point", description = "Point balance and history endpoints")
    ),
    info(
        title = "Point Ledger API",
        version = "1.0.0",
        description = "Charge, use and inspect user points"
    )
)]
pub struct ApiDoc;

/// App state shared across handlers
pub struct AppState {
    /// Point service
    pub point_service: Arc<PointService>,
    /// Policy for charge amounts
    pub charge_policy: AmountPolicy,
    /// Policy for use amounts
    pub use_policy: AmountPolicy,
}

impl AppState {
    /// Build the state from a service and the gateway configuration
    pub fn new(point_service: Arc<PointService>, config: &AppConfig) -> Self {
        Self {
            point_service,
            charge_policy: config.charge_policy,
            use_policy: config.use_policy,
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the router with all point routes and the OpenAPI document
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/point/:id", get(api::point::get_point))
        .route("/point/:id/histories", get(api::point::get_histories))
        .route("/point/:id/charge", patch(api::point::charge))
        .route("/point/:id/use", patch(api::point::use_point))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
}
