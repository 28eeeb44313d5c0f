//! Point API handlers
//!
//! Handles endpoints related to user points:
//! - Get current balance
//! - Get charge/use history
//! - Charge and use points

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use common::model::point::{PointHistory, UserId, UserPoint};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::api::response::{ApiListResponse, ApiResponse};
use crate::error::{ApiError, ErrorResponse};
use crate::AppState;

/// Charge or use request
#[derive(Debug, Deserialize, ToSchema)]
pub struct PointRequest {
    /// Amount of points
    pub amount: i64,
}

fn parse_id(path: Result<Path<UserId>, PathRejection>) -> Result<UserId, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

fn parse_body(payload: Result<Json<PointRequest>, JsonRejection>) -> Result<PointRequest, ApiError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// Get a user's point balance
#[utoipa::path(
    get,
    path = "/point/{id}",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Point balance retrieved successfully", body = UserPoint),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "point"
)]
pub async fn get_point(
    State(state): State<Arc<AppState>>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<ApiResponse<UserPoint>, ApiError> {
    let id = parse_id(path)?;
    let point = state.point_service.get_point(id).await?;
    Ok(ApiResponse::new(point))
}

/// Get a user's charge/use history
#[utoipa::path(
    get,
    path = "/point/{id}/histories",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "History retrieved successfully", body = [PointHistory]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "point"
)]
pub async fn get_histories(
    State(state): State<Arc<AppState>>,
    path: Result<Path<UserId>, PathRejection>,
) -> Result<ApiListResponse<PointHistory>, ApiError> {
    let id = parse_id(path)?;
    let histories = state.point_service.get_histories(id).await?;
    Ok(ApiListResponse::new(histories))
}

/// Charge points to a user
#[utoipa::path(
    patch,
    path = "/point/{id}/charge",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = PointRequest,
    responses(
        (status = 200, description = "Points charged successfully", body = UserPoint),
        (status = 400, description = "Amount outside the charge policy", body = ErrorResponse),
        (status = 503, description = "Account is busy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "point"
)]
pub async fn charge(
    State(state): State<Arc<AppState>>,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<PointRequest>, JsonRejection>,
) -> Result<ApiResponse<UserPoint>, ApiError> {
    let id = parse_id(path)?;
    let request = parse_body(payload)?;
    let amount = state.charge_policy.check(request.amount)?;

    let point = state.point_service.charge_point(id, amount).await?;
    Ok(ApiResponse::new(point))
}

/// Use points of a user
#[utoipa::path(
    patch,
    path = "/point/{id}/use",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = PointRequest,
    responses(
        (status = 200, description = "Points used successfully", body = UserPoint),
        (status = 400, description = "Amount outside the use policy or insufficient balance", body = ErrorResponse),
        (status = 503, description = "Account is busy", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "point"
)]
pub async fn use_point(
    State(state): State<Arc<AppState>>,
    path: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<PointRequest>, JsonRejection>,
) -> Result<ApiResponse<UserPoint>, ApiError> {
    let id = parse_id(path)?;
    let request = parse_body(payload)?;
    let amount = state.use_policy.check(request.amount)?;

    let point = state.point_service.use_point(id, amount).await?;
    Ok(ApiResponse::new(point))
}
