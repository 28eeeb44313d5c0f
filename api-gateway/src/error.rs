//! Error handling for the API gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::error::Error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error information
    pub error: ErrorInfo,
    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Detailed error information
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorInfo {
    /// Error code (string identifier for the error type)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
}

/// API errors
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request value: {0}")]
    Validation(String),

    #[error(transparent)]
    Common(#[from] Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str, Option<serde_json::Value>) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error", None),
            ApiError::Common(e) => match e {
                // Client errors (4xx)
                Error::InsufficientBalance { balance, amount, .. } => (
                    StatusCode::BAD_REQUEST,
                    "insufficient_balance",
                    Some(serde_json::json!({
                        "balance": balance,
                        "requested": amount,
                    })),
                ),
                Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_error", None),

                // Server errors (5xx)
                Error::LockTimeout(_) => (StatusCode::SERVICE_UNAVAILABLE, "lock_timeout", None),
                Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error", None),
                Error::ConfigurationError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "configuration_error",
                    None,
                ),
                Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None),
            },
        }
    }

    fn is_rejection(&self) -> bool {
        match self {
            ApiError::Validation(_) => true,
            ApiError::Common(e) => e.is_rejection(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Generate a request ID for tracking errors
        let request_id = Uuid::new_v4().to_string();

        if self.is_rejection() {
            tracing::warn!("Rejected request [{}]: {}", request_id, &self);
        } else {
            tracing::error!("API Error [{}]: {:?}", request_id, &self);
        }

        let (status, code, details) = self.status_and_code();

        let error_response = ErrorResponse {
            error: ErrorInfo {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
            request_id: Some(request_id),
        };

        (status, Json(error_response)).into_response()
    }
}
