//! JSON response envelope.
//!
//! Every API response has the shape
//! `{ "success": bool, "data"?: T, "message"?: string }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parley_core::upload::{IntakeError, UploadError};
use parley_shared::AppError;
use serde::Serialize;

/// Uniform response body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Whether the request succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message, always present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    /// Failed response carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Error rendered as a failure envelope with the matching status code.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ApiResponse::failure(self.0.message()))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self(err.into())
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        UploadError::from(err).into()
    }
}
