use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use gridwell_types::{DwellError, ErrorCode};

use super::response::ErrorResponse;

/// Wire-visible API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    ErrInvalidPayload,
    ErrOutOfOrder,
    ErrNotFound,
    ErrConflict,
    ErrInvalidSpan,
    ErrTimeout,
    ErrStoreUnavailable,
    ErrInternal,
}

impl From<ErrorCode> for ApiErrorCode {
    fn from(code: ErrorCode) -> Self {
        match code {
            ErrorCode::ErrInvalidPayload => ApiErrorCode::ErrInvalidPayload,
            ErrorCode::ErrOutOfOrder => ApiErrorCode::ErrOutOfOrder,
            ErrorCode::ErrNotFound => ApiErrorCode::ErrNotFound,
            ErrorCode::ErrConflict => ApiErrorCode::ErrConflict,
            ErrorCode::ErrInvalidSpan => ApiErrorCode::ErrInvalidSpan,
            ErrorCode::ErrTimeout => ApiErrorCode::ErrTimeout,
            ErrorCode::ErrStoreUnavailable => ApiErrorCode::ErrStoreUnavailable,
            ErrorCode::ErrInternal => ApiErrorCode::ErrInternal,
        }
    }
}

impl ApiErrorCode {
    /// Transport mapping of the error taxonomy.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::ErrInvalidPayload => StatusCode::BAD_REQUEST,
            ApiErrorCode::ErrOutOfOrder => StatusCode::BAD_REQUEST,
            ApiErrorCode::ErrNotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::ErrConflict => StatusCode::CONFLICT,
            ApiErrorCode::ErrInvalidSpan => StatusCode::BAD_REQUEST,
            ApiErrorCode::ErrTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiErrorCode::ErrStoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::ErrInternal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error detail.
    pub detail: String,

    /// Stable error code.
    pub code: ApiErrorCode,

    /// Additional structured details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.detail)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn new(detail: impl Into<String>, code: ApiErrorCode) -> Self {
        Self {
            detail: detail.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::ErrInvalidPayload)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, ApiErrorCode::ErrInternal)
    }
}

/// Convert domain errors to API errors.
impl From<DwellError> for ApiError {
    fn from(err: DwellError) -> Self {
        let code = ApiErrorCode::from(err.code());
        match &err {
            DwellError::NotFound { resource, id } => {
                ApiError::new(err.to_string(), code).with_details(serde_json::json!({
                    "resource": resource,
                    "id": id,
                }))
            }
            DwellError::Conflict { resource, id } => {
                ApiError::new(err.to_string(), code).with_details(serde_json::json!({
                    "resource": resource,
                    "id": id,
                }))
            }
            _ => ApiError::new(err.to_string(), code),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}
