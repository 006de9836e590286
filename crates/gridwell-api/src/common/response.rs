// Response envelopes.
//
// Every endpoint answers its payload together with the server time the
// spec requires on all responses. Success and failure use distinct
// envelopes: outcome is carried by the HTTP status (derived from the
// error code), not by a flag in the body.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ApiError;

/// Success envelope: payload plus server time (RFC 3339).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub data: T,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error envelope: the taxonomy error plus server time. The transport
/// status comes from the error code, see `ApiErrorCode::status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ApiError,
    pub timestamp: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
