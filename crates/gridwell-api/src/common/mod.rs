// Common API types shared by every endpoint.

pub mod error;
pub mod request;
pub mod response;

pub use error::{ApiError, ApiErrorCode};
pub use request::with_deadline;
pub use response::{ApiResponse, ErrorResponse};

/// Result alias for transport-agnostic endpoints.
pub type ApiResult<T> = Result<T, ApiError>;
