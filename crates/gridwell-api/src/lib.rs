// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Gridwell REST API Layer
//
// Thin HTTP adapters (Axum) over the transport-agnostic service layer:
// parse and validate, call the service, wrap the result in the standard
// response envelope. Query handlers never mutate state.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod endpoints;
pub mod openapi;
pub mod transports;
pub mod v1;

// Re-export commonly used types
pub use common::{ApiError, ApiErrorCode, ApiResponse, ApiResult, ErrorResponse};
pub use transports::http::server::{create_http_server, ApiState};
