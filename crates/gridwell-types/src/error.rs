// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Transport-agnostic error taxonomy.

Every layer of the system reports failures through `DwellError`; transport
adapters map the stable `ErrorCode` to their own status codes (HTTP 4xx/5xx).
*/

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::EpochMs;

/// Stable error codes carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ErrInvalidPayload,
    ErrOutOfOrder,
    ErrNotFound,
    ErrConflict,
    ErrInvalidSpan,
    ErrTimeout,
    ErrStoreUnavailable,
    ErrInternal,
}

/// Failures observable across the system (transport-agnostic).
#[derive(Error, Debug, Clone)]
pub enum DwellError {
    /// Schema or grid-id violation in inbound data.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// Observation timestamp behind the partition watermark.
    #[error("out of order: ts {ts} behind watermark {watermark}")]
    OutOfOrder { ts: EpochMs, watermark: EpochMs },

    /// Unknown object state or aggregate.
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: String, id: String },

    /// Relabel target already exists.
    #[error("conflict: {resource} '{id}' already exists")]
    Conflict { resource: String, id: String },

    /// delete-span where `from >= to`.
    #[error("invalid span: from {from} >= to {to}")]
    InvalidSpan { from: EpochMs, to: EpochMs },

    /// Operation deadline exceeded.
    #[error("operation timed out: {0}")]
    Timeout(String),

    /// Store read/write failed after retries.
    #[error("state store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl DwellError {
    /// Stable code for transport mapping.
    pub fn code(&self) -> ErrorCode {
        match self {
            DwellError::InvalidPayload(_) => ErrorCode::ErrInvalidPayload,
            DwellError::OutOfOrder { .. } => ErrorCode::ErrOutOfOrder,
            DwellError::NotFound { .. } => ErrorCode::ErrNotFound,
            DwellError::Conflict { .. } => ErrorCode::ErrConflict,
            DwellError::InvalidSpan { .. } => ErrorCode::ErrInvalidSpan,
            DwellError::Timeout(_) => ErrorCode::ErrTimeout,
            DwellError::StoreUnavailable(_) => ErrorCode::ErrStoreUnavailable,
            DwellError::Internal(_) => ErrorCode::ErrInternal,
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        DwellError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, id: impl Into<String>) -> Self {
        DwellError::Conflict {
            resource: resource.into(),
            id: id.into(),
        }
    }
}

/// Result alias used across all gridwell crates.
pub type DwellResult<T> = Result<T, DwellError>;
