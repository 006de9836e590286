/*!
Feedback service trait.

Human-in-the-loop corrections that mutate live state, aggregates, and
timelines outside the normal observation stream.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use async_trait::async_trait;

use gridwell_types::{DwellResult, EpochMs};

use crate::types::{CorrectCellParams, DeleteSpanParams, FeedbackAck, RelabelParams};

/// Feedback operations (transport-agnostic).
///
/// Each operation is atomic end-to-end and linearized with engine writes
/// for the affected object. `now_ms` comes from the caller so the core
/// stays clock-free.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Reassign an object's identity, carrying its state, its aggregate
    /// footprint, and the open-span dwell (closed at `now_ms`) to the new
    /// id, and moving the timeline.
    ///
    /// # Errors
    /// * `DwellError::NotFound` - no state under the old id
    /// * `DwellError::Conflict` - state already exists under the new id
    async fn relabel(&self, params: RelabelParams, now_ms: EpochMs) -> DwellResult<FeedbackAck>;

    /// Move an object to its correct cell as of `frame_ts_ms`, zeroing the
    /// original cell's contribution from this object. `accumulated_ms` is
    /// untouched.
    ///
    /// # Errors
    /// * `DwellError::NotFound` - unknown object
    /// * `DwellError::InvalidPayload` - malformed or off-grid cell id
    async fn correct_cell(
        &self,
        params: CorrectCellParams,
        now_ms: EpochMs,
    ) -> DwellResult<FeedbackAck>;

    /// Record a span as a false positive. Audit-only by default; deducts
    /// from aggregates when the deduction policy is enabled.
    ///
    /// # Errors
    /// * `DwellError::InvalidSpan` - `from_ts_ms >= to_ts_ms`
    async fn delete_span(
        &self,
        params: DeleteSpanParams,
        now_ms: EpochMs,
    ) -> DwellResult<FeedbackAck>;
}
