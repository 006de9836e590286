// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Live-feed events and the feedback audit record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::EpochMs;

/// Kind of live-feed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentEventKind {
    Enter,
    Move,
    Exit,
}

/// One entry of the bounded cross-stream live feed.
///
/// `ts_ms` is the source observation timestamp; `recorded_at_ms` is stamped
/// by the store on push, so feed order reflects arrival, not source time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub kind: RecentEventKind,
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub grid_cell_id: String,
    pub ts_ms: EpochMs,
    #[serde(default)]
    pub recorded_at_ms: EpochMs,
}

impl RecentEvent {
    pub fn new(
        kind: RecentEventKind,
        collector_id: impl Into<String>,
        camera_id: impl Into<String>,
        object_id: impl Into<String>,
        grid_cell_id: impl Into<String>,
        ts_ms: EpochMs,
    ) -> Self {
        Self {
            kind,
            collector_id: collector_id.into(),
            camera_id: camera_id.into(),
            object_id: object_id.into(),
            grid_cell_id: grid_cell_id.into(),
            ts_ms,
            recorded_at_ms: 0,
        }
    }
}

/// Append-only record of one feedback operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAuditEntry {
    pub operation: String,
    pub payload: Value,
    pub ts_ms: EpochMs,
}

impl FeedbackAuditEntry {
    pub fn new(operation: impl Into<String>, payload: Value, ts_ms: EpochMs) -> Self {
        Self {
            operation: operation.into(),
            payload,
            ts_ms,
        }
    }
}
