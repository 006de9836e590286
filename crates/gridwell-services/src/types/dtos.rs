// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Transport-agnostic parameter and result types for the service layer.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use serde::{Deserialize, Serialize};

use gridwell_types::{EpochMs, ObjectState, TimelineEntry};

/// Acknowledgement for one ingested frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameAck {
    pub frame_id: String,
    pub objects_enqueued: usize,
    pub objects_dropped: u32,
}

/// Derived statistics for one cell aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStats {
    pub grid_cell_id: String,
    pub total_dwell_ms: u64,
    pub object_count: usize,
    pub avg_dwell_ms: u64,
    pub max_dwell_ms: u64,
    pub min_dwell_ms: u64,
}

/// Full detail for one tracked object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDetail {
    pub state: ObjectState,
    pub timeline: Vec<TimelineEntry>,
}

/// One object currently holding an open span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveObject {
    pub object_id: String,
    pub state: ObjectState,
}

/// One cell of the heatmap projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub grid_cell_id: String,
    pub x: u8,
    pub y: u8,
    pub dwell_ms: u64,
    pub object_count: usize,
    /// `dwell_ms / max(dwell_ms over returned cells)`, in `[0, 1]`.
    pub intensity: f64,
}

/// Heatmap projection over one partition's aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heatmap {
    pub grid_width: u8,
    pub grid_height: u8,
    pub window_ms: u64,
    pub cells: Vec<HeatmapCell>,
}

/// Parameters for a relabel operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelabelParams {
    pub collector_id: String,
    pub camera_id: String,
    pub old_object_id: String,
    pub new_object_id: String,
}

/// Parameters for a correct-cell operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectCellParams {
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub frame_ts_ms: EpochMs,
    pub correct_cell_id: String,
}

/// Parameters for a delete-span operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSpanParams {
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub from_ts_ms: EpochMs,
    pub to_ts_ms: EpochMs,
}

/// Whether a feedback operation changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackStatus {
    Applied,
    NoChange,
}

/// Result of one feedback operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackAck {
    pub status: FeedbackStatus,
    pub operation: String,
    pub object_id: String,
}

impl FeedbackAck {
    pub fn applied(operation: &str, object_id: impl Into<String>) -> Self {
        Self {
            status: FeedbackStatus::Applied,
            operation: operation.to_string(),
            object_id: object_id.into(),
        }
    }

    pub fn no_change(operation: &str, object_id: impl Into<String>) -> Self {
        Self {
            status: FeedbackStatus::NoChange,
            operation: operation.to_string(),
            object_id: object_id.into(),
        }
    }
}
