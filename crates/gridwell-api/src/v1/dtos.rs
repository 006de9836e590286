// API Version 1 - Data Transfer Objects
//
// Wire shapes are decoupled from the domain model: every DTO is built from
// its service-layer counterpart through a From impl, so internal types can
// evolve without breaking the wire contract.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use gridwell_engine::CountersSnapshot;
use gridwell_ingest::{DetectedObject, DetectionPayload};
use gridwell_services::{
    ActiveObject, CellStats, FeedbackAck, FeedbackStatus, Heatmap, HeatmapCell, ObjectDetail,
};
use gridwell_types::{ObjectState, RecentEvent, TimelineEntry};

// ===== Ingestion =====

/// One detection frame posted by a collector.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectionFrameV1 {
    pub collector_id: String,
    pub camera_id: String,
    pub timestamp_ms: i64,
    #[schema(example = "frame-000123")]
    pub frame_id: String,
    pub objects: Vec<DetectedObjectV1>,
}

/// One detected object within a frame.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DetectedObjectV1 {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "person")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[schema(example = "G_05_08")]
    pub grid_cell_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub bbox: Option<serde_json::Value>,
}

impl From<DetectionFrameV1> for DetectionPayload {
    fn from(frame: DetectionFrameV1) -> Self {
        DetectionPayload {
            collector_id: frame.collector_id,
            camera_id: frame.camera_id,
            timestamp_ms: frame.timestamp_ms,
            frame_id: frame.frame_id,
            objects: frame
                .objects
                .into_iter()
                .map(|object| DetectedObject {
                    object_id: object.object_id,
                    class: object.class,
                    confidence: object.confidence,
                    grid_cell_id: object.grid_cell_id,
                    bbox: object.bbox,
                })
                .collect(),
        }
    }
}

/// Acknowledgement for an accepted frame.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FrameAckResponseV1 {
    #[schema(example = "accepted")]
    pub status: String,
    pub frame_id: String,
    pub objects_enqueued: usize,
    pub objects_dropped: u32,
}

// ===== Object state & timeline =====

/// Live dwell state of one object.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObjectStateV1 {
    pub current_cell: Option<String>,
    pub enter_ts_ms: Option<i64>,
    pub last_seen_ts_ms: i64,
    pub accumulated_ms: u64,
}

impl From<ObjectState> for ObjectStateV1 {
    fn from(state: ObjectState) -> Self {
        Self {
            current_cell: state.current_cell.map(|cell| cell.to_string()),
            enter_ts_ms: state.enter_ts_ms,
            last_seen_ts_ms: state.last_seen_ts_ms,
            accumulated_ms: state.accumulated_ms,
        }
    }
}

/// One timeline entry, newest-first in responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntryV1 {
    #[schema(example = "leave")]
    pub kind: String,
    pub cell_id: String,
    pub from_ts_ms: i64,
    pub to_ts_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl From<TimelineEntry> for TimelineEntryV1 {
    fn from(entry: TimelineEntry) -> Self {
        let kind = match serde_json::to_value(entry.kind) {
            Ok(serde_json::Value::String(kind)) => kind,
            _ => "unknown".to_string(),
        };
        Self {
            kind,
            cell_id: entry.cell_id,
            from_ts_ms: entry.from_ts_ms,
            to_ts_ms: entry.to_ts_ms,
            meta: entry.meta,
        }
    }
}

/// Object detail response: live state plus timeline.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ObjectDetailResponseV1 {
    pub state: ObjectStateV1,
    pub timeline: Vec<TimelineEntryV1>,
}

impl From<ObjectDetail> for ObjectDetailResponseV1 {
    fn from(detail: ObjectDetail) -> Self {
        Self {
            state: detail.state.into(),
            timeline: detail.timeline.into_iter().map(Into::into).collect(),
        }
    }
}

/// One object currently inside a cell.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActiveObjectV1 {
    pub object_id: String,
    pub state: ObjectStateV1,
}

impl From<ActiveObject> for ActiveObjectV1 {
    fn from(active: ActiveObject) -> Self {
        Self {
            object_id: active.object_id,
            state: active.state.into(),
        }
    }
}

// ===== Aggregates =====

/// Per-cell dwell statistics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CellStatsResponseV1 {
    #[schema(example = "G_05_08")]
    pub grid_cell_id: String,
    pub total_dwell_ms: u64,
    pub object_count: usize,
    pub avg_dwell_ms: u64,
    pub max_dwell_ms: u64,
    pub min_dwell_ms: u64,
}

impl From<CellStats> for CellStatsResponseV1 {
    fn from(stats: CellStats) -> Self {
        Self {
            grid_cell_id: stats.grid_cell_id,
            total_dwell_ms: stats.total_dwell_ms,
            object_count: stats.object_count,
            avg_dwell_ms: stats.avg_dwell_ms,
            max_dwell_ms: stats.max_dwell_ms,
            min_dwell_ms: stats.min_dwell_ms,
        }
    }
}

/// Grid dimensions echoed in heatmap responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GridSizeV1 {
    pub width: u8,
    pub height: u8,
}

/// One heatmap cell.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatmapCellV1 {
    pub grid_cell_id: String,
    pub x: u8,
    pub y: u8,
    pub dwell_ms: u64,
    pub object_count: usize,
    /// Normalized against the hottest returned cell, in [0, 1].
    pub intensity: f64,
}

impl From<HeatmapCell> for HeatmapCellV1 {
    fn from(cell: HeatmapCell) -> Self {
        Self {
            grid_cell_id: cell.grid_cell_id,
            x: cell.x,
            y: cell.y,
            dwell_ms: cell.dwell_ms,
            object_count: cell.object_count,
            intensity: cell.intensity,
        }
    }
}

/// Heatmap response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HeatmapResponseV1 {
    pub grid_size: GridSizeV1,
    pub cells: Vec<HeatmapCellV1>,
    pub window_ms: u64,
}

impl From<Heatmap> for HeatmapResponseV1 {
    fn from(heatmap: Heatmap) -> Self {
        Self {
            grid_size: GridSizeV1 {
                width: heatmap.grid_width,
                height: heatmap.grid_height,
            },
            cells: heatmap.cells.into_iter().map(Into::into).collect(),
            window_ms: heatmap.window_ms,
        }
    }
}

// ===== Live feed =====

/// One live-feed event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentEventV1 {
    #[schema(example = "enter")]
    pub kind: String,
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub grid_cell_id: String,
    pub ts_ms: i64,
    pub recorded_at_ms: i64,
}

impl From<RecentEvent> for RecentEventV1 {
    fn from(event: RecentEvent) -> Self {
        let kind = match serde_json::to_value(event.kind) {
            Ok(serde_json::Value::String(kind)) => kind,
            _ => "unknown".to_string(),
        };
        Self {
            kind,
            collector_id: event.collector_id,
            camera_id: event.camera_id,
            object_id: event.object_id,
            grid_cell_id: event.grid_cell_id,
            ts_ms: event.ts_ms,
            recorded_at_ms: event.recorded_at_ms,
        }
    }
}

// ===== Feedback =====

/// Relabel request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelabelRequestV1 {
    pub collector_id: String,
    pub camera_id: String,
    pub old_object_id: String,
    pub new_object_id: String,
}

/// Correct-cell request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CorrectCellRequestV1 {
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub frame_ts_ms: i64,
    #[schema(example = "G_07_03")]
    pub correct_cell_id: String,
}

/// Delete-span request body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteSpanRequestV1 {
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub from_ts_ms: i64,
    pub to_ts_ms: i64,
}

/// Feedback operation acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackAckResponseV1 {
    #[schema(example = "APPLIED")]
    pub status: String,
    pub operation: String,
    pub object_id: String,
}

impl From<FeedbackAck> for FeedbackAckResponseV1 {
    fn from(ack: FeedbackAck) -> Self {
        Self {
            status: match ack.status {
                FeedbackStatus::Applied => "APPLIED".to_string(),
                FeedbackStatus::NoChange => "NO_CHANGE".to_string(),
            },
            operation: ack.operation,
            object_id: ack.object_id,
        }
    }
}

// ===== System =====

/// Component readiness details.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ComponentReadinessV1 {
    pub api: bool,
    pub store: bool,
    pub engine: bool,
    pub sweeper: bool,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseV1 {
    #[schema(example = "healthy")]
    pub status: String,
    pub uptime_secs: u64,
    pub components: ComponentReadinessV1,
}

/// Engine counter values.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CountersV1 {
    pub observations_processed: u64,
    pub duplicates_dropped: u64,
    pub out_of_order_dropped: u64,
    pub transitions: u64,
    pub timeout_closes: u64,
    pub store_errors: u64,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub objects_dropped: u64,
    pub partitions_started: u64,
}

impl From<CountersSnapshot> for CountersV1 {
    fn from(snapshot: CountersSnapshot) -> Self {
        Self {
            observations_processed: snapshot.observations_processed,
            duplicates_dropped: snapshot.duplicates_dropped,
            out_of_order_dropped: snapshot.out_of_order_dropped,
            transitions: snapshot.transitions,
            timeout_closes: snapshot.timeout_closes,
            store_errors: snapshot.store_errors,
            frames_accepted: snapshot.frames_accepted,
            frames_rejected: snapshot.frames_rejected,
            objects_dropped: snapshot.objects_dropped,
            partitions_started: snapshot.partitions_started,
        }
    }
}

/// Consumer/service status response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponseV1 {
    #[schema(example = "gridwell")]
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
    pub partitions: usize,
    pub grid_width: u8,
    pub grid_height: u8,
    pub dwell_timeout_ms: u64,
    pub sweep_interval_ms: u64,
    pub counters: CountersV1,
}

/// Process counters response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponseV1 {
    pub counters: CountersV1,
}
