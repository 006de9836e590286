// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame payload validation and observation explosion.
//!
//! A frame either fails as a whole (`ERR_INVALID_PAYLOAD`) or yields one
//! observation per valid detected object; invalid objects inside a valid
//! frame are dropped and counted, never rejected frame-wide.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use gridwell_types::{DwellError, DwellResult, EpochMs, GridCellId, GridDimensions, Observation};

/// Inbound per-frame detection payload from a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionPayload {
    pub collector_id: String,
    pub camera_id: String,
    pub timestamp_ms: EpochMs,
    pub frame_id: String,
    pub objects: Vec<DetectedObject>,
}

/// One detected object within a frame. `class`, `confidence`, and `bbox`
/// are validated when present and then dropped; the engine is
/// class-agnostic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedObject {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub grid_cell_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<serde_json::Value>,
}

/// Result of normalizing one frame.
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    pub frame_id: String,
    pub observations: Vec<Observation>,
    pub objects_dropped: u32,
}

/// Deterministic observation identity over `(collector, camera, ts, object)`.
///
/// SHA-256 of the joined identity fields, first 32 hex chars. Stable
/// across processes so redelivered frames deduplicate downstream.
pub fn event_id(collector_id: &str, camera_id: &str, ts_ms: EpochMs, object_id: &str) -> String {
    let identity = format!("{}|{}|{}|{}", collector_id, camera_id, ts_ms, object_id);
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)[..32].to_string()
}

/// Validates frames and explodes them into observations.
#[derive(Debug, Clone)]
pub struct Normalizer {
    grid: GridDimensions,
}

impl Normalizer {
    pub fn new(grid: GridDimensions) -> Self {
        Self { grid }
    }

    /// Validate a frame and emit one observation per valid object.
    ///
    /// # Errors
    ///
    /// `DwellError::InvalidPayload` on frame-level violations (empty ids,
    /// negative timestamp). Object-level violations drop the object only.
    pub fn normalize_frame(&self, payload: &DetectionPayload) -> DwellResult<NormalizedFrame> {
        if payload.collector_id.is_empty() {
            return Err(DwellError::InvalidPayload("collector_id is empty".into()));
        }
        if payload.camera_id.is_empty() {
            return Err(DwellError::InvalidPayload("camera_id is empty".into()));
        }
        if payload.frame_id.is_empty() {
            return Err(DwellError::InvalidPayload("frame_id is empty".into()));
        }
        if payload.timestamp_ms < 0 {
            return Err(DwellError::InvalidPayload(format!(
                "timestamp_ms {} is negative",
                payload.timestamp_ms
            )));
        }

        let mut observations = Vec::with_capacity(payload.objects.len());
        let mut dropped = 0u32;

        for object in &payload.objects {
            match self.normalize_object(payload, object) {
                Ok(observation) => observations.push(observation),
                Err(err) => {
                    dropped += 1;
                    debug!(
                        frame_id = %payload.frame_id,
                        object_id = %object.object_id,
                        error = %err,
                        "dropping invalid object from frame"
                    );
                }
            }
        }

        Ok(NormalizedFrame {
            frame_id: payload.frame_id.clone(),
            observations,
            objects_dropped: dropped,
        })
    }

    fn normalize_object(
        &self,
        payload: &DetectionPayload,
        object: &DetectedObject,
    ) -> DwellResult<Observation> {
        if object.object_id.is_empty() {
            return Err(DwellError::InvalidPayload("object_id is empty".into()));
        }
        if let Some(confidence) = object.confidence {
            if !(0.0..=1.0).contains(&confidence) {
                return Err(DwellError::InvalidPayload(format!(
                    "confidence {} outside [0, 1]",
                    confidence
                )));
            }
        }
        let grid_cell_id = GridCellId::parse(&object.grid_cell_id, &self.grid)?;

        Ok(Observation {
            event_id: event_id(
                &payload.collector_id,
                &payload.camera_id,
                payload.timestamp_ms,
                &object.object_id,
            ),
            collector_id: payload.collector_id.clone(),
            camera_id: payload.camera_id.clone(),
            object_id: object.object_id.clone(),
            grid_cell_id,
            ts_ms: payload.timestamp_ms,
        })
    }
}
