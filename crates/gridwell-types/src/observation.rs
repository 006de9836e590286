// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The ingress unit: one normalized per-object cell observation.

use serde::{Deserialize, Serialize};

use crate::grid::GridCellId;
use crate::keys::{ObjectKey, PartitionKey};
use crate::EpochMs;

/// One normalized detection of one object in one grid cell.
///
/// Produced by the normalizer from collector frame payloads, carried on the
/// ingress queue, consumed by the dwell engine. Immutable once emitted.
/// `event_id` is deterministic over `(collector, camera, ts, object)` so the
/// engine can deduplicate redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub event_id: String,
    pub collector_id: String,
    pub camera_id: String,
    pub object_id: String,
    pub grid_cell_id: GridCellId,
    pub ts_ms: EpochMs,
}

impl Observation {
    pub fn partition(&self) -> PartitionKey {
        PartitionKey::new(self.collector_id.clone(), self.camera_id.clone())
    }

    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(
            self.collector_id.clone(),
            self.camera_id.clone(),
            self.object_id.clone(),
        )
    }
}
