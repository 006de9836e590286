// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-object dwell state.

use serde::{Deserialize, Serialize};

use crate::grid::GridCellId;
use crate::EpochMs;

/// Live dwell state of one `(collector, camera, object)`.
///
/// Invariants:
/// - `current_cell.is_none() == enter_ts_ms.is_none()`
/// - `enter_ts_ms <= last_seen_ts_ms` when present
/// - `accumulated_ms` only grows under engine writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Cell the object currently occupies, None once closed by timeout.
    pub current_cell: Option<GridCellId>,
    /// When the object entered `current_cell`.
    pub enter_ts_ms: Option<EpochMs>,
    /// Timestamp of the most recent observation applied.
    pub last_seen_ts_ms: EpochMs,
    /// Total dwell over all previously closed spans.
    pub accumulated_ms: u64,
}

impl ObjectState {
    /// Fresh state for a first sighting.
    pub fn first_sighting(cell: GridCellId, ts_ms: EpochMs) -> Self {
        Self {
            current_cell: Some(cell),
            enter_ts_ms: Some(ts_ms),
            last_seen_ts_ms: ts_ms,
            accumulated_ms: 0,
        }
    }

    /// Whether the object holds an open span.
    pub fn is_active(&self) -> bool {
        self.current_cell.is_some()
    }

    /// Dwell of the open span as of `now_ms`, zero when no span is open.
    pub fn open_dwell_ms(&self, now_ms: EpochMs) -> u64 {
        match self.enter_ts_ms {
            Some(enter) => (now_ms - enter).max(0) as u64,
            None => 0,
        }
    }
}
