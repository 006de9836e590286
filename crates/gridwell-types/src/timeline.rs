// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-object enter/leave timeline entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::EpochMs;

/// Kind of timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineEntryKind {
    Enter,
    Leave,
    Correct,
    Delete,
}

/// One chronological span record for an object.
///
/// Timelines are stored newest-first. An open `Enter` has `to_ts_ms = None`;
/// a `Leave` closes the matching enter on the same cell with `to >= from`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub kind: TimelineEntryKind,
    pub cell_id: String,
    pub from_ts_ms: EpochMs,
    pub to_ts_ms: Option<EpochMs>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl TimelineEntry {
    pub fn enter(cell_id: impl Into<String>, from_ts_ms: EpochMs) -> Self {
        Self {
            kind: TimelineEntryKind::Enter,
            cell_id: cell_id.into(),
            from_ts_ms,
            to_ts_ms: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn leave(cell_id: impl Into<String>, from_ts_ms: EpochMs, to_ts_ms: EpochMs) -> Self {
        Self {
            kind: TimelineEntryKind::Leave,
            cell_id: cell_id.into(),
            from_ts_ms,
            to_ts_ms: Some(to_ts_ms),
            meta: BTreeMap::new(),
        }
    }

    pub fn correct(cell_id: impl Into<String>, from_ts_ms: EpochMs, to_ts_ms: EpochMs) -> Self {
        Self {
            kind: TimelineEntryKind::Correct,
            cell_id: cell_id.into(),
            from_ts_ms,
            to_ts_ms: Some(to_ts_ms),
            meta: BTreeMap::new(),
        }
    }

    pub fn delete(from_ts_ms: EpochMs, to_ts_ms: EpochMs) -> Self {
        Self {
            kind: TimelineEntryKind::Delete,
            cell_id: "deleted".to_string(),
            from_ts_ms,
            to_ts_ms: Some(to_ts_ms),
            meta: BTreeMap::new(),
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Closed-span duration; zero for open entries.
    pub fn duration_ms(&self) -> u64 {
        match self.to_ts_ms {
            Some(to) => (to - self.from_ts_ms).max(0) as u64,
            None => 0,
        }
    }
}
