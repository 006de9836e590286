// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Process-level engine counters.
//!
//! Lock-free atomics shared by the ingestion path, the partition workers,
//! and the sweeper; snapshotted by the status and metrics endpoints.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter block.
#[derive(Debug, Default)]
pub struct EngineCounters {
    pub observations_processed: AtomicU64,
    pub duplicates_dropped: AtomicU64,
    pub out_of_order_dropped: AtomicU64,
    pub transitions: AtomicU64,
    pub timeout_closes: AtomicU64,
    pub store_errors: AtomicU64,
    pub frames_accepted: AtomicU64,
    pub frames_rejected: AtomicU64,
    pub objects_dropped: AtomicU64,
    pub partitions_started: AtomicU64,
}

impl EngineCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(counter: &AtomicU64, delta: u64) {
        counter.fetch_add(delta, Ordering::Relaxed);
    }

    /// Point-in-time copy for serialization.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            observations_processed: self.observations_processed.load(Ordering::Relaxed),
            duplicates_dropped: self.duplicates_dropped.load(Ordering::Relaxed),
            out_of_order_dropped: self.out_of_order_dropped.load(Ordering::Relaxed),
            transitions: self.transitions.load(Ordering::Relaxed),
            timeout_closes: self.timeout_closes.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            frames_accepted: self.frames_accepted.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            objects_dropped: self.objects_dropped.load(Ordering::Relaxed),
            partitions_started: self.partitions_started.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountersSnapshot {
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
