/*!
Query service trait.

Read-only projections over the state store; no in-process caches, every
call reads through.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use async_trait::async_trait;

use gridwell_types::{DwellResult, ObjectKey, PartitionKey, RecentEvent};

use crate::types::{ActiveObject, CellStats, Heatmap, ObjectDetail};

/// Read projections (transport-agnostic).
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Aggregates of one partition, sorted by `total_dwell_ms` descending.
    /// With `cell` set, the single matching aggregate.
    ///
    /// # Errors
    /// * `DwellError::NotFound` - `cell` given but no aggregate exists
    /// * `DwellError::InvalidPayload` - malformed cell filter
    async fn cell_stats(
        &self,
        partition: &PartitionKey,
        cell: Option<&str>,
    ) -> DwellResult<Vec<CellStats>>;

    /// Live state plus recent timeline for one object.
    ///
    /// # Errors
    /// * `DwellError::NotFound` - no state for the object
    async fn object_detail(
        &self,
        key: &ObjectKey,
        timeline_limit: usize,
    ) -> DwellResult<ObjectDetail>;

    /// Per-cell dwell intensities for one partition. `window_ms = 0`
    /// returns an empty projection (reserved for a real-time view).
    async fn heatmap(&self, partition: &PartitionKey, window_ms: u64) -> DwellResult<Heatmap>;

    /// Objects currently holding an open span.
    async fn active_objects(&self, partition: &PartitionKey) -> DwellResult<Vec<ActiveObject>>;

    /// The cross-stream live feed, newest-first.
    async fn recent_events(&self, limit: usize) -> DwellResult<Vec<RecentEvent>>;
}
