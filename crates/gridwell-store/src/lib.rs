// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell State Store
//!
//! Typed persistence for the dwell-time engine across five logical
//! namespaces keyed by `(collector, camera, ...)`:
//!
//! - **ObjectState** - live per-object dwell state
//! - **CellAggregate** - per-cell closed-span contributions
//! - **Timeline** - per-object enter/leave history, bounded, newest-first
//! - **RecentEvents** - bounded cross-stream live feed
//! - **FeedbackAudit** - append-only feedback operation log
//!
//! ## Contracts
//!
//! Every individual operation is atomic with respect to other operations on
//! the same key. Multi-key sequences (engine transitions, feedback
//! operations, sweeper closes) serialize through the [`ObjectLockManager`]
//! so writes to one object are linearized across callers.
//!
//! Every write refreshes the entry's TTL. Expired entries are invisible to
//! reads and dropped lazily; no background compaction runs.
//!
//! The [`StateStore`] trait keeps engine logic store-agnostic: the
//! production backend is the in-memory [`MemoryStore`], and tests inject
//! failing doubles to exercise redelivery paths.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod locks;
pub mod memory;

pub use locks::ObjectLockManager;
pub use memory::{MemoryStore, StoreSettings};

use async_trait::async_trait;

use gridwell_types::{
    CellAggregate, DwellResult, FeedbackAuditEntry, GridCellId, ObjectKey, ObjectState,
    PartitionKey, RecentEvent, TimelineEntry,
};

/// Typed state store contract. Every call is a potential suspension point.
#[async_trait]
pub trait StateStore: Send + Sync {
    // ===== ObjectState =====

    async fn get_object_state(&self, key: &ObjectKey) -> DwellResult<Option<ObjectState>>;

    /// Upsert with TTL refresh.
    async fn put_object_state(&self, key: &ObjectKey, state: &ObjectState) -> DwellResult<()>;

    async fn delete_object_state(&self, key: &ObjectKey) -> DwellResult<()>;

    /// All live states of one partition.
    async fn list_object_states(
        &self,
        partition: &PartitionKey,
    ) -> DwellResult<Vec<(ObjectKey, ObjectState)>>;

    /// All states holding an open span, across partitions (sweeper scan).
    async fn scan_open_states(&self) -> DwellResult<Vec<(ObjectKey, ObjectState)>>;

    // ===== CellAggregate =====

    /// Record one closed span's dwell. Accumulative per `(cell, object)`
    /// across distinct calls.
    async fn add_contribution(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
        object_id: &str,
        dwell_ms: u64,
    ) -> DwellResult<()>;

    /// Drop an object's entire contribution to a cell. Feedback only; the
    /// engine never calls this.
    async fn remove_contribution(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
        object_id: &str,
    ) -> DwellResult<()>;

    /// Move all of `old_object_id`'s contributions in the partition to
    /// `new_object_id`, merging where the target already contributes.
    async fn rename_contributor(
        &self,
        partition: &PartitionKey,
        old_object_id: &str,
        new_object_id: &str,
    ) -> DwellResult<()>;

    async fn get_aggregate(
        &self,
        partition: &PartitionKey,
        cell: &GridCellId,
    ) -> DwellResult<Option<CellAggregate>>;

    async fn list_aggregates(&self, partition: &PartitionKey) -> DwellResult<Vec<CellAggregate>>;

    // ===== Timeline =====

    /// Prepend an entry (newest-first). Bounded: the oldest entry beyond
    /// the configured cap is discarded.
    async fn prepend_timeline(&self, key: &ObjectKey, entry: TimelineEntry) -> DwellResult<()>;

    /// Most recent `limit` entries, newest-first.
    async fn read_timeline(&self, key: &ObjectKey, limit: usize) -> DwellResult<Vec<TimelineEntry>>;

    /// Remove and return the whole timeline, newest-first.
    async fn take_timeline(&self, key: &ObjectKey) -> DwellResult<Vec<TimelineEntry>>;

    /// Prepend a block of entries (given newest-first) ahead of any
    /// existing entries, re-applying the cap.
    async fn splice_timeline(
        &self,
        key: &ObjectKey,
        entries: Vec<TimelineEntry>,
    ) -> DwellResult<()>;

    // ===== RecentEvents =====

    /// Push onto the bounded live feed. The store stamps `recorded_at_ms`.
    async fn push_recent(&self, event: RecentEvent) -> DwellResult<()>;

    /// Most recent `limit` events, newest-first.
    async fn read_recent(&self, limit: usize) -> DwellResult<Vec<RecentEvent>>;

    // ===== FeedbackAudit =====

    async fn append_audit(&self, entry: FeedbackAuditEntry) -> DwellResult<()>;

    async fn read_audit(&self, limit: usize) -> DwellResult<Vec<FeedbackAuditEntry>>;

    // ===== Cross-key serialization =====

    /// Per-object lock manager linearizing engine, feedback, and sweeper
    /// writes for one object.
    fn locks(&self) -> &ObjectLockManager;
}
