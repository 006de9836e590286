// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell Core Types
//!
//! The shared data model for the gridwell dwell-time engine: grid geometry,
//! stream identifiers, observations, per-object state, timeline entries,
//! per-cell aggregates, recent events, and the transport-agnostic error
//! taxonomy.
//!
//! Everything here is plain data. Engine semantics live in
//! `gridwell-engine`; persistence contracts live in `gridwell-store`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod aggregate;
pub mod error;
pub mod events;
pub mod grid;
pub mod keys;
pub mod observation;
pub mod state;
pub mod timeline;

pub use aggregate::CellAggregate;
pub use error::{DwellError, DwellResult, ErrorCode};
pub use events::{FeedbackAuditEntry, RecentEvent, RecentEventKind};
pub use grid::{GridCellId, GridDimensions};
pub use keys::{ObjectKey, PartitionKey};
pub use observation::Observation;
pub use state::ObjectState;
pub use timeline::{TimelineEntry, TimelineEntryKind};

/// Milliseconds since the Unix epoch.
pub type EpochMs = i64;

/// Current wall-clock time as epoch milliseconds.
pub fn epoch_ms_now() -> EpochMs {
    chrono::Utc::now().timestamp_millis()
}
