// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell Dwell Engine
//!
//! The stateful core of the system: consumes per-object cell observations
//! and maintains each object's current cell, accumulated dwell, and
//! enter/leave timeline, with deterministic handling of transitions,
//! duplicate observations, out-of-order timestamps, and stale-object
//! timeouts.
//!
//! ## Concurrency model
//!
//! One cooperative consumer loop per `(collector, camera)` partition.
//! Ordering is guaranteed only within a partition; partition workers run as
//! independent tasks. Every multi-key mutation happens under the store's
//! per-object lock so feedback operations are linearized with engine
//! writes.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod counters;
pub mod dedup;
pub mod engine;
pub mod sweeper;
pub mod worker;

pub use counters::{CountersSnapshot, EngineCounters};
pub use dedup::DedupWindow;
pub use engine::{DwellEngine, EngineSettings, ProcessOutcome};
pub use sweeper::TimeoutSweeper;
pub use worker::spawn_supervisor;
