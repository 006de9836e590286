// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell
//!
//! Grid dwell-time analytics: collectors post per-frame object detections,
//! a partitioned engine turns them into per-cell dwell aggregates and
//! per-object timelines, feedback operations let an operator correct the
//! record, and an HTTP API serves read projections.
//!
//! ## Crate map
//!
//! - [`types`] - shared data model and error taxonomy
//! - [`config`] - TOML + environment configuration
//! - [`store`] - typed state store (object state, aggregates, timelines,
//!   live feed, audit)
//! - [`ingest`] - frame normalizer and the partitioned ingress queue
//! - [`engine`] - the dwell state machine, partition workers, and the
//!   timeout sweeper
//! - [`services`] - transport-agnostic feedback and query services
//! - [`api`] - HTTP transport (Axum)
//! - [`observability`] - logging initialization
//!
//! The `gridwell` binary wires all of these together; see `src/main.rs`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use gridwell_api as api;
pub use gridwell_config as config;
pub use gridwell_engine as engine;
pub use gridwell_ingest as ingest;
pub use gridwell_observability as observability;
pub use gridwell_services as services;
pub use gridwell_store as store;
pub use gridwell_types as types;

/// Commonly used types for embedding gridwell as a library.
pub mod prelude {
    pub use gridwell_config::{load_config, validate_config, GridwellConfig};
    pub use gridwell_engine::{
        DwellEngine, EngineCounters, EngineSettings, ProcessOutcome, TimeoutSweeper,
    };
    pub use gridwell_ingest::{DetectionPayload, IngressQueue, Normalizer};
    pub use gridwell_services::{
        FeedbackService, FeedbackServiceImpl, IngestService, IngestServiceImpl, QueryService,
        QueryServiceImpl,
    };
    pub use gridwell_store::{MemoryStore, StateStore, StoreSettings};
    pub use gridwell_types::{
        DwellError, DwellResult, GridCellId, GridDimensions, ObjectKey, ObjectState, Observation,
        PartitionKey,
    };
}
