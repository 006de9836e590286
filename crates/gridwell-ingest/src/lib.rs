// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell Ingest
//!
//! The observation ingestion path: collector frame payloads are validated
//! and exploded into per-object [`Observation`]s by the [`Normalizer`],
//! then routed onto the partitioned [`IngressQueue`] keyed by
//! `collector_id:camera_id`. One consumer worker per partition drains the
//! queue in insertion order.
//!
//! [`Observation`]: gridwell_types::Observation

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod normalizer;
pub mod queue;

pub use normalizer::{event_id, DetectedObject, DetectionPayload, NormalizedFrame, Normalizer};
pub use queue::{IngressQueue, PartitionStream, RAW_DETECTIONS_TOPIC};
