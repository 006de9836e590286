// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions.
//!
//! Each struct maps to a section of `gridwell_configuration.toml`. All
//! sections and fields carry defaults so a missing file still yields a
//! runnable configuration.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GridwellConfig {
    pub grid: GridConfig,
    pub engine: EngineConfig,
    pub store: StoreConfig,
    pub api: ApiConfig,
    pub feedback: FeedbackConfig,
    pub logging: LoggingConfig,
}

/// Grid geometry, fixed at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub width: u8,
    pub height: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 15,
        }
    }
}

/// Dwell engine and sweeper tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Gap after which an open span is closed implicitly.
    pub dwell_timeout_ms: u64,
    /// Per-partition deduplication window (event ids).
    pub dedup_window: usize,
    /// Timeout sweeper tick interval.
    pub sweep_interval_ms: u64,
    /// Max observations a worker drains per wakeup.
    pub batch_size: usize,
    /// Minimum spacing between move events per object (0 = unthrottled).
    pub move_event_min_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dwell_timeout_ms: 30_000,
            dedup_window: 10_000,
            sweep_interval_ms: 5_000,
            batch_size: 64,
            move_event_min_interval_ms: 0,
        }
    }
}

/// State store retention and capacities.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Rolling retention after last write, in seconds.
    pub state_ttl_secs: u64,
    /// Bounded live-feed capacity.
    pub recent_events_capacity: usize,
    /// Entries retained per object timeline, oldest discarded.
    pub timeline_cap: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            state_ttl_secs: 86_400,
            recent_events_capacity: 100,
            timeline_cap: 100,
        }
    }
}

/// HTTP API server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Per-request deadline.
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8600,
            request_timeout_secs: 10,
        }
    }
}

/// Feedback processor policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// When enabled, delete-span also deducts from aggregates (best effort).
    /// Off by default: delete-span is an audit-only record.
    pub deduct_deleted_spans: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            deduct_deleted_spans: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// tracing filter level: trace, debug, info, warn, error.
    pub level: String,
    /// Directory for rotating file logs.
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "./logs".to_string(),
        }
    }
}
