// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # gridwell-observability
//!
//! Unified logging initialization: human-readable console output plus a
//! daily-rotated JSON file, with the filter level taken from configuration
//! or the `RUST_LOG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod init;

pub use init::{init_logging, LoggingGuard};
