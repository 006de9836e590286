// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization.
//!
//! Console output stays human-readable; the rotating file log is JSON for
//! downstream collection. The returned guard must live as long as the
//! process, it flushes the non-blocking file writer on drop.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Keeps the non-blocking file writer alive.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

impl LoggingGuard {
    /// Get the log directory path
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize logging with console and rotating file output.
///
/// # Arguments
/// * `level` - default filter level (overridden by `RUST_LOG` when set)
/// * `log_dir` - directory for the rotated `gridwell.log` files
pub fn init_logging(level: &str, log_dir: &Path) -> Result<LoggingGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let file_appender = rolling::daily(log_dir, "gridwell.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .json()
        .boxed();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: log_dir.to_path_buf(),
    })
}
