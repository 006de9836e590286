// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support.
//!
//! Two-tier loading: TOML file (base), then environment variables. The
//! file is optional: when no file is found, built-in defaults are used and
//! environment overrides still apply.

use crate::{ConfigResult, GridwellConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file name searched for in the working directory and its
/// ancestors.
pub const CONFIG_FILE_NAME: &str = "gridwell_configuration.toml";

/// Find the gridwell configuration file.
///
/// Search order:
/// 1. `GRIDWELL_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 ancestor directories
///
/// Returns `None` when no file exists in any location.
pub fn find_config_file() -> Option<PathBuf> {
    if let Ok(env_path) = env::var("GRIDWELL_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Some(path);
        }
        return None;
    }

    let mut dir = env::current_dir().ok()?;
    for _ in 0..=5 {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => break,
        }
    }
    None
}

/// Load configuration, applying file and environment overrides in order.
///
/// # Arguments
///
/// * `config_path` - Explicit path to a config file. `None` triggers
///   discovery; a discovery miss falls back to defaults.
///
/// # Errors
///
/// Returns an error when an explicitly given or discovered file cannot be
/// read or parsed. A missing file during discovery is not an error.
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<GridwellConfig> {
    let config_file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    let mut config = match config_file {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        None => GridwellConfig::default(),
    };

    apply_environment_overrides(&mut config);
    Ok(config)
}

/// Apply environment variable overrides to configuration.
///
/// Supported environment variables:
/// - `GRIDWELL_GRID_WIDTH` / `GRIDWELL_GRID_HEIGHT` -> `grid.width` / `grid.height`
/// - `GRIDWELL_DWELL_TIMEOUT_MS` -> `engine.dwell_timeout_ms`
/// - `GRIDWELL_DEDUP_WINDOW` -> `engine.dedup_window`
/// - `GRIDWELL_SWEEP_INTERVAL_MS` -> `engine.sweep_interval_ms`
/// - `GRIDWELL_BATCH_SIZE` -> `engine.batch_size`
/// - `GRIDWELL_MOVE_EVENT_MIN_INTERVAL_MS` -> `engine.move_event_min_interval_ms`
/// - `GRIDWELL_STATE_TTL_SECS` -> `store.state_ttl_secs`
/// - `GRIDWELL_RECENT_EVENTS_CAPACITY` -> `store.recent_events_capacity`
/// - `GRIDWELL_TIMELINE_CAP` -> `store.timeline_cap`
/// - `GRIDWELL_API_HOST` / `GRIDWELL_API_PORT` -> `api.host` / `api.port`
/// - `GRIDWELL_REQUEST_TIMEOUT_SECS` -> `api.request_timeout_secs`
/// - `GRIDWELL_DEDUCT_DELETED_SPANS` -> `feedback.deduct_deleted_spans`
/// - `GRIDWELL_LOG_LEVEL` / `GRIDWELL_LOG_DIR` -> `logging.level` / `logging.dir`
pub fn apply_environment_overrides(config: &mut GridwellConfig) {
    if let Ok(value) = env::var("GRIDWELL_GRID_WIDTH") {
        if let Ok(v) = value.parse::<u8>() {
            config.grid.width = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_GRID_HEIGHT") {
        if let Ok(v) = value.parse::<u8>() {
            config.grid.height = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_DWELL_TIMEOUT_MS") {
        if let Ok(v) = value.parse::<u64>() {
            config.engine.dwell_timeout_ms = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_DEDUP_WINDOW") {
        if let Ok(v) = value.parse::<usize>() {
            config.engine.dedup_window = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_SWEEP_INTERVAL_MS") {
        if let Ok(v) = value.parse::<u64>() {
            config.engine.sweep_interval_ms = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_BATCH_SIZE") {
        if let Ok(v) = value.parse::<usize>() {
            config.engine.batch_size = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_MOVE_EVENT_MIN_INTERVAL_MS") {
        if let Ok(v) = value.parse::<u64>() {
            config.engine.move_event_min_interval_ms = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_STATE_TTL_SECS") {
        if let Ok(v) = value.parse::<u64>() {
            config.store.state_ttl_secs = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_RECENT_EVENTS_CAPACITY") {
        if let Ok(v) = value.parse::<usize>() {
            config.store.recent_events_capacity = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_TIMELINE_CAP") {
        if let Ok(v) = value.parse::<usize>() {
            config.store.timeline_cap = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_API_HOST") {
        config.api.host = value;
    }
    if let Ok(value) = env::var("GRIDWELL_API_PORT") {
        if let Ok(v) = value.parse::<u16>() {
            config.api.port = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_REQUEST_TIMEOUT_SECS") {
        if let Ok(v) = value.parse::<u64>() {
            config.api.request_timeout_secs = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_DEDUCT_DELETED_SPANS") {
        if let Ok(v) = value.parse::<bool>() {
            config.feedback.deduct_deleted_spans = v;
        }
    }
    if let Ok(value) = env::var("GRIDWELL_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("GRIDWELL_LOG_DIR") {
        config.logging.dir = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml_over_defaults() {
        let content = r#"
            [grid]
            width = 10

            [engine]
            dwell_timeout_ms = 5000
        "#;
        let config: GridwellConfig = toml::from_str(content).unwrap();
        assert_eq!(config.grid.width, 10);
        assert_eq!(config.grid.height, 15); // default survives
        assert_eq!(config.engine.dwell_timeout_ms, 5000);
        assert_eq!(config.engine.dedup_window, 10_000);
    }

    #[test]
    fn environment_overrides_take_effect() {
        // Serialized via distinct var names to avoid cross-test races.
        std::env::set_var("GRIDWELL_DWELL_TIMEOUT_MS", "12000");
        std::env::set_var("GRIDWELL_API_PORT", "9100");
        let mut config = GridwellConfig::default();
        apply_environment_overrides(&mut config);
        assert_eq!(config.engine.dwell_timeout_ms, 12_000);
        assert_eq!(config.api.port, 9100);
        std::env::remove_var("GRIDWELL_DWELL_TIMEOUT_MS");
        std::env::remove_var("GRIDWELL_API_PORT");
    }

    #[test]
    fn unparseable_override_is_ignored() {
        std::env::set_var("GRIDWELL_GRID_WIDTH", "not-a-number");
        let mut config = GridwellConfig::default();
        apply_environment_overrides(&mut config);
        assert_eq!(config.grid.width, 20);
        std::env::remove_var("GRIDWELL_GRID_WIDTH");
    }
}
