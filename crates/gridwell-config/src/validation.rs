// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation.
//!
//! Checks value ranges and cross-field consistency before startup; a
//! failing validation aborts the process with every violation listed.

use crate::{ConfigError, ConfigResult, GridwellConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    InvalidPortRange { port: u16 },
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPortRange { port } => {
                write!(f, "api.port = {} is outside valid range (1024-65535)", port)
            }
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration.
///
/// Checks:
/// - API port range and host presence
/// - Grid dimensions (nonzero, expressible as two-digit coordinates)
/// - Positive timeouts, intervals, and capacities
pub fn validate_config(config: &GridwellConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    if config.api.port < 1024 {
        errors.push(ConfigValidationError::InvalidPortRange {
            port: config.api.port,
        });
    }
    if config.api.host.is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "api.host".to_string(),
        });
    }
    if config.api.request_timeout_secs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "api.request_timeout_secs".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    // Cell ids carry two-digit coordinates, so either dimension tops out at 100.
    for (field, value) in [
        ("grid.width", config.grid.width),
        ("grid.height", config.grid.height),
    ] {
        if value == 0 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if value > 100 {
            errors.push(ConfigValidationError::InvalidValue {
                field: field.to_string(),
                reason: "must not exceed 100 (two-digit cell coordinates)".to_string(),
            });
        }
    }

    if config.engine.dwell_timeout_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.dwell_timeout_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.engine.sweep_interval_ms == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.sweep_interval_ms".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.engine.dedup_window == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.dedup_window".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.engine.batch_size == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "engine.batch_size".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if config.store.state_ttl_secs == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "store.state_ttl_secs".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.store.recent_events_capacity == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "store.recent_events_capacity".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if config.store.timeline_cap == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "store.timeline_cap".to_string(),
            reason: "must be positive".to_string(),
        });
    }

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridwellConfig;

    #[test]
    fn default_config_is_valid() {
        let config = GridwellConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn low_port_is_rejected() {
        let mut config = GridwellConfig::default();
        config.api.port = 80;

        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("1024-65535"));
        }
    }

    #[test]
    fn zero_grid_dimension_is_rejected() {
        let mut config = GridwellConfig::default();
        config.grid.width = 0;

        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("grid.width"));
        }
    }

    #[test]
    fn oversized_grid_dimension_is_rejected() {
        let mut config = GridwellConfig::default();
        config.grid.height = 120;

        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("grid.height"));
            assert!(msg.contains("two-digit"));
        }
    }

    #[test]
    fn multiple_violations_are_all_reported() {
        let mut config = GridwellConfig::default();
        config.engine.dwell_timeout_ms = 0;
        config.store.timeline_cap = 0;
        config.api.host = String::new();

        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("engine.dwell_timeout_ms"));
            assert!(msg.contains("store.timeline_cap"));
            assert!(msg.contains("api.host"));
        }
    }
}
