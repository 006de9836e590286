// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Gridwell Configuration System
//!
//! Type-safe configuration for the gridwell service with support for:
//! - TOML file parsing (`gridwell_configuration.toml`)
//! - Environment variable overrides (`GRIDWELL_*`)
//! - Startup validation
//!
//! The configuration file is optional; every setting carries a built-in
//! default. Overrides are applied in order: file, then environment.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gridwell_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("API port: {}", config.api.port);
//! println!("Grid: {}x{}", config.grid.width, config.grid.height);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
