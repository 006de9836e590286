// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Grid geometry and cell identifiers.
//!
//! A cell identifier has the canonical form `G_XX_YY` with zero-padded
//! two-digit coordinates. Coordinates are column-major screen order:
//! X grows rightward, Y grows downward.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DwellError, DwellResult};

static CELL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^G_(\d{2})_(\d{2})$").expect("cell id regex is valid"));

/// Fixed grid dimensions, set once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub width: u8,
    pub height: u8,
}

impl GridDimensions {
    pub const DEFAULT_WIDTH: u8 = 20;
    pub const DEFAULT_HEIGHT: u8 = 15;

    pub fn new(width: u8, height: u8) -> Self {
        Self { width, height }
    }

    /// Total number of cells on the grid.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, x: u8, y: u8) -> bool {
        x < self.width && y < self.height
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

/// A validated grid cell identifier in canonical `G_XX_YY` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridCellId(String);

impl GridCellId {
    /// Parse and bounds-check a raw cell identifier.
    pub fn parse(raw: &str, grid: &GridDimensions) -> DwellResult<Self> {
        let caps = CELL_ID_RE.captures(raw).ok_or_else(|| {
            DwellError::InvalidPayload(format!("malformed grid cell id '{}'", raw))
        })?;
        // The regex guarantees two ASCII digits per group.
        let x: u8 = caps[1].parse().expect("two-digit capture");
        let y: u8 = caps[2].parse().expect("two-digit capture");
        if !grid.contains(x, y) {
            return Err(DwellError::InvalidPayload(format!(
                "grid cell id '{}' outside {}x{} grid",
                raw, grid.width, grid.height
            )));
        }
        Ok(Self(raw.to_string()))
    }

    /// Build a cell id from coordinates already known to be on the grid.
    pub fn from_xy(x: u8, y: u8) -> Self {
        Self(format!("G_{:02}_{:02}", x, y))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn x(&self) -> u8 {
        self.0[2..4].parse().expect("canonical form")
    }

    pub fn y(&self) -> u8 {
        self.0[5..7].parse().expect("canonical form")
    }
}

impl fmt::Display for GridCellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
