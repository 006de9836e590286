// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Service-layer DTOs.

pub mod dtos;

pub use dtos::*;
