// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Service trait definitions.

pub mod feedback_service;
pub mod ingest_service;
pub mod query_service;

pub use feedback_service::FeedbackService;
pub use ingest_service::IngestService;
pub use query_service::QueryService;
