// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Default service implementations backed by the state store.

pub mod feedback_service_impl;
pub mod ingest_service_impl;
pub mod query_service_impl;

pub use feedback_service_impl::FeedbackServiceImpl;
pub use ingest_service_impl::IngestServiceImpl;
pub use query_service_impl::QueryServiceImpl;
