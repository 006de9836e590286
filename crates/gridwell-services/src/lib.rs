// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Gridwell Service Layer

The stable application boundary: transport-agnostic service interfaces used
by any adapter (REST API today, queue-driven application later).

```text
┌──────────────────────────────────────────────────────┐
│                TRANSPORT ADAPTERS                    │
│  gridwell-api (Axum/REST)                            │
└───────────────────────────┬──────────────────────────┘
                            ↓
┌──────────────────────────────────────────────────────┐
│             SERVICE LAYER (this crate)               │
│  • IngestService    - frame validation + enqueue     │
│  • FeedbackService  - relabel / correct / delete     │
│  • QueryService     - stats, heatmap, detail, feed   │
└───────────────────────────┬──────────────────────────┘
                            ↓
┌──────────────────────────────────────────────────────┐
│                   DOMAIN LAYER                       │
│  gridwell-engine, gridwell-store, gridwell-ingest    │
└──────────────────────────────────────────────────────┘
```

Services know nothing about HTTP. Parameters and returns are plain DTOs;
failures are `gridwell_types::DwellError` and adapters map the stable
error codes to their transport.

Feedback operations are atomic end-to-end: each runs under the store's
per-object lock and orders writes state → aggregates → timeline → audit so
a midway failure leaves no broken invariant.
*/

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod impls;
pub mod traits;
pub mod types;

pub use impls::{FeedbackServiceImpl, IngestServiceImpl, QueryServiceImpl};
pub use traits::{FeedbackService, IngestService, QueryService};
pub use types::*;
