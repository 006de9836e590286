/*!
Ingest service trait.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use async_trait::async_trait;

use gridwell_ingest::DetectionPayload;
use gridwell_types::DwellResult;

use crate::types::FrameAck;

/// Frame ingestion (transport-agnostic).
#[async_trait]
pub trait IngestService: Send + Sync {
    /// Validate a frame, explode it into observations, and enqueue them.
    ///
    /// # Errors
    /// * `DwellError::InvalidPayload` - frame-level schema violation
    async fn ingest_frame(&self, payload: &DetectionPayload) -> DwellResult<FrameAck>;
}
