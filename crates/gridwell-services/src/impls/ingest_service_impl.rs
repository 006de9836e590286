/*!
Ingest service implementation.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use gridwell_engine::EngineCounters;
use gridwell_ingest::{DetectionPayload, IngressQueue, Normalizer};
use gridwell_types::DwellResult;

use crate::traits::IngestService;
use crate::types::FrameAck;

/// Default implementation of [`IngestService`]: validate, explode, enqueue.
pub struct IngestServiceImpl {
    normalizer: Normalizer,
    queue: Arc<IngressQueue>,
    counters: Arc<EngineCounters>,
}

impl IngestServiceImpl {
    pub fn new(
        normalizer: Normalizer,
        queue: Arc<IngressQueue>,
        counters: Arc<EngineCounters>,
    ) -> Self {
        Self {
            normalizer,
            queue,
            counters,
        }
    }
}

#[async_trait]
impl IngestService for IngestServiceImpl {
    async fn ingest_frame(&self, payload: &DetectionPayload) -> DwellResult<FrameAck> {
        let frame = match self.normalizer.normalize_frame(payload) {
            Ok(frame) => frame,
            Err(err) => {
                EngineCounters::bump(&self.counters.frames_rejected);
                return Err(err);
            }
        };

        EngineCounters::bump(&self.counters.frames_accepted);
        EngineCounters::add(&self.counters.objects_dropped, frame.objects_dropped as u64);

        let enqueued = frame.observations.len();
        self.queue.publish_all(frame.observations);

        debug!(
            frame_id = %frame.frame_id,
            enqueued,
            dropped = frame.objects_dropped,
            "frame ingested"
        );
        Ok(FrameAck {
            frame_id: frame.frame_id,
            objects_enqueued: enqueued,
            objects_dropped: frame.objects_dropped,
        })
    }
}
