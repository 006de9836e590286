// Frame ingestion endpoint (transport-agnostic)

use std::sync::Arc;

use gridwell_services::IngestService;

use crate::v1::{DetectionFrameV1, FrameAckResponseV1};

use gridwell_types::DwellResult;

/// Validate and enqueue one detection frame.
pub async fn ingest_frame(
    ingest_service: Arc<dyn IngestService>,
    frame: DetectionFrameV1,
) -> DwellResult<FrameAckResponseV1> {
    let ack = ingest_service.ingest_frame(&frame.into()).await?;
    Ok(FrameAckResponseV1 {
        status: "accepted".to_string(),
        frame_id: ack.frame_id,
        objects_enqueued: ack.objects_enqueued,
        objects_dropped: ack.objects_dropped,
    })
}
