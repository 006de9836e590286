// Feedback endpoints (transport-agnostic)
//
// The wall clock is sampled here, at the transport boundary: a relabel
// closes the open span at the moment of the user action, and the core
// stays clock-free for deterministic replay.

use std::sync::Arc;

use gridwell_services::{
    CorrectCellParams, DeleteSpanParams, FeedbackService, RelabelParams,
};
use gridwell_types::{epoch_ms_now, DwellResult};

use crate::v1::{
    CorrectCellRequestV1, DeleteSpanRequestV1, FeedbackAckResponseV1, RelabelRequestV1,
};

/// Reassign an object's identity.
pub async fn relabel(
    feedback_service: Arc<dyn FeedbackService>,
    request: RelabelRequestV1,
) -> DwellResult<FeedbackAckResponseV1> {
    let ack = feedback_service
        .relabel(
            RelabelParams {
                collector_id: request.collector_id,
                camera_id: request.camera_id,
                old_object_id: request.old_object_id,
                new_object_id: request.new_object_id,
            },
            epoch_ms_now(),
        )
        .await?;
    Ok(ack.into())
}

/// Move an object to its correct cell.
pub async fn correct_cell(
    feedback_service: Arc<dyn FeedbackService>,
    request: CorrectCellRequestV1,
) -> DwellResult<FeedbackAckResponseV1> {
    let ack = feedback_service
        .correct_cell(
            CorrectCellParams {
                collector_id: request.collector_id,
                camera_id: request.camera_id,
                object_id: request.object_id,
                frame_ts_ms: request.frame_ts_ms,
                correct_cell_id: request.correct_cell_id,
            },
            epoch_ms_now(),
        )
        .await?;
    Ok(ack.into())
}

/// Record a span as a false positive.
pub async fn delete_span(
    feedback_service: Arc<dyn FeedbackService>,
    request: DeleteSpanRequestV1,
) -> DwellResult<FeedbackAckResponseV1> {
    let ack = feedback_service
        .delete_span(
            DeleteSpanParams {
                collector_id: request.collector_id,
                camera_id: request.camera_id,
                object_id: request.object_id,
                from_ts_ms: request.from_ts_ms,
                to_ts_ms: request.to_ts_ms,
            },
            epoch_ms_now(),
        )
        .await?;
    Ok(ack.into())
}
