// Heatmap endpoint (transport-agnostic)

use std::sync::Arc;

use gridwell_services::QueryService;
use gridwell_types::{DwellResult, PartitionKey};

use crate::v1::HeatmapResponseV1;

/// Per-cell dwell intensity projection for one partition.
pub async fn heatmap(
    query_service: Arc<dyn QueryService>,
    collector_id: &str,
    camera_id: &str,
    window_ms: u64,
) -> DwellResult<HeatmapResponseV1> {
    let partition = PartitionKey::new(collector_id, camera_id);
    let heatmap = query_service.heatmap(&partition, window_ms).await?;
    Ok(heatmap.into())
}
