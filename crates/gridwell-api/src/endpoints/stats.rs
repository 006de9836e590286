// Cell statistics endpoint (transport-agnostic)

use std::sync::Arc;

use gridwell_services::QueryService;
use gridwell_types::{DwellResult, PartitionKey};

use crate::v1::CellStatsResponseV1;

/// Aggregates for one partition, sorted by total dwell descending;
/// optionally narrowed to one cell.
pub async fn cell_stats(
    query_service: Arc<dyn QueryService>,
    collector_id: &str,
    camera_id: &str,
    cell: Option<&str>,
) -> DwellResult<Vec<CellStatsResponseV1>> {
    let partition = PartitionKey::new(collector_id, camera_id);
    let stats = query_service.cell_stats(&partition, cell).await?;
    Ok(stats.into_iter().map(Into::into).collect())
}
