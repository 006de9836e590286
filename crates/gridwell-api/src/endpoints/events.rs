// Recent events endpoint (transport-agnostic)

use std::sync::Arc;

use gridwell_services::QueryService;
use gridwell_types::DwellResult;

use crate::v1::RecentEventV1;

/// Default and maximum live-feed page sizes.
const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

/// The cross-stream live feed, newest-first.
pub async fn recent_events(
    query_service: Arc<dyn QueryService>,
    limit: Option<usize>,
) -> DwellResult<Vec<RecentEventV1>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    let events = query_service.recent_events(limit).await?;
    Ok(events.into_iter().map(Into::into).collect())
}
