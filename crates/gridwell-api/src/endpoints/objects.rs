// Object detail and active-objects endpoints (transport-agnostic)

use std::sync::Arc;

use gridwell_services::QueryService;
use gridwell_types::{DwellResult, ObjectKey, PartitionKey};

use crate::v1::{ActiveObjectV1, ObjectDetailResponseV1};

/// Default number of timeline entries returned with object detail.
const DETAIL_TIMELINE_LIMIT: usize = 100;

/// Live state plus recent timeline for one object. 404 when unknown.
pub async fn object_detail(
    query_service: Arc<dyn QueryService>,
    collector_id: &str,
    camera_id: &str,
    object_id: &str,
) -> DwellResult<ObjectDetailResponseV1> {
    let key = ObjectKey::new(collector_id, camera_id, object_id);
    let detail = query_service
        .object_detail(&key, DETAIL_TIMELINE_LIMIT)
        .await?;
    Ok(detail.into())
}

/// Objects currently holding an open span in one partition.
pub async fn active_objects(
    query_service: Arc<dyn QueryService>,
    collector_id: &str,
    camera_id: &str,
) -> DwellResult<Vec<ActiveObjectV1>> {
    let partition = PartitionKey::new(collector_id, camera_id);
    let objects = query_service.active_objects(&partition).await?;
    Ok(objects.into_iter().map(Into::into).collect())
}
