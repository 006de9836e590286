/*!
Feedback service implementation.

Each operation runs under the store's per-object lock and orders writes
state -> aggregates -> timeline -> audit, so a midway failure leaves
inflated or stale aggregates at worst, never a broken invariant. Recovery
is by reissuing the operation.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use ahash::AHashMap;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use gridwell_store::StateStore;
use gridwell_types::{
    DwellError, DwellResult, EpochMs, FeedbackAuditEntry, GridCellId, GridDimensions, ObjectKey,
    TimelineEntry, TimelineEntryKind,
};

use crate::traits::FeedbackService;
use crate::types::{CorrectCellParams, DeleteSpanParams, FeedbackAck, RelabelParams};

/// Default implementation of [`FeedbackService`].
pub struct FeedbackServiceImpl {
    store: Arc<dyn StateStore>,
    grid: GridDimensions,
    deduct_deleted_spans: bool,
}

impl FeedbackServiceImpl {
    pub fn new(store: Arc<dyn StateStore>, grid: GridDimensions, deduct_deleted_spans: bool) -> Self {
        Self {
            store,
            grid,
            deduct_deleted_spans,
        }
    }
}

#[async_trait]
impl FeedbackService for FeedbackServiceImpl {
    async fn relabel(&self, params: RelabelParams, now_ms: EpochMs) -> DwellResult<FeedbackAck> {
        debug!(old = %params.old_object_id, new = %params.new_object_id, "relabel requested");

        let old_key = ObjectKey::new(
            params.collector_id.clone(),
            params.camera_id.clone(),
            params.old_object_id.clone(),
        );
        let new_key = old_key.sibling(params.new_object_id.clone());
        if old_key == new_key {
            return Err(DwellError::conflict("ObjectState", params.new_object_id.as_str()));
        }

        // Both objects lock in id order; concurrent opposing relabels
        // cannot deadlock.
        let (first, second) = if old_key.object_id <= new_key.object_id {
            (&old_key, &new_key)
        } else {
            (&new_key, &old_key)
        };
        let _guard_first = self.store.locks().acquire(first).await;
        let _guard_second = self.store.locks().acquire(second).await;

        let state = self
            .store
            .get_object_state(&old_key)
            .await?
            .ok_or_else(|| DwellError::not_found("ObjectState", params.old_object_id.as_str()))?;

        if self.store.get_object_state(&new_key).await?.is_some() {
            return Err(DwellError::conflict("ObjectState", params.new_object_id.as_str()));
        }

        // State first.
        self.store.put_object_state(&new_key, &state).await?;
        self.store.delete_object_state(&old_key).await?;

        // Aggregates: the old id loses its entire footprint to the new id,
        // and the open span (closed at now, the user action being the
        // recorded event) lands on the current cell.
        let partition = old_key.partition();
        self.store
            .rename_contributor(&partition, &old_key.object_id, &new_key.object_id)
            .await?;
        if let (Some(cell), Some(enter_ts)) = (&state.current_cell, state.enter_ts_ms) {
            let open_dwell = (now_ms - enter_ts).max(0) as u64;
            self.store
                .add_contribution(&partition, cell, &new_key.object_id, open_dwell)
                .await?;
        }

        // Timeline moves wholesale, newest-first order preserved.
        let timeline = self.store.take_timeline(&old_key).await?;
        self.store.splice_timeline(&new_key, timeline).await?;

        self.store
            .append_audit(FeedbackAuditEntry::new(
                "relabel",
                json!({
                    "collector_id": params.collector_id,
                    "camera_id": params.camera_id,
                    "old_object_id": params.old_object_id,
                    "new_object_id": params.new_object_id.clone(),
                }),
                now_ms,
            ))
            .await?;

        info!(new = %params.new_object_id, "relabel applied");
        Ok(FeedbackAck::applied("relabel", params.new_object_id))
    }

    async fn correct_cell(
        &self,
        params: CorrectCellParams,
        now_ms: EpochMs,
    ) -> DwellResult<FeedbackAck> {
        let correct_cell = GridCellId::parse(&params.correct_cell_id, &self.grid)?;
        let key = ObjectKey::new(
            params.collector_id.clone(),
            params.camera_id.clone(),
            params.object_id.clone(),
        );
        let _guard = self.store.locks().acquire(&key).await;

        let mut state = self
            .store
            .get_object_state(&key)
            .await?
            .ok_or_else(|| DwellError::not_found("ObjectState", params.object_id.as_str()))?;

        if state.current_cell.as_ref() == Some(&correct_cell) {
            return Ok(FeedbackAck::no_change("correct_cell", params.object_id));
        }

        let original = state.current_cell.clone();
        let original_enter = state.enter_ts_ms;

        // State first; accumulated_ms is deliberately untouched.
        state.current_cell = Some(correct_cell.clone());
        state.enter_ts_ms = Some(params.frame_ts_ms);
        state.last_seen_ts_ms = params.frame_ts_ms;
        self.store.put_object_state(&key, &state).await?;

        // The misattributed cell loses this object's contribution.
        let partition = key.partition();
        if let Some(original_cell) = &original {
            self.store
                .remove_contribution(&partition, original_cell, &key.object_id)
                .await?;
            self.store
                .prepend_timeline(
                    &key,
                    TimelineEntry::correct(
                        original_cell.as_str(),
                        original_enter.unwrap_or(params.frame_ts_ms),
                        params.frame_ts_ms,
                    )
                    .with_meta("original", original_cell.as_str())
                    .with_meta("corrected", correct_cell.as_str()),
                )
                .await?;
        }

        self.store
            .prepend_timeline(
                &key,
                TimelineEntry::enter(correct_cell.as_str(), params.frame_ts_ms)
                    .with_meta("reason", "correction"),
            )
            .await?;

        self.store
            .append_audit(FeedbackAuditEntry::new(
                "correct_cell",
                json!({
                    "collector_id": params.collector_id,
                    "camera_id": params.camera_id,
                    "object_id": params.object_id.clone(),
                    "frame_ts_ms": params.frame_ts_ms,
                    "correct_cell_id": params.correct_cell_id,
                }),
                now_ms,
            ))
            .await?;

        info!(object = %params.object_id, cell = %correct_cell, "cell corrected");
        Ok(FeedbackAck::applied("correct_cell", params.object_id))
    }

    async fn delete_span(
        &self,
        params: DeleteSpanParams,
        now_ms: EpochMs,
    ) -> DwellResult<FeedbackAck> {
        if params.from_ts_ms >= params.to_ts_ms {
            return Err(DwellError::InvalidSpan {
                from: params.from_ts_ms,
                to: params.to_ts_ms,
            });
        }

        let key = ObjectKey::new(
            params.collector_id.clone(),
            params.camera_id.clone(),
            params.object_id.clone(),
        );
        let _guard = self.store.locks().acquire(&key).await;

        if self.deduct_deleted_spans {
            self.deduct_overlapping_spans(&key, params.from_ts_ms, params.to_ts_ms)
                .await?;
        }

        let duration_ms = (params.to_ts_ms - params.from_ts_ms) as u64;
        self.store
            .prepend_timeline(
                &key,
                TimelineEntry::delete(params.from_ts_ms, params.to_ts_ms)
                    .with_meta("reason", "false_positive_removal")
                    .with_meta("duration_ms", duration_ms.to_string()),
            )
            .await?;

        self.store
            .append_audit(FeedbackAuditEntry::new(
                "delete_span",
                json!({
                    "collector_id": params.collector_id,
                    "camera_id": params.camera_id,
                    "object_id": params.object_id.clone(),
                    "from_ts_ms": params.from_ts_ms,
                    "to_ts_ms": params.to_ts_ms,
                }),
                now_ms,
            ))
            .await?;

        info!(object = %params.object_id, duration_ms, "span deleted");
        Ok(FeedbackAck::applied("delete_span", params.object_id))
    }
}

impl FeedbackServiceImpl {
    /// Best-effort aggregate deduction for the opt-in deletion policy: each
    /// closed `leave` overlapping the deleted span gives back its overlap,
    /// clamped to the object's remaining contribution.
    async fn deduct_overlapping_spans(
        &self,
        key: &ObjectKey,
        from_ts_ms: EpochMs,
        to_ts_ms: EpochMs,
    ) -> DwellResult<()> {
        let timeline = self.store.read_timeline(key, usize::MAX).await?;

        let mut overlap_by_cell: AHashMap<String, u64> = AHashMap::new();
        for entry in &timeline {
            if entry.kind != TimelineEntryKind::Leave {
                continue;
            }
            let Some(entry_to) = entry.to_ts_ms else {
                continue;
            };
            let overlap = entry_to.min(to_ts_ms) - entry.from_ts_ms.max(from_ts_ms);
            if overlap > 0 {
                *overlap_by_cell.entry(entry.cell_id.clone()).or_insert(0) += overlap as u64;
            }
        }

        let partition = key.partition();
        for (cell_id, overlap) in overlap_by_cell {
            let Ok(cell) = GridCellId::parse(&cell_id, &self.grid) else {
                continue;
            };
            let Some(aggregate) = self.store.get_aggregate(&partition, &cell).await? else {
                continue;
            };
            let Some(&current) = aggregate.contributions.get(&key.object_id) else {
                continue;
            };
            let remaining = current.saturating_sub(overlap);
            self.store
                .remove_contribution(&partition, &cell, &key.object_id)
                .await?;
            if remaining > 0 {
                self.store
                    .add_contribution(&partition, &cell, &key.object_id, remaining)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwell_store::{MemoryStore, StoreSettings};
    use gridwell_types::{ObjectState, PartitionKey};

    fn service(store: Arc<MemoryStore>, deduct: bool) -> FeedbackServiceImpl {
        FeedbackServiceImpl::new(store, GridDimensions::default(), deduct)
    }

    fn relabel_params(old: &str, new: &str) -> RelabelParams {
        RelabelParams {
            collector_id: "col".to_string(),
            camera_id: "cam".to_string(),
            old_object_id: old.to_string(),
            new_object_id: new.to_string(),
        }
    }

    #[tokio::test]
    async fn relabel_unknown_object_is_not_found() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let result = service(store, false)
            .relabel(relabel_params("ghost", "B"), 5000)
            .await;
        assert!(matches!(result, Err(DwellError::NotFound { .. })));
    }

    #[tokio::test]
    async fn relabel_onto_existing_object_is_a_conflict() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        for object in ["A", "B"] {
            store
                .put_object_state(
                    &ObjectKey::new("col", "cam", object),
                    &ObjectState::first_sighting(GridCellId::from_xy(0, 0), 1000),
                )
                .await
                .unwrap();
        }
        let result = service(store, false)
            .relabel(relabel_params("A", "B"), 5000)
            .await;
        assert!(matches!(result, Err(DwellError::Conflict { .. })));
    }

    #[tokio::test]
    async fn correct_cell_to_same_cell_is_no_change() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        store
            .put_object_state(
                &ObjectKey::new("col", "cam", "A"),
                &ObjectState::first_sighting(GridCellId::from_xy(5, 8), 1000),
            )
            .await
            .unwrap();

        let ack = service(store.clone(), false)
            .correct_cell(
                CorrectCellParams {
                    collector_id: "col".to_string(),
                    camera_id: "cam".to_string(),
                    object_id: "A".to_string(),
                    frame_ts_ms: 2000,
                    correct_cell_id: "G_05_08".to_string(),
                },
                5000,
            )
            .await
            .unwrap();
        assert_eq!(ack.status, crate::types::FeedbackStatus::NoChange);

        // Nothing moved.
        let state = store
            .get_object_state(&ObjectKey::new("col", "cam", "A"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state.enter_ts_ms, Some(1000));
    }

    #[tokio::test]
    async fn delete_span_rejects_inverted_spans() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let result = service(store, false)
            .delete_span(
                DeleteSpanParams {
                    collector_id: "col".to_string(),
                    camera_id: "cam".to_string(),
                    object_id: "A".to_string(),
                    from_ts_ms: 5000,
                    to_ts_ms: 5000,
                },
                6000,
            )
            .await;
        assert!(matches!(result, Err(DwellError::InvalidSpan { .. })));
    }

    #[tokio::test]
    async fn delete_span_is_audit_only_by_default() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let partition = PartitionKey::new("col", "cam");
        let cell = GridCellId::from_xy(5, 8);
        store
            .add_contribution(&partition, &cell, "A", 1500)
            .await
            .unwrap();
        let key = ObjectKey::new("col", "cam", "A");
        store
            .prepend_timeline(&key, TimelineEntry::leave("G_05_08", 1000, 2500))
            .await
            .unwrap();

        service(store.clone(), false)
            .delete_span(
                DeleteSpanParams {
                    collector_id: "col".to_string(),
                    camera_id: "cam".to_string(),
                    object_id: "A".to_string(),
                    from_ts_ms: 1000,
                    to_ts_ms: 2500,
                },
                6000,
            )
            .await
            .unwrap();

        // Aggregate untouched; timeline and audit record the deletion.
        let aggregate = store.get_aggregate(&partition, &cell).await.unwrap().unwrap();
        assert_eq!(aggregate.contributions["A"], 1500);

        let timeline = store.read_timeline(&key, 10).await.unwrap();
        assert_eq!(timeline[0].kind, TimelineEntryKind::Delete);
        assert_eq!(timeline[0].cell_id, "deleted");
        assert_eq!(
            timeline[0].meta.get("duration_ms").map(String::as_str),
            Some("1500")
        );
        assert_eq!(store.read_audit(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_span_deducts_when_policy_enabled() {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let partition = PartitionKey::new("col", "cam");
        let cell = GridCellId::from_xy(5, 8);
        store
            .add_contribution(&partition, &cell, "A", 1500)
            .await
            .unwrap();
        let key = ObjectKey::new("col", "cam", "A");
        store
            .prepend_timeline(&key, TimelineEntry::leave("G_05_08", 1000, 2500))
            .await
            .unwrap();

        service(store.clone(), true)
            .delete_span(
                DeleteSpanParams {
                    collector_id: "col".to_string(),
                    camera_id: "cam".to_string(),
                    object_id: "A".to_string(),
                    from_ts_ms: 1500,
                    to_ts_ms: 2500,
                },
                6000,
            )
            .await
            .unwrap();

        // One second of the 1500 ms span overlapped the deletion.
        let aggregate = store.get_aggregate(&partition, &cell).await.unwrap().unwrap();
        assert_eq!(aggregate.contributions["A"], 500);
    }
}
