/*!
Query service implementation.

Read-through projections over the state store; no caches are kept in
process, so queries always observe the engine's latest writes.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use gridwell_store::StateStore;
use gridwell_types::{
    CellAggregate, DwellError, DwellResult, GridCellId, GridDimensions, ObjectKey, PartitionKey,
    RecentEvent,
};

use crate::traits::QueryService;
use crate::types::{ActiveObject, CellStats, Heatmap, HeatmapCell, ObjectDetail};

/// Default implementation of [`QueryService`].
pub struct QueryServiceImpl {
    store: Arc<dyn StateStore>,
    grid: GridDimensions,
}

impl QueryServiceImpl {
    pub fn new(store: Arc<dyn StateStore>, grid: GridDimensions) -> Self {
        Self { store, grid }
    }

    fn stats_from(aggregate: &CellAggregate) -> CellStats {
        CellStats {
            grid_cell_id: aggregate.grid_cell_id.to_string(),
            total_dwell_ms: aggregate.total_dwell_ms(),
            object_count: aggregate.object_count(),
            avg_dwell_ms: aggregate.avg_dwell_ms(),
            max_dwell_ms: aggregate.max_dwell_ms(),
            min_dwell_ms: aggregate.min_dwell_ms(),
        }
    }
}

#[async_trait]
impl QueryService for QueryServiceImpl {
    async fn cell_stats(
        &self,
        partition: &PartitionKey,
        cell: Option<&str>,
    ) -> DwellResult<Vec<CellStats>> {
        debug!(partition = %partition, ?cell, "cell stats query");

        if let Some(raw) = cell {
            let cell = GridCellId::parse(raw, &self.grid)?;
            let aggregate = self
                .store
                .get_aggregate(partition, &cell)
                .await?
                .ok_or_else(|| DwellError::not_found("CellAggregate", raw))?;
            return Ok(vec![Self::stats_from(&aggregate)]);
        }

        let mut stats: Vec<CellStats> = self
            .store
            .list_aggregates(partition)
            .await?
            .iter()
            .map(Self::stats_from)
            .collect();
        stats.sort_by(|a, b| {
            b.total_dwell_ms
                .cmp(&a.total_dwell_ms)
                .then_with(|| a.grid_cell_id.cmp(&b.grid_cell_id))
        });
        Ok(stats)
    }

    async fn object_detail(
        &self,
        key: &ObjectKey,
        timeline_limit: usize,
    ) -> DwellResult<ObjectDetail> {
        let state = self
            .store
            .get_object_state(key)
            .await?
            .ok_or_else(|| DwellError::not_found("ObjectState", key.object_id.as_str()))?;
        let timeline = self.store.read_timeline(key, timeline_limit).await?;
        Ok(ObjectDetail { state, timeline })
    }

    async fn heatmap(&self, partition: &PartitionKey, window_ms: u64) -> DwellResult<Heatmap> {
        // window_ms = 0 is reserved for a future real-time projection.
        if window_ms == 0 {
            return Ok(Heatmap {
                grid_width: self.grid.width,
                grid_height: self.grid.height,
                window_ms,
                cells: Vec::new(),
            });
        }

        let aggregates = self.store.list_aggregates(partition).await?;
        let max_dwell = aggregates
            .iter()
            .map(CellAggregate::total_dwell_ms)
            .max()
            .unwrap_or(0);

        let mut cells: Vec<HeatmapCell> = aggregates
            .iter()
            .map(|aggregate| {
                let dwell = aggregate.total_dwell_ms();
                let intensity = if max_dwell > 0 {
                    dwell as f64 / max_dwell as f64
                } else {
                    0.0
                };
                HeatmapCell {
                    grid_cell_id: aggregate.grid_cell_id.to_string(),
                    x: aggregate.grid_cell_id.x(),
                    y: aggregate.grid_cell_id.y(),
                    dwell_ms: dwell,
                    object_count: aggregate.object_count(),
                    intensity,
                }
            })
            .collect();
        cells.sort_by(|a, b| a.grid_cell_id.cmp(&b.grid_cell_id));

        Ok(Heatmap {
            grid_width: self.grid.width,
            grid_height: self.grid.height,
            window_ms,
            cells,
        })
    }

    async fn active_objects(&self, partition: &PartitionKey) -> DwellResult<Vec<ActiveObject>> {
        let mut objects: Vec<ActiveObject> = self
            .store
            .list_object_states(partition)
            .await?
            .into_iter()
            .filter(|(_, state)| state.is_active())
            .map(|(key, state)| ActiveObject {
                object_id: key.object_id,
                state,
            })
            .collect();
        objects.sort_by(|a, b| a.object_id.cmp(&b.object_id));
        Ok(objects)
    }

    async fn recent_events(&self, limit: usize) -> DwellResult<Vec<RecentEvent>> {
        self.store.read_recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwell_store::{MemoryStore, StoreSettings};

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let part = PartitionKey::new("col", "cam");
        store
            .add_contribution(&part, &GridCellId::from_xy(5, 8), "A", 4000)
            .await
            .unwrap();
        store
            .add_contribution(&part, &GridCellId::from_xy(6, 8), "A", 1000)
            .await
            .unwrap();
        store
            .add_contribution(&part, &GridCellId::from_xy(6, 8), "B", 1000)
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn cell_stats_sorted_by_total_desc() {
        let store = seeded_store().await;
        let service = QueryServiceImpl::new(store, GridDimensions::default());
        let stats = service
            .cell_stats(&PartitionKey::new("col", "cam"), None)
            .await
            .unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].grid_cell_id, "G_05_08");
        assert_eq!(stats[0].total_dwell_ms, 4000);
        assert_eq!(stats[1].grid_cell_id, "G_06_08");
        assert_eq!(stats[1].object_count, 2);
    }

    #[tokio::test]
    async fn single_cell_stats_misses_are_not_found() {
        let store = seeded_store().await;
        let service = QueryServiceImpl::new(store, GridDimensions::default());
        let partition = PartitionKey::new("col", "cam");

        let hit = service
            .cell_stats(&partition, Some("G_05_08"))
            .await
            .unwrap();
        assert_eq!(hit.len(), 1);

        let miss = service.cell_stats(&partition, Some("G_00_00")).await;
        assert!(matches!(miss, Err(DwellError::NotFound { .. })));

        let malformed = service.cell_stats(&partition, Some("nope")).await;
        assert!(matches!(malformed, Err(DwellError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn heatmap_normalizes_intensity_to_unit_range() {
        let store = seeded_store().await;
        let service = QueryServiceImpl::new(store, GridDimensions::default());
        let heatmap = service
            .heatmap(&PartitionKey::new("col", "cam"), 60_000)
            .await
            .unwrap();

        assert_eq!(heatmap.grid_width, 20);
        assert_eq!(heatmap.cells.len(), 2);
        assert!(heatmap
            .cells
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.intensity)));

        let max_cell = heatmap
            .cells
            .iter()
            .max_by_key(|c| c.dwell_ms)
            .unwrap();
        assert_eq!(max_cell.grid_cell_id, "G_05_08");
        assert_eq!(max_cell.intensity, 1.0);
        assert_eq!(max_cell.x, 5);
        assert_eq!(max_cell.y, 8);
    }

    #[tokio::test]
    async fn zero_window_heatmap_is_empty() {
        let store = seeded_store().await;
        let service = QueryServiceImpl::new(store, GridDimensions::default());
        let heatmap = service
            .heatmap(&PartitionKey::new("col", "cam"), 0)
            .await
            .unwrap();
        assert!(heatmap.cells.is_empty());
        assert_eq!(heatmap.window_ms, 0);
    }

    #[tokio::test]
    async fn object_detail_requires_state() {
        let store = seeded_store().await;
        let service = QueryServiceImpl::new(store, GridDimensions::default());
        let missing = service
            .object_detail(&ObjectKey::new("col", "cam", "ghost"), 10)
            .await;
        assert!(matches!(missing, Err(DwellError::NotFound { .. })));
    }
}
