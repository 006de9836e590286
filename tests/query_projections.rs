// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the read projections over engine-built state.

use std::sync::Arc;

use gridwell_engine::{DwellEngine, EngineCounters, EngineSettings};
use gridwell_services::{QueryService, QueryServiceImpl};
use gridwell_store::{MemoryStore, StoreSettings};
use gridwell_types::{
    DwellError, GridCellId, GridDimensions, ObjectKey, Observation, PartitionKey, RecentEventKind,
};

fn obs(object: &str, cell: &str, ts_ms: i64) -> Observation {
    Observation {
        event_id: format!("{object}@{ts_ms}"),
        collector_id: "col".to_string(),
        camera_id: "cam".to_string(),
        object_id: object.to_string(),
        grid_cell_id: GridCellId::parse(cell, &GridDimensions::default()).unwrap(),
        ts_ms,
    }
}

fn partition() -> PartitionKey {
    PartitionKey::new("col", "cam")
}

/// Two objects: A closed 3000 ms in G_05_08 and sits in G_06_08; B closed
/// 1000 ms in G_06_08 and sits in G_02_02.
async fn seeded() -> (Arc<MemoryStore>, QueryServiceImpl) {
    let store = Arc::new(MemoryStore::new(StoreSettings::default()));
    let counters = Arc::new(EngineCounters::new());
    let mut engine = DwellEngine::new(store.clone(), counters, EngineSettings::default());

    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 4000)).await.unwrap();
    engine.process(&obs("B", "G_06_08", 2000)).await.unwrap();
    engine.process(&obs("B", "G_02_02", 3000)).await.unwrap();

    let query = QueryServiceImpl::new(store.clone(), GridDimensions::default());
    (store, query)
}

#[tokio::test]
async fn cell_stats_sorted_by_total_dwell_desc() {
    let (_store, query) = seeded().await;
    let stats = query.cell_stats(&partition(), None).await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].grid_cell_id, "G_05_08");
    assert_eq!(stats[0].total_dwell_ms, 3000);
    assert_eq!(stats[0].object_count, 1);
    assert_eq!(stats[1].grid_cell_id, "G_06_08");
    assert_eq!(stats[1].total_dwell_ms, 1000);
}

#[tokio::test]
async fn heatmap_intensity_stays_in_unit_range_with_hottest_at_one() {
    let (_store, query) = seeded().await;
    let heatmap = query.heatmap(&partition(), 60_000).await.unwrap();

    assert!(!heatmap.cells.is_empty());
    for cell in &heatmap.cells {
        assert!((0.0..=1.0).contains(&cell.intensity), "{:?}", cell);
    }

    let hottest = heatmap
        .cells
        .iter()
        .max_by_key(|c| c.dwell_ms)
        .unwrap();
    assert_eq!(hottest.grid_cell_id, "G_05_08");
    assert_eq!(hottest.intensity, 1.0);
    assert_eq!((hottest.x, hottest.y), (5, 8));
}

#[tokio::test]
async fn heatmap_zero_window_reserved_and_empty() {
    let (_store, query) = seeded().await;
    let heatmap = query.heatmap(&partition(), 0).await.unwrap();
    assert!(heatmap.cells.is_empty());
}

#[tokio::test]
async fn active_objects_lists_only_open_spans() {
    let (store, query) = seeded().await;

    let active = query.active_objects(&partition()).await.unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].object_id, "A");
    assert_eq!(active[1].object_id, "B");

    // Close A via the sweeper and it drops from the active list.
    let counters = Arc::new(EngineCounters::new());
    let sweeper = gridwell_engine::TimeoutSweeper::new(store, counters, 30_000);
    sweeper.sweep_at(100_000).await.unwrap();

    let active = query.active_objects(&partition()).await.unwrap();
    assert!(active.is_empty());
}

#[tokio::test]
async fn object_detail_returns_state_and_newest_first_timeline() {
    let (_store, query) = seeded().await;
    let detail = query
        .object_detail(&ObjectKey::new("col", "cam", "A"), 100)
        .await
        .unwrap();

    assert_eq!(
        detail.state.current_cell.as_ref().map(|c| c.as_str()),
        Some("G_06_08")
    );
    assert_eq!(detail.timeline.len(), 3);
    assert!(detail.timeline[0].from_ts_ms >= detail.timeline[1].from_ts_ms);

    let missing = query
        .object_detail(&ObjectKey::new("col", "cam", "nobody"), 100)
        .await;
    assert!(matches!(missing, Err(DwellError::NotFound { .. })));
}

#[tokio::test]
async fn recent_events_newest_first_with_limit() {
    let (_store, query) = seeded().await;

    let all = query.recent_events(100).await.unwrap();
    assert!(all.len() >= 4);
    // Feed order reflects arrival: B's enter into G_02_02 came last.
    assert_eq!(all[0].kind, RecentEventKind::Enter);
    assert_eq!(all[0].grid_cell_id, "G_02_02");

    let limited = query.recent_events(2).await.unwrap();
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[0].grid_cell_id, all[0].grid_cell_id);
}
