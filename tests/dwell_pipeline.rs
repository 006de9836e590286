// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the dwell pipeline.
//!
//! Drives the engine and sweeper directly against the in-memory store (no
//! HTTP layer) through the canonical single-object scenarios: enter,
//! same-cell tick, transition, timeout close, out-of-order rejection, and
//! the replay/idempotence/conservation properties.

use std::sync::Arc;

use gridwell_engine::{
    DwellEngine, EngineCounters, EngineSettings, ProcessOutcome, TimeoutSweeper,
};
use gridwell_store::{MemoryStore, StateStore, StoreSettings};
use gridwell_types::{
    GridCellId, GridDimensions, ObjectKey, Observation, PartitionKey, TimelineEntry,
    TimelineEntryKind,
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

fn cell(raw: &str) -> GridCellId {
    GridCellId::parse(raw, &GridDimensions::default()).unwrap()
}

fn setup() -> (DwellEngine, Arc<MemoryStore>, Arc<EngineCounters>) {
    let store = Arc::new(MemoryStore::new(StoreSettings::default()));
    let counters = Arc::new(EngineCounters::new());
    let engine = DwellEngine::new(store.clone(), counters.clone(), EngineSettings::default());
    (engine, store, counters)
}

fn key_a() -> ObjectKey {
    ObjectKey::new("col", "cam", "A")
}

fn partition() -> PartitionKey {
    PartitionKey::new("col", "cam")
}

// ===== Scenario: single enter =====

#[tokio::test]
async fn single_enter_opens_span_without_aggregate() {
    let (mut engine, store, _) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.current_cell, Some(cell("G_05_08")));
    assert_eq!(state.enter_ts_ms, Some(1000));
    assert_eq!(state.last_seen_ts_ms, 1000);
    assert_eq!(state.accumulated_ms, 0);

    let timeline = store.read_timeline(&key_a(), 10).await.unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].kind, TimelineEntryKind::Enter);
    assert_eq!(timeline[0].cell_id, "G_05_08");
    assert_eq!(timeline[0].from_ts_ms, 1000);
    assert_eq!(timeline[0].to_ts_ms, None);

    // No closed span yet, so no aggregate.
    assert!(store
        .get_aggregate(&partition(), &cell("G_05_08"))
        .await
        .unwrap()
        .is_none());
}

// ===== Scenario: same-cell tick =====

#[tokio::test]
async fn same_cell_tick_only_advances_last_seen() {
    let (mut engine, store, _) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    let outcome = engine.process(&obs("A", "G_05_08", 1500)).await.unwrap();
    assert_eq!(outcome, ProcessOutcome::Moved);

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.last_seen_ts_ms, 1500);
    assert_eq!(state.enter_ts_ms, Some(1000));

    assert_eq!(store.read_timeline(&key_a(), 10).await.unwrap().len(), 1);
    assert!(store
        .get_aggregate(&partition(), &cell("G_05_08"))
        .await
        .unwrap()
        .is_none());
}

// ===== Scenario: transition =====

#[tokio::test]
async fn transition_closes_old_span_and_opens_new() {
    let (mut engine, store, _) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_05_08", 1500)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.current_cell, Some(cell("G_06_08")));
    assert_eq!(state.enter_ts_ms, Some(2500));
    assert_eq!(state.last_seen_ts_ms, 2500);
    assert_eq!(state.accumulated_ms, 1500);

    let aggregate = store
        .get_aggregate(&partition(), &cell("G_05_08"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aggregate.contributions["A"], 1500);

    let timeline = store.read_timeline(&key_a(), 10).await.unwrap();
    assert_eq!(timeline.len(), 3);
    // Newest-first: the new enter, then the closing leave.
    assert_eq!(timeline[0].kind, TimelineEntryKind::Enter);
    assert_eq!(timeline[0].cell_id, "G_06_08");
    assert_eq!(timeline[0].from_ts_ms, 2500);
    assert_eq!(timeline[1].kind, TimelineEntryKind::Leave);
    assert_eq!(timeline[1].cell_id, "G_05_08");
    assert_eq!(timeline[1].from_ts_ms, 1000);
    assert_eq!(timeline[1].to_ts_ms, Some(2500));
}

// ===== Scenario: timeout close by the sweeper =====

#[tokio::test]
async fn sweeper_closes_stale_span_at_last_seen() {
    let (mut engine, store, counters) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_05_08", 1500)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();

    let sweeper = TimeoutSweeper::new(store.clone(), counters, 30_000);
    assert_eq!(sweeper.sweep_at(42_500).await.unwrap(), 1);

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.current_cell, None);
    assert_eq!(state.enter_ts_ms, None);
    assert_eq!(state.last_seen_ts_ms, 2500);

    // The open span closed with zero dwell (last_seen == enter).
    let aggregate = store
        .get_aggregate(&partition(), &cell("G_06_08"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aggregate.contributions["A"], 0);
    assert_eq!(aggregate.object_count(), 0);

    let timeline = store.read_timeline(&key_a(), 10).await.unwrap();
    assert_eq!(timeline[0].kind, TimelineEntryKind::Leave);
    assert_eq!(timeline[0].cell_id, "G_06_08");
    assert_eq!(timeline[0].from_ts_ms, 2500);
    assert_eq!(timeline[0].to_ts_ms, Some(2500));
    assert_eq!(
        timeline[0].meta.get("reason").map(String::as_str),
        Some("timeout")
    );
}

// ===== Scenario: out-of-order drop =====

#[tokio::test]
async fn out_of_order_observation_changes_nothing() {
    let (mut engine, store, counters) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();

    let before = store.get_object_state(&key_a()).await.unwrap().unwrap();
    let timeline_before = store.read_timeline(&key_a(), 100).await.unwrap();

    assert!(engine.process(&obs("A", "G_04_08", 1200)).await.is_err());

    let after = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(
        timeline_before,
        store.read_timeline(&key_a(), 100).await.unwrap()
    );
    assert_eq!(counters.snapshot().out_of_order_dropped, 1);
}

// ===== Property: idempotence on event_id =====

#[tokio::test]
async fn duplicate_delivery_has_no_observable_effect() {
    let (mut engine, store, _) = setup();
    let first = obs("A", "G_05_08", 1000);
    let second = obs("A", "G_06_08", 2500);
    engine.process(&first).await.unwrap();
    engine.process(&second).await.unwrap();

    let state_before = store.get_object_state(&key_a()).await.unwrap().unwrap();
    let aggregates_before = store.list_aggregates(&partition()).await.unwrap();
    let timeline_before = store.read_timeline(&key_a(), 100).await.unwrap();

    // Redeliver both.
    assert_eq!(
        engine.process(&first).await.unwrap(),
        ProcessOutcome::Duplicate
    );
    assert_eq!(
        engine.process(&second).await.unwrap(),
        ProcessOutcome::Duplicate
    );

    assert_eq!(
        state_before,
        store.get_object_state(&key_a()).await.unwrap().unwrap()
    );
    assert_eq!(
        timeline_before,
        store.read_timeline(&key_a(), 100).await.unwrap()
    );
    let aggregates_after = store.list_aggregates(&partition()).await.unwrap();
    assert_eq!(aggregates_before.len(), aggregates_after.len());
    for before in &aggregates_before {
        let after = aggregates_after
            .iter()
            .find(|a| a.grid_cell_id == before.grid_cell_id)
            .unwrap();
        assert_eq!(before.total_dwell_ms(), after.total_dwell_ms());
    }
}

// ===== Property: replay determinism =====

#[tokio::test]
async fn replay_with_fresh_dedup_set_is_deterministic() {
    let trace = vec![
        obs("A", "G_05_08", 1000),
        obs("A", "G_05_08", 1500),
        obs("A", "G_06_08", 2500),
        obs("B", "G_02_02", 1100),
        obs("B", "G_03_02", 1900),
        obs("A", "G_06_08", 3000),
    ];

    let store = Arc::new(MemoryStore::new(StoreSettings::default()));
    let counters = Arc::new(EngineCounters::new());

    let mut engine = DwellEngine::new(store.clone(), counters.clone(), EngineSettings::default());
    for observation in &trace {
        engine.process(observation).await.unwrap();
    }

    let state_a = store.get_object_state(&key_a()).await.unwrap().unwrap();
    let state_b = store
        .get_object_state(&ObjectKey::new("col", "cam", "B"))
        .await
        .unwrap()
        .unwrap();
    let timeline_a = store.read_timeline(&key_a(), 100).await.unwrap();
    let totals: Vec<(String, u64)> = {
        let mut aggregates = store.list_aggregates(&partition()).await.unwrap();
        aggregates.sort_by(|x, y| x.grid_cell_id.cmp(&y.grid_cell_id));
        aggregates
            .iter()
            .map(|a| (a.grid_cell_id.to_string(), a.total_dwell_ms()))
            .collect()
    };

    // Second pass over the same store with a fresh dedup window. Stale
    // timestamps are rejected; the replay must not change anything.
    let mut replay_engine =
        DwellEngine::new(store.clone(), counters, EngineSettings::default());
    for observation in &trace {
        let _ = replay_engine.process(observation).await;
    }

    assert_eq!(
        state_a,
        store.get_object_state(&key_a()).await.unwrap().unwrap()
    );
    assert_eq!(
        state_b,
        store
            .get_object_state(&ObjectKey::new("col", "cam", "B"))
            .await
            .unwrap()
            .unwrap()
    );
    assert_eq!(timeline_a, store.read_timeline(&key_a(), 100).await.unwrap());

    let replay_totals: Vec<(String, u64)> = {
        let mut aggregates = store.list_aggregates(&partition()).await.unwrap();
        aggregates.sort_by(|x, y| x.grid_cell_id.cmp(&y.grid_cell_id));
        aggregates
            .iter()
            .map(|a| (a.grid_cell_id.to_string(), a.total_dwell_ms()))
            .collect()
    };
    assert_eq!(totals, replay_totals);
}

// ===== Property: dwell conservation =====

#[tokio::test]
async fn closed_span_dwell_is_conserved_across_the_trace() {
    let (mut engine, store, counters) = setup();

    // 1000..2500 in G_05_08, 2500..3000 in G_06_08, then a 37s gap, then
    // G_07_08 until the final sweep.
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_05_08", 1500)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 3000)).await.unwrap();
    engine.process(&obs("A", "G_07_08", 40_000)).await.unwrap();

    let sweeper = TimeoutSweeper::new(store.clone(), counters, 30_000);
    assert_eq!(sweeper.sweep_at(80_000).await.unwrap(), 1);

    let total_contributed: u64 = store
        .list_aggregates(&partition())
        .await
        .unwrap()
        .iter()
        .map(|a| a.contributions.get("A").copied().unwrap_or(0))
        .sum();

    // last_seen - first_enter - oversized gap: 40000 - 1000 - 37000.
    assert_eq!(total_contributed, 2000);

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.accumulated_ms, total_contributed);
}

// ===== Property: monotonic accumulation =====

#[tokio::test]
async fn accumulated_dwell_never_decreases() {
    let (mut engine, store, _) = setup();
    let trace = vec![
        obs("A", "G_00_00", 0),
        obs("A", "G_01_00", 700),
        obs("A", "G_01_00", 900),
        obs("A", "G_02_00", 1600),
        obs("A", "G_02_00", 50_000), // gap close
        obs("A", "G_03_00", 50_400),
    ];

    let mut last_accumulated = 0u64;
    for observation in trace {
        engine.process(&observation).await.unwrap();
        let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
        assert!(state.accumulated_ms >= last_accumulated);
        last_accumulated = state.accumulated_ms;
    }
}

// ===== Property: timeline/aggregate agreement =====

#[tokio::test]
async fn leave_entries_match_aggregate_contributions() {
    let (mut engine, store, _) = setup();
    let trace = vec![
        obs("A", "G_05_08", 1000),
        obs("A", "G_06_08", 2500),
        obs("A", "G_05_08", 4000),
        obs("A", "G_07_08", 9000),
    ];
    for observation in &trace {
        engine.process(observation).await.unwrap();
    }

    let timeline: Vec<TimelineEntry> = store.read_timeline(&key_a(), 100).await.unwrap();

    // Sum leave durations per cell and compare with the aggregates.
    let mut expected: std::collections::BTreeMap<String, u64> = Default::default();
    for entry in timeline
        .iter()
        .filter(|e| e.kind == TimelineEntryKind::Leave)
    {
        *expected.entry(entry.cell_id.clone()).or_insert(0) += entry.duration_ms();
    }
    assert!(!expected.is_empty());

    for (cell_id, expected_dwell) in expected {
        let aggregate = store
            .get_aggregate(&partition(), &cell(&cell_id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            aggregate.contributions.get("A").copied().unwrap_or(0),
            expected_dwell,
            "cell {cell_id}"
        );
    }
}

// ===== Re-entry after a sweeper close =====

#[tokio::test]
async fn object_reappearing_after_sweep_reenters_keeping_accumulated() {
    let (mut engine, store, counters) = setup();
    engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
    engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();

    let sweeper = TimeoutSweeper::new(store.clone(), counters, 30_000);
    sweeper.sweep_at(60_000).await.unwrap();

    engine.process(&obs("A", "G_08_08", 61_000)).await.unwrap();

    let state = store.get_object_state(&key_a()).await.unwrap().unwrap();
    assert_eq!(state.current_cell, Some(cell("G_08_08")));
    assert_eq!(state.enter_ts_ms, Some(61_000));
    assert_eq!(state.accumulated_ms, 1500);

    let timeline = store.read_timeline(&key_a(), 10).await.unwrap();
    assert_eq!(timeline[0].kind, TimelineEntryKind::Enter);
    assert_eq!(timeline[0].cell_id, "G_08_08");
}
