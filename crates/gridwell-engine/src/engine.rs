// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The per-object dwell state machine.
//!
//! `process` applies one observation: deduplicate, then first-sighting /
//! stale-gap close / same-cell tick / cell transition, updating object
//! state, cell aggregates, the timeline, and the live feed. All writes for
//! one observation happen under the store's object lock. The dedup window
//! admits an event id only after every write succeeded, so redelivery
//! retries a failed observation.

use ahash::AHashMap;
use std::sync::Arc;
use tracing::debug;

use gridwell_store::StateStore;
use gridwell_types::{
    DwellError, DwellResult, EpochMs, ObjectKey, ObjectState, Observation, RecentEvent,
    RecentEventKind, TimelineEntry,
};

use crate::counters::EngineCounters;
use crate::dedup::DedupWindow;

/// Engine tuning, fixed per worker at startup.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Gap after which an open span is closed implicitly.
    pub dwell_timeout_ms: u64,
    /// Deduplication window capacity (event ids).
    pub dedup_window: usize,
    /// Minimum spacing between move events per object (0 = unthrottled).
    pub move_event_min_interval_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dwell_timeout_ms: 30_000,
            dedup_window: 10_000,
            move_event_min_interval_ms: 0,
        }
    }
}

/// What one observation did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// First sighting, or re-entry after a sweeper close.
    Entered,
    /// Same-cell tick; only `last_seen_ts_ms` advanced.
    Moved,
    /// Left one cell for another; the old span closed on this observation.
    Transitioned { closed_dwell_ms: u64 },
    /// Stale gap: the old span closed at `last_seen`, then a fresh enter.
    ReenteredAfterGap { closed_dwell_ms: u64 },
    /// Already applied within the dedup window; no effect.
    Duplicate,
}

/// One engine instance per partition worker.
pub struct DwellEngine {
    store: Arc<dyn StateStore>,
    counters: Arc<EngineCounters>,
    settings: EngineSettings,
    seen: DedupWindow,
    last_move_event: AHashMap<ObjectKey, EpochMs>,
}

impl DwellEngine {
    pub fn new(
        store: Arc<dyn StateStore>,
        counters: Arc<EngineCounters>,
        settings: EngineSettings,
    ) -> Self {
        let seen = DedupWindow::new(settings.dedup_window);
        Self {
            store,
            counters,
            settings,
            seen,
            last_move_event: AHashMap::new(),
        }
    }

    /// Apply one observation. Idempotent on `event_id` within the dedup
    /// window; rejects timestamps behind the per-object watermark.
    pub async fn process(&mut self, observation: &Observation) -> DwellResult<ProcessOutcome> {
        if self.seen.contains(&observation.event_id) {
            EngineCounters::bump(&self.counters.duplicates_dropped);
            return Ok(ProcessOutcome::Duplicate);
        }

        let key = observation.object_key();
        let _guard = self.store.locks().acquire(&key).await;

        let prior = self.store.get_object_state(&key).await?;
        let outcome = match prior {
            None => self.first_sighting(&key, observation).await?,
            Some(state) => {
                if observation.ts_ms < state.last_seen_ts_ms {
                    EngineCounters::bump(&self.counters.out_of_order_dropped);
                    return Err(DwellError::OutOfOrder {
                        ts: observation.ts_ms,
                        watermark: state.last_seen_ts_ms,
                    });
                }
                self.apply_to_state(&key, observation, state).await?
            }
        };

        // Only now is the observation fully applied.
        self.seen.insert(observation.event_id.clone());
        EngineCounters::bump(&self.counters.observations_processed);
        Ok(outcome)
    }

    async fn apply_to_state(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
        state: ObjectState,
    ) -> DwellResult<ProcessOutcome> {
        let gap = observation.ts_ms - state.last_seen_ts_ms;

        let Some(current_cell) = state.current_cell.clone() else {
            // Sweeper already closed the span; this is a fresh enter that
            // keeps the accumulated total.
            return self.reenter(key, observation, state).await;
        };

        if gap > self.settings.dwell_timeout_ms as i64 {
            return self
                .close_gap_and_reenter(key, observation, state, current_cell)
                .await;
        }

        if current_cell == observation.grid_cell_id {
            self.same_cell_tick(key, observation, state).await
        } else {
            self.transition(key, observation, state, current_cell).await
        }
    }

    async fn first_sighting(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
    ) -> DwellResult<ProcessOutcome> {
        let state =
            ObjectState::first_sighting(observation.grid_cell_id.clone(), observation.ts_ms);

        self.store
            .prepend_timeline(
                key,
                TimelineEntry::enter(observation.grid_cell_id.as_str(), observation.ts_ms),
            )
            .await?;
        self.store.put_object_state(key, &state).await?;
        self.push_event(RecentEventKind::Enter, observation).await?;

        debug!(object = %key, cell = %observation.grid_cell_id, "first sighting");
        Ok(ProcessOutcome::Entered)
    }

    async fn reenter(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
        mut state: ObjectState,
    ) -> DwellResult<ProcessOutcome> {
        state.current_cell = Some(observation.grid_cell_id.clone());
        state.enter_ts_ms = Some(observation.ts_ms);
        state.last_seen_ts_ms = observation.ts_ms;

        self.store
            .prepend_timeline(
                key,
                TimelineEntry::enter(observation.grid_cell_id.as_str(), observation.ts_ms),
            )
            .await?;
        self.store.put_object_state(key, &state).await?;
        self.push_event(RecentEventKind::Enter, observation).await?;

        Ok(ProcessOutcome::Entered)
    }

    async fn close_gap_and_reenter(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
        mut state: ObjectState,
        current_cell: gridwell_types::GridCellId,
    ) -> DwellResult<ProcessOutcome> {
        let enter_ts = state.enter_ts_ms.unwrap_or(state.last_seen_ts_ms);
        // The span closes at last_seen, not at the new observation: dwell
        // never exceeds what was actually observed.
        let dwell = (state.last_seen_ts_ms - enter_ts).max(0) as u64;

        self.store
            .add_contribution(&key.partition(), &current_cell, &key.object_id, dwell)
            .await?;
        self.store
            .prepend_timeline(
                key,
                TimelineEntry::leave(current_cell.as_str(), enter_ts, state.last_seen_ts_ms)
                    .with_meta("reason", "timeout"),
            )
            .await?;

        let exit_event = RecentEvent::new(
            RecentEventKind::Exit,
            key.collector_id.clone(),
            key.camera_id.clone(),
            key.object_id.clone(),
            current_cell.as_str(),
            state.last_seen_ts_ms,
        );

        state.accumulated_ms += dwell;
        state.current_cell = Some(observation.grid_cell_id.clone());
        state.enter_ts_ms = Some(observation.ts_ms);
        state.last_seen_ts_ms = observation.ts_ms;

        self.store
            .prepend_timeline(
                key,
                TimelineEntry::enter(observation.grid_cell_id.as_str(), observation.ts_ms),
            )
            .await?;
        self.store.put_object_state(key, &state).await?;
        self.store.push_recent(exit_event).await?;
        self.push_event(RecentEventKind::Enter, observation).await?;

        EngineCounters::bump(&self.counters.timeout_closes);
        debug!(object = %key, cell = %current_cell, dwell_ms = dwell, "closed stale span");
        Ok(ProcessOutcome::ReenteredAfterGap {
            closed_dwell_ms: dwell,
        })
    }

    async fn same_cell_tick(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
        mut state: ObjectState,
    ) -> DwellResult<ProcessOutcome> {
        state.last_seen_ts_ms = observation.ts_ms;
        self.store.put_object_state(key, &state).await?;

        if self.should_emit_move(key, observation.ts_ms) {
            self.push_event(RecentEventKind::Move, observation).await?;
        }
        Ok(ProcessOutcome::Moved)
    }

    async fn transition(
        &mut self,
        key: &ObjectKey,
        observation: &Observation,
        mut state: ObjectState,
        current_cell: gridwell_types::GridCellId,
    ) -> DwellResult<ProcessOutcome> {
        let enter_ts = state.enter_ts_ms.unwrap_or(state.last_seen_ts_ms);
        // Closed on the new observation's timestamp so contiguous tracks
        // account for every millisecond.
        let dwell = (observation.ts_ms - enter_ts).max(0) as u64;

        self.store
            .add_contribution(&key.partition(), &current_cell, &key.object_id, dwell)
            .await?;
        self.store
            .prepend_timeline(
                key,
                TimelineEntry::leave(current_cell.as_str(), enter_ts, observation.ts_ms),
            )
            .await?;

        let exit_event = RecentEvent::new(
            RecentEventKind::Exit,
            key.collector_id.clone(),
            key.camera_id.clone(),
            key.object_id.clone(),
            current_cell.as_str(),
            observation.ts_ms,
        );

        state.accumulated_ms += dwell;
        state.current_cell = Some(observation.grid_cell_id.clone());
        state.enter_ts_ms = Some(observation.ts_ms);
        state.last_seen_ts_ms = observation.ts_ms;

        self.store
            .prepend_timeline(
                key,
                TimelineEntry::enter(observation.grid_cell_id.as_str(), observation.ts_ms),
            )
            .await?;
        self.store.put_object_state(key, &state).await?;
        self.store.push_recent(exit_event).await?;
        self.push_event(RecentEventKind::Enter, observation).await?;

        EngineCounters::bump(&self.counters.transitions);
        debug!(
            object = %key,
            from = %current_cell,
            to = %observation.grid_cell_id,
            dwell_ms = dwell,
            "cell transition"
        );
        Ok(ProcessOutcome::Transitioned {
            closed_dwell_ms: dwell,
        })
    }

    fn should_emit_move(&mut self, key: &ObjectKey, ts_ms: EpochMs) -> bool {
        let min_interval = self.settings.move_event_min_interval_ms as i64;
        if min_interval == 0 {
            return true;
        }
        match self.last_move_event.get(key) {
            Some(last) if ts_ms - last < min_interval => false,
            _ => {
                self.last_move_event.insert(key.clone(), ts_ms);
                true
            }
        }
    }

    async fn push_event(
        &self,
        kind: RecentEventKind,
        observation: &Observation,
    ) -> DwellResult<()> {
        self.store
            .push_recent(RecentEvent::new(
                kind,
                observation.collector_id.clone(),
                observation.camera_id.clone(),
                observation.object_id.clone(),
                observation.grid_cell_id.as_str(),
                observation.ts_ms,
            ))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridwell_store::{MemoryStore, StoreSettings};
    use gridwell_types::GridCellId;

    fn engine_with_store() -> (DwellEngine, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new(StoreSettings::default()));
        let counters = Arc::new(EngineCounters::new());
        let engine = DwellEngine::new(store.clone(), counters, EngineSettings::default());
        (engine, store)
    }

    fn obs(object: &str, cell: &str, ts_ms: i64) -> Observation {
        Observation {
            event_id: format!("{}@{}", object, ts_ms),
            collector_id: "col".to_string(),
            camera_id: "cam".to_string(),
            object_id: object.to_string(),
            grid_cell_id: GridCellId::parse(cell, &Default::default()).unwrap(),
            ts_ms,
        }
    }

    #[tokio::test]
    async fn first_sighting_creates_state_and_open_timeline() {
        let (mut engine, store) = engine_with_store();
        let outcome = engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
        assert_eq!(outcome, ProcessOutcome::Entered);

        let key = ObjectKey::new("col", "cam", "A");
        let state = store.get_object_state(&key).await.unwrap().unwrap();
        assert_eq!(state.current_cell.as_ref().unwrap().as_str(), "G_05_08");
        assert_eq!(state.enter_ts_ms, Some(1000));
        assert_eq!(state.accumulated_ms, 0);

        let timeline = store.read_timeline(&key, 10).await.unwrap();
        assert_eq!(timeline.len(), 1);
        assert!(timeline[0].to_ts_ms.is_none());
    }

    #[tokio::test]
    async fn duplicate_event_id_is_a_no_op() {
        let (mut engine, store) = engine_with_store();
        let observation = obs("A", "G_05_08", 1000);
        engine.process(&observation).await.unwrap();
        let outcome = engine.process(&observation).await.unwrap();
        assert_eq!(outcome, ProcessOutcome::Duplicate);

        let key = ObjectKey::new("col", "cam", "A");
        assert_eq!(store.read_timeline(&key, 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn transition_closes_span_on_new_timestamp() {
        let (mut engine, store) = engine_with_store();
        engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
        engine.process(&obs("A", "G_05_08", 1500)).await.unwrap();
        let outcome = engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::Transitioned {
                closed_dwell_ms: 1500
            }
        );

        let key = ObjectKey::new("col", "cam", "A");
        let state = store.get_object_state(&key).await.unwrap().unwrap();
        assert_eq!(state.accumulated_ms, 1500);

        let agg = store
            .get_aggregate(
                &key.partition(),
                &GridCellId::parse("G_05_08", &Default::default()).unwrap(),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(agg.contributions["A"], 1500);
    }

    #[tokio::test]
    async fn out_of_order_observation_is_rejected() {
        let (mut engine, store) = engine_with_store();
        engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
        engine.process(&obs("A", "G_06_08", 2500)).await.unwrap();

        let err = engine.process(&obs("A", "G_04_08", 1200)).await.unwrap_err();
        assert!(matches!(err, DwellError::OutOfOrder { ts: 1200, .. }));

        let key = ObjectKey::new("col", "cam", "A");
        let state = store.get_object_state(&key).await.unwrap().unwrap();
        assert_eq!(state.current_cell.as_ref().unwrap().as_str(), "G_06_08");
    }

    #[tokio::test]
    async fn stale_gap_closes_at_last_seen_then_reenters() {
        let (mut engine, store) = engine_with_store();
        engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
        engine.process(&obs("A", "G_05_08", 2000)).await.unwrap();

        // 40 s silence, then a new sighting elsewhere.
        let outcome = engine.process(&obs("A", "G_07_08", 42_000)).await.unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::ReenteredAfterGap {
                closed_dwell_ms: 1000
            }
        );

        let key = ObjectKey::new("col", "cam", "A");
        let state = store.get_object_state(&key).await.unwrap().unwrap();
        assert_eq!(state.current_cell.as_ref().unwrap().as_str(), "G_07_08");
        assert_eq!(state.enter_ts_ms, Some(42_000));
        assert_eq!(state.accumulated_ms, 1000);

        let timeline = store.read_timeline(&key, 10).await.unwrap();
        // newest-first: enter(G_07_08), leave(G_05_08 timeout), enter(G_05_08)
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline[1].cell_id, "G_05_08");
        assert_eq!(timeline[1].to_ts_ms, Some(2000));
        assert_eq!(timeline[1].meta.get("reason").map(String::as_str), Some("timeout"));
    }

    #[tokio::test]
    async fn move_events_can_be_throttled() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new(StoreSettings::default()));
        let counters = Arc::new(EngineCounters::new());
        let mut engine = DwellEngine::new(
            store.clone(),
            counters,
            EngineSettings {
                move_event_min_interval_ms: 1000,
                ..EngineSettings::default()
            },
        );

        engine.process(&obs("A", "G_05_08", 1000)).await.unwrap();
        engine.process(&obs("A", "G_05_08", 1100)).await.unwrap(); // first move, emitted
        engine.process(&obs("A", "G_05_08", 1500)).await.unwrap(); // throttled
        engine.process(&obs("A", "G_05_08", 2500)).await.unwrap(); // emitted

        let events = store.read_recent(10).await.unwrap();
        let moves = events
            .iter()
            .filter(|e| e.kind == RecentEventKind::Move)
            .count();
        assert_eq!(moves, 2);
    }
}
