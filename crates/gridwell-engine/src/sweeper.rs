// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Timeout sweeper.
//!
//! Periodically closes open spans for objects not seen within the dwell
//! timeout: the span closes at `last_seen_ts_ms` (never at wall clock), the
//! dwell goes to the cell aggregate, and the state keeps no open cell.
//! State deletion is left to the store TTL.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use gridwell_store::StateStore;
use gridwell_types::{
    epoch_ms_now, DwellResult, EpochMs, RecentEvent, RecentEventKind, TimelineEntry,
};

use crate::counters::EngineCounters;

/// Closes stale open spans on a fixed tick.
pub struct TimeoutSweeper {
    store: Arc<dyn StateStore>,
    counters: Arc<EngineCounters>,
    dwell_timeout_ms: u64,
}

impl TimeoutSweeper {
    pub fn new(
        store: Arc<dyn StateStore>,
        counters: Arc<EngineCounters>,
        dwell_timeout_ms: u64,
    ) -> Self {
        Self {
            store,
            counters,
            dwell_timeout_ms,
        }
    }

    /// One sweep pass against an explicit clock. Returns how many spans
    /// were closed.
    pub async fn sweep_at(&self, now_ms: EpochMs) -> DwellResult<u32> {
        let mut closed = 0u32;

        for (key, _) in self.store.scan_open_states().await? {
            let _guard = self.store.locks().acquire(&key).await;

            // Re-read under the lock; the worker may have advanced it.
            let Some(mut state) = self.store.get_object_state(&key).await? else {
                continue;
            };
            let (Some(cell), Some(enter_ts)) = (state.current_cell.clone(), state.enter_ts_ms)
            else {
                continue;
            };
            if now_ms - state.last_seen_ts_ms <= self.dwell_timeout_ms as i64 {
                continue;
            }

            let dwell = (state.last_seen_ts_ms - enter_ts).max(0) as u64;
            self.store
                .add_contribution(&key.partition(), &cell, &key.object_id, dwell)
                .await?;
            self.store
                .prepend_timeline(
                    &key,
                    TimelineEntry::leave(cell.as_str(), enter_ts, state.last_seen_ts_ms)
                        .with_meta("reason", "timeout"),
                )
                .await?;

            state.accumulated_ms += dwell;
            state.current_cell = None;
            state.enter_ts_ms = None;
            self.store.put_object_state(&key, &state).await?;

            self.store
                .push_recent(RecentEvent::new(
                    RecentEventKind::Exit,
                    key.collector_id.clone(),
                    key.camera_id.clone(),
                    key.object_id.clone(),
                    cell.as_str(),
                    state.last_seen_ts_ms,
                ))
                .await?;

            EngineCounters::bump(&self.counters.timeout_closes);
            debug!(object = %key, cell = %cell, dwell_ms = dwell, "timeout close");
            closed += 1;
        }

        Ok(closed)
    }

    /// Run the periodic sweep loop until shutdown.
    pub async fn run(&self, sweep_interval_ms: u64, mut shutdown: watch::Receiver<bool>) {
        info!(interval_ms = sweep_interval_ms, "timeout sweeper started");
        let mut ticker = tokio::time::interval(Duration::from_millis(sweep_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_at(epoch_ms_now()).await {
                        Ok(0) => {}
                        Ok(closed) => debug!(closed, "sweep closed stale spans"),
                        Err(err) => {
                            EngineCounters::bump(&self.counters.store_errors);
                            warn!(error = %err, "sweep failed; retrying next tick");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("timeout sweeper stopped");
    }
}
