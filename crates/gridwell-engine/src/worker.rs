// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Partition consumer workers.
//!
//! The supervisor listens for new partitions announced by the ingress
//! queue and spawns one worker task per partition. A worker drains its
//! channel in batches and applies each observation through its own
//! [`DwellEngine`]; a store failure retries the same observation rather
//! than advancing past it (at-least-once hand-off).

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use gridwell_ingest::PartitionStream;
use gridwell_store::StateStore;
use gridwell_types::{DwellError, Observation};

use crate::counters::EngineCounters;
use crate::engine::{DwellEngine, EngineSettings};

const STORE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Spawn the supervisor task that creates one worker per partition.
pub fn spawn_supervisor(
    mut registrations: tokio::sync::mpsc::UnboundedReceiver<PartitionStream>,
    store: Arc<dyn StateStore>,
    counters: Arc<EngineCounters>,
    settings: EngineSettings,
    batch_size: usize,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut supervisor_shutdown = shutdown.clone();
        loop {
            tokio::select! {
                stream = registrations.recv() => {
                    match stream {
                        Some(stream) => {
                            EngineCounters::bump(&counters.partitions_started);
                            info!(partition = %stream.partition, "starting partition worker");
                            let engine = DwellEngine::new(
                                store.clone(),
                                counters.clone(),
                                settings.clone(),
                            );
                            tokio::spawn(partition_worker(
                                stream,
                                engine,
                                counters.clone(),
                                batch_size,
                                shutdown.clone(),
                            ));
                        }
                        None => break,
                    }
                }
                _ = supervisor_shutdown.changed() => {
                    if *supervisor_shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("partition supervisor stopped");
    })
}

/// Consume one partition until its channel closes or shutdown is signaled.
/// The in-flight observation always completes before the worker exits.
pub async fn partition_worker(
    mut stream: PartitionStream,
    mut engine: DwellEngine,
    counters: Arc<EngineCounters>,
    batch_size: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let partition = stream.partition.clone();
    let mut batch: Vec<Observation> = Vec::with_capacity(batch_size.max(1));

    loop {
        batch.clear();
        tokio::select! {
            received = stream.receiver.recv_many(&mut batch, batch_size.max(1)) => {
                if received == 0 {
                    break; // producer side closed
                }
                for observation in batch.drain(..) {
                    apply_with_retry(&mut engine, &counters, &observation, &shutdown).await;
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    debug!(partition = %partition, "partition worker stopped");
}

/// Apply one observation, retrying while the store is unavailable.
async fn apply_with_retry(
    engine: &mut DwellEngine,
    counters: &EngineCounters,
    observation: &Observation,
    shutdown: &watch::Receiver<bool>,
) {
    loop {
        match engine.process(observation).await {
            Ok(_) => return,
            Err(DwellError::StoreUnavailable(reason)) => {
                EngineCounters::bump(&counters.store_errors);
                warn!(
                    event_id = %observation.event_id,
                    object = %observation.object_id,
                    %reason,
                    "store unavailable, retrying observation"
                );
                if *shutdown.borrow() {
                    return;
                }
                tokio::time::sleep(STORE_RETRY_DELAY).await;
            }
            Err(DwellError::OutOfOrder { ts, watermark }) => {
                // Already counted by the engine; not retryable.
                debug!(
                    event_id = %observation.event_id,
                    object = %observation.object_id,
                    ts,
                    watermark,
                    "dropped out-of-order observation"
                );
                return;
            }
            Err(err) => {
                warn!(
                    event_id = %observation.event_id,
                    object = %observation.object_id,
                    error = %err,
                    "observation failed, dropping"
                );
                return;
            }
        }
    }
}
