// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gridwell runtime: wires configuration, logging, the state store, the
//! ingress queue, partition workers, the timeout sweeper, and the HTTP
//! server, then runs until SIGINT with graceful drain.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::info;

use gridwell_api::{create_http_server, ApiState};
use gridwell_api::endpoints::system::StatusContext;
use gridwell_config::{load_config, validate_config};
use gridwell_engine::{spawn_supervisor, EngineCounters, EngineSettings, TimeoutSweeper};
use gridwell_ingest::{IngressQueue, Normalizer};
use gridwell_observability::init_logging;
use gridwell_services::{FeedbackServiceImpl, IngestServiceImpl, QueryServiceImpl};
use gridwell_store::{MemoryStore, StoreSettings};
use gridwell_types::GridDimensions;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(None).context("failed to load configuration")?;
    validate_config(&config).context("invalid configuration")?;

    let _logging_guard = init_logging(&config.logging.level, Path::new(&config.logging.dir))
        .context("failed to initialize logging")?;

    info!(
        version = gridwell_api::VERSION,
        grid_width = config.grid.width,
        grid_height = config.grid.height,
        "starting gridwell"
    );

    let grid = GridDimensions::new(config.grid.width, config.grid.height);
    let store = Arc::new(MemoryStore::new(StoreSettings {
        state_ttl: Duration::from_secs(config.store.state_ttl_secs),
        timeline_cap: config.store.timeline_cap,
        recent_events_capacity: config.store.recent_events_capacity,
    }));
    let counters = Arc::new(EngineCounters::new());
    let (queue, registrations) = IngressQueue::new();
    let queue = Arc::new(queue);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Partition workers, one per camera stream.
    let supervisor = spawn_supervisor(
        registrations,
        store.clone(),
        counters.clone(),
        EngineSettings {
            dwell_timeout_ms: config.engine.dwell_timeout_ms,
            dedup_window: config.engine.dedup_window,
            move_event_min_interval_ms: config.engine.move_event_min_interval_ms,
        },
        config.engine.batch_size,
        shutdown_rx.clone(),
    );

    // Timeout sweeper.
    let sweeper = Arc::new(TimeoutSweeper::new(
        store.clone(),
        counters.clone(),
        config.engine.dwell_timeout_ms,
    ));
    let sweeper_handle = {
        let sweeper = sweeper.clone();
        let shutdown_rx = shutdown_rx.clone();
        let interval = config.engine.sweep_interval_ms;
        tokio::spawn(async move { sweeper.run(interval, shutdown_rx).await })
    };

    // Services and the HTTP transport.
    let api_state = ApiState {
        ingest_service: Arc::new(IngestServiceImpl::new(
            Normalizer::new(grid),
            queue.clone(),
            counters.clone(),
        )),
        feedback_service: Arc::new(FeedbackServiceImpl::new(
            store.clone(),
            grid,
            config.feedback.deduct_deleted_spans,
        )),
        query_service: Arc::new(QueryServiceImpl::new(store.clone(), grid)),
        store: store.clone(),
        status_context: Arc::new(StatusContext {
            counters: counters.clone(),
            queue: queue.clone(),
            started_at: Instant::now(),
            grid,
            dwell_timeout_ms: config.engine.dwell_timeout_ms,
            sweep_interval_ms: config.engine.sweep_interval_ms,
        }),
        request_timeout: Duration::from_secs(config.api.request_timeout_secs),
    };
    let app = create_http_server(api_state);

    let addr = format!("{}:{}", config.api.host, config.api.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("HTTP server error")?;

    // Drain: workers finish their in-flight observation, the sweeper its pass.
    let _ = shutdown_tx.send(true);
    let _ = supervisor.await;
    let _ = sweeper_handle.await;
    info!("gridwell stopped");

    Ok(())
}
