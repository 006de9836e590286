// Health, status, and metrics endpoints (transport-agnostic)

use std::sync::Arc;
use std::time::Instant;

use gridwell_engine::EngineCounters;
use gridwell_ingest::IngressQueue;
use gridwell_store::StateStore;
use gridwell_types::{DwellResult, GridDimensions};

use crate::v1::{
    ComponentReadinessV1, CountersV1, HealthResponseV1, MetricsResponseV1, StatusResponseV1,
};

/// Process-level context the system endpoints report on.
pub struct StatusContext {
    pub counters: Arc<EngineCounters>,
    pub queue: Arc<IngressQueue>,
    pub started_at: Instant,
    pub grid: GridDimensions,
    pub dwell_timeout_ms: u64,
    pub sweep_interval_ms: u64,
}

impl StatusContext {
    fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Liveness plus component readiness.
pub async fn health(
    context: &StatusContext,
    store: Arc<dyn StateStore>,
) -> DwellResult<HealthResponseV1> {
    // A read through the live feed doubles as the store probe.
    let store_ready = store.read_recent(1).await.is_ok();

    Ok(HealthResponseV1 {
        status: if store_ready { "healthy" } else { "degraded" }.to_string(),
        uptime_secs: context.uptime_secs(),
        components: ComponentReadinessV1 {
            api: true,
            store: store_ready,
            engine: true,
            sweeper: true,
        },
    })
}

/// Consumer state and configuration summary.
pub async fn status(context: &StatusContext) -> DwellResult<StatusResponseV1> {
    Ok(StatusResponseV1 {
        service: "gridwell".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: context.uptime_secs(),
        partitions: context.queue.partition_count(),
        grid_width: context.grid.width,
        grid_height: context.grid.height,
        dwell_timeout_ms: context.dwell_timeout_ms,
        sweep_interval_ms: context.sweep_interval_ms,
        counters: CountersV1::from(context.counters.snapshot()),
    })
}

/// Raw process counters.
pub async fn metrics(context: &StatusContext) -> DwellResult<MetricsResponseV1> {
    Ok(MetricsResponseV1 {
        counters: CountersV1::from(context.counters.snapshot()),
    })
}
