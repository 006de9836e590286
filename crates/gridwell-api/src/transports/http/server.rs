// HTTP server implementation (Axum)
//
// This module sets up the HTTP API server with Axum, including routing,
// middleware, and state management. Handlers are thin adapters: extract,
// enforce the request deadline, call the transport-agnostic endpoint,
// wrap in the response envelope.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gridwell_services::{FeedbackService, IngestService, QueryService};
use gridwell_store::StateStore;

use crate::{
    common::{with_deadline, ApiError, ApiResponse},
    endpoints,
    endpoints::system::StatusContext,
    openapi::ApiDoc,
    v1::{
        CorrectCellRequestV1, DeleteSpanRequestV1, DetectionFrameV1, RelabelRequestV1,
    },
};

/// Application state shared across all HTTP handlers
#[derive(Clone)]
pub struct ApiState {
    pub ingest_service: Arc<dyn IngestService>,
    pub feedback_service: Arc<dyn FeedbackService>,
    pub query_service: Arc<dyn QueryService>,
    pub store: Arc<dyn StateStore>,
    pub status_context: Arc<StatusContext>,
    pub request_timeout: Duration,
}

/// Create the main HTTP server application
pub fn create_http_server(state: ApiState) -> Router {
    Router::new()
        // Swagger UI at /swagger-ui/
        .merge(SwaggerUi::new("/swagger-ui").url("/openapi.json", ApiDoc::openapi()))
        // Primary routes
        .merge(create_core_router())
        // Compatibility nest
        .nest("/api/v1", create_core_router())
        // Add state
        .with_state(state)
        // Add middleware
        .layer(create_cors_layer())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
}

fn create_core_router() -> Router<ApiState> {
    Router::new()
        .route("/frames", post(ingest_frame_handler))
        .route("/stats/cells", get(cell_stats_handler))
        .route("/objects/active", get(active_objects_handler))
        .route(
            "/objects/:collector/:camera/:object",
            get(object_detail_handler),
        )
        .route("/heatmap", get(heatmap_handler))
        .route("/events/recent", get(recent_events_handler))
        .route("/feedback/relabel", post(relabel_handler))
        .route("/feedback/correct-cell", post(correct_cell_handler))
        .route("/feedback/delete-span", post(delete_span_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
}

/// Wrap an endpoint result: payload in the success envelope, errors with
/// their taxonomy-derived status.
fn respond<T: Serialize>(result: Result<T, ApiError>) -> Response {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::new(data))).into_response(),
        Err(error) => error.into_response(),
    }
}

// ===== Query parameter shapes =====

#[derive(Debug, Deserialize)]
struct PartitionParams {
    collector: String,
    camera: String,
    cell: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HeatmapParams {
    collector: String,
    camera: String,
    #[serde(default)]
    window_ms: u64,
}

#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<usize>,
}

// ===== Handlers =====

async fn ingest_frame_handler(
    State(state): State<ApiState>,
    Json(frame): Json<DetectionFrameV1>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "ingest_frame",
            endpoints::frames::ingest_frame(state.ingest_service.clone(), frame),
        )
        .await,
    )
}

async fn cell_stats_handler(
    State(state): State<ApiState>,
    Query(params): Query<PartitionParams>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "cell_stats",
            endpoints::stats::cell_stats(
                state.query_service.clone(),
                &params.collector,
                &params.camera,
                params.cell.as_deref(),
            ),
        )
        .await,
    )
}

async fn object_detail_handler(
    State(state): State<ApiState>,
    Path((collector, camera, object)): Path<(String, String, String)>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "object_detail",
            endpoints::objects::object_detail(
                state.query_service.clone(),
                &collector,
                &camera,
                &object,
            ),
        )
        .await,
    )
}

async fn active_objects_handler(
    State(state): State<ApiState>,
    Query(params): Query<PartitionParams>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "active_objects",
            endpoints::objects::active_objects(
                state.query_service.clone(),
                &params.collector,
                &params.camera,
            ),
        )
        .await,
    )
}

async fn heatmap_handler(
    State(state): State<ApiState>,
    Query(params): Query<HeatmapParams>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "heatmap",
            endpoints::heatmap::heatmap(
                state.query_service.clone(),
                &params.collector,
                &params.camera,
                params.window_ms,
            ),
        )
        .await,
    )
}

async fn recent_events_handler(
    State(state): State<ApiState>,
    Query(params): Query<LimitParams>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "recent_events",
            endpoints::events::recent_events(state.query_service.clone(), params.limit),
        )
        .await,
    )
}

async fn relabel_handler(
    State(state): State<ApiState>,
    Json(request): Json<RelabelRequestV1>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "relabel",
            endpoints::feedback::relabel(state.feedback_service.clone(), request),
        )
        .await,
    )
}

async fn correct_cell_handler(
    State(state): State<ApiState>,
    Json(request): Json<CorrectCellRequestV1>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "correct_cell",
            endpoints::feedback::correct_cell(state.feedback_service.clone(), request),
        )
        .await,
    )
}

async fn delete_span_handler(
    State(state): State<ApiState>,
    Json(request): Json<DeleteSpanRequestV1>,
) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "delete_span",
            endpoints::feedback::delete_span(state.feedback_service.clone(), request),
        )
        .await,
    )
}

async fn health_handler(State(state): State<ApiState>) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "health",
            endpoints::system::health(&state.status_context, state.store.clone()),
        )
        .await,
    )
}

async fn status_handler(State(state): State<ApiState>) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "status",
            endpoints::system::status(&state.status_context),
        )
        .await,
    )
}

async fn metrics_handler(State(state): State<ApiState>) -> Response {
    respond(
        with_deadline(
            state.request_timeout,
            "metrics",
            endpoints::system::metrics(&state.status_context),
        )
        .await,
    )
}

/// Create CORS layer with permissive settings
///
/// This allows requests from any origin, which is appropriate for internal
/// deployments where the dashboard is served from another origin. No
/// credentials cross this API.
fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false)
}
