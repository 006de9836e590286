// OpenAPI documentation generation
//
// The OpenAPI 3.0 specification is generated at compile time with utoipa,
// keeping the documentation in sync with the DTOs.

use utoipa::OpenApi;

use crate::{
    common::{ApiError, ApiErrorCode, ErrorResponse},
    v1::{
        ActiveObjectV1, CellStatsResponseV1, ComponentReadinessV1, CorrectCellRequestV1,
        CountersV1, DeleteSpanRequestV1, DetectedObjectV1, DetectionFrameV1,
        FeedbackAckResponseV1, FrameAckResponseV1, GridSizeV1, HealthResponseV1, HeatmapCellV1,
        HeatmapResponseV1, MetricsResponseV1, ObjectDetailResponseV1, ObjectStateV1,
        RecentEventV1, RelabelRequestV1, StatusResponseV1, TimelineEntryV1,
    },
};

/// OpenAPI documentation for the gridwell REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gridwell REST API",
        version = "1.0.0",
        description = "Grid dwell-time analytics: frame ingestion, cell statistics, heatmaps, object timelines, live feed, and feedback operations",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8600", description = "Local development server")
    ),
    components(schemas(
        ApiError,
        ApiErrorCode,
        ErrorResponse,
        DetectionFrameV1,
        DetectedObjectV1,
        FrameAckResponseV1,
        ObjectStateV1,
        TimelineEntryV1,
        ObjectDetailResponseV1,
        ActiveObjectV1,
        CellStatsResponseV1,
        GridSizeV1,
        HeatmapCellV1,
        HeatmapResponseV1,
        RecentEventV1,
        RelabelRequestV1,
        CorrectCellRequestV1,
        DeleteSpanRequestV1,
        FeedbackAckResponseV1,
        ComponentReadinessV1,
        HealthResponseV1,
        CountersV1,
        StatusResponseV1,
        MetricsResponseV1,
    ))
)]
pub struct ApiDoc;
