use crate::error::ApiError;
use crate::state::AnalyticsServiceState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use common::detections::{Detection, VideoContext};
use common::validation::{validate_detections, validate_video_context};
use crowd_analytics::ComprehensiveReport;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub detections: Vec<Detection>,
    pub context: VideoContext,
}

/// Analyze one video's detections and return the full report
pub async fn create_report(
    State(state): State<AnalyticsServiceState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ComprehensiveReport>, ApiError> {
    validate_video_context(&request.context).map_err(|e| ApiError::bad_request(e.to_string()))?;
    validate_detections(&request.detections).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let report = state
        .generator()
        .generate(&request.detections, &request.context)?;

    tracing::info!(
        node_id = %state.node_id(),
        samples = report.sample_count,
        actions = report.actions.len(),
        "Served crowd report"
    );

    Ok(Json(report))
}

/// Active analytics configuration
pub async fn get_config(State(state): State<AnalyticsServiceState>) -> impl IntoResponse {
    Json(state.generator().config().clone())
}

/// Health check endpoint
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "analytics-service"
        })),
    )
}

/// Readiness check endpoint
pub async fn readyz(State(state): State<AnalyticsServiceState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "node_id": state.node_id(),
            "version": common::VERSION
        })),
    )
}

/// Prometheus metrics endpoint
pub async fn metrics() -> impl IntoResponse {
    match telemetry::metrics::encode_metrics() {
        Ok(body) => body.into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}
