use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use mirror_sync_core::{RunPhase, RunSummary, StatusSnapshot};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Sync status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Upstream registry URL
    pub registry: String,
    /// Whether a run currently holds the run lock
    pub running: bool,
    pub phase: RunPhase,
    /// Progress of the most recent run that reached the worker
    pub current: Option<StatusSnapshot>,
    /// Summary of the most recent finished run
    pub last_run: Option<RunSummary>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.orchestrator().status().await;
    Json(StatusResponse {
        registry: state.config().registry.url.clone(),
        running: state.scheduler().is_busy(),
        phase: status.phase,
        current: state.status_board().snapshot(),
        last_run: status.last_run,
    })
}

/// Start a sync run now. Rejected while another run is active.
pub async fn trigger_sync(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<MessageResponse>), (StatusCode, Json<ErrorResponse>)> {
    match state.scheduler().trigger() {
        Ok(_) => {
            info!("Manual sync run triggered");
            Ok((
                StatusCode::ACCEPTED,
                Json(MessageResponse {
                    message: "Sync run started".to_string(),
                }),
            ))
        }
        Err(_) => Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "A sync run is already in progress".to_string(),
            }),
        )),
    }
}

pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state);
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
