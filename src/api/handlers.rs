//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

use super::responses::{
    ApiResponse, CreateTimerRequest, DurationInput, ExportResponse, HealthResponse, StatusResponse,
    TimerListResponse,
};
use crate::{
    services::export_history,
    state::{AppState, HistoryEntry, TimerPhase, ToggleOutcome},
};

type Reply = (StatusCode, Json<ApiResponse>);

fn not_found(id: &str) -> Reply {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error(format!("No timer with id {}", id), None)),
    )
}

/// Handle POST /timers - Create a new idle timer
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> Reply {
    let duration = match request.duration {
        DurationInput::Seconds(seconds) => seconds.to_string(),
        DurationInput::Text(text) => text,
    };

    match state.engine.create_from_input(&request.name, &duration, &request.category) {
        Ok(timer) => (
            StatusCode::CREATED,
            Json(ApiResponse::timer(format!("Timer '{}' created", timer.name), timer)),
        ),
        Err(e) => {
            warn!("Rejected timer creation: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiResponse::error(e.to_string(), None)))
        }
    }
}

/// Handle GET /timers - Return the current collection
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<TimerListResponse> {
    Json(TimerListResponse::new(state.engine.snapshot()))
}

/// Handle POST /timers/:id/toggle - Start or pause a timer
pub async fn toggle_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply {
    match state.engine.toggle(&id) {
        Some(ToggleOutcome::Started(timer)) => (
            StatusCode::OK,
            Json(ApiResponse::timer(format!("Timer '{}' started", timer.name), timer)),
        ),
        Some(ToggleOutcome::Paused(timer)) => (
            StatusCode::OK,
            Json(ApiResponse::timer(format!("Timer '{}' paused", timer.name), timer)),
        ),
        Some(ToggleOutcome::RequiresReset(timer)) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                format!("Timer '{}' has finished, reset it before starting again", timer.name),
                Some(timer),
            )),
        ),
        None => not_found(&id),
    }
}

/// Handle POST /timers/:id/reset - Restore a timer's full duration
pub async fn reset_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Reply {
    match state.engine.reset(&id) {
        Some(timer) => (
            StatusCode::OK,
            Json(ApiResponse::timer(format!("Timer '{}' reset", timer.name), timer)),
        ),
        None => not_found(&id),
    }
}

/// Handle GET /history - Return the completion log
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<Vec<HistoryEntry>> {
    Json(state.engine.history().await)
}

/// Handle GET /history/export - Return the stored history blob unchanged
pub async fn export_blob_handler(State(state): State<Arc<AppState>>) -> Response {
    state.engine.flush().await;

    match state.engine.repository().history_blob().await {
        Ok(Some(blob)) => ([(header::CONTENT_TYPE, "application/json")], blob).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("Failed to read history for export: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handle POST /history/export - Write the history blob to the export directory
pub async fn export_file_handler(State(state): State<Arc<AppState>>) -> Response {
    state.engine.flush().await;

    match export_history(state.engine.repository(), &state.export_dir).await {
        Ok(Some(path)) => {
            info!("History export written to {}", path.display());
            Json(ExportResponse {
                path: path.display().to_string(),
            })
            .into_response()
        }
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!("History export failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Handle GET /status - Summarize the collection
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timers = state.engine.snapshot();
    let count = |phase: TimerPhase| timers.iter().filter(|t| t.phase() == phase).count();

    Json(StatusResponse {
        timers: timers.len(),
        running: count(TimerPhase::Running),
        completed: count(TimerPhase::Completed),
        uptime: state.get_uptime(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
