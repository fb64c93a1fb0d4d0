//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::state::{AppState, TimerMode, TimerSnapshot};
use super::responses::{ApiResponse, ErrorResponse, HealthResponse, StatsResponse, StatusResponse};

type HandlerResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn internal_error(context: &str, e: String) -> (StatusCode, Json<ErrorResponse>) {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(format!("{}: {}", context, e))),
    )
}

fn timer_response(
    result: Result<TimerSnapshot, String>,
    message: &str,
    context: &str,
) -> HandlerResult<ApiResponse> {
    match result {
        Ok(snapshot) => {
            info!("{} ({} {})", message, snapshot.timer.mode, snapshot.display);
            Ok(Json(ApiResponse::new(message.to_string(), snapshot)))
        }
        Err(e) => Err(internal_error(context, e)),
    }
}

/// Handle POST /timer/start - Start the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    timer_response(state.start(), "Timer started", "Failed to start timer")
}

/// Handle POST /timer/pause - Pause the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    timer_response(state.pause(), "Timer paused", "Failed to pause timer")
}

/// Handle POST /timer/toggle - Start or pause depending on the current state
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    timer_response(state.toggle(), "Timer toggled", "Failed to toggle timer")
}

/// Handle POST /timer/reset - Restore the current mode's full duration
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    timer_response(state.reset(), "Timer reset", "Failed to reset timer")
}

/// Handle POST /timer/mode/:mode - Switch between work and break
pub async fn mode_handler(
    State(state): State<Arc<AppState>>,
    Path(mode): Path<String>,
) -> HandlerResult<ApiResponse> {
    let mode: TimerMode = mode.parse().map_err(|e: String| {
        warn!("Rejected mode switch: {}", e);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e)))
    })?;

    timer_response(
        state.switch_mode(mode),
        &format!("Switched to {} mode", mode),
        "Failed to switch timer mode",
    )
}

/// Handle GET /timer - Return the current countdown
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> HandlerResult<TimerSnapshot> {
    state
        .get_snapshot()
        .map(Json)
        .map_err(|e| internal_error("Failed to get timer state", e))
}

/// Handle GET /stats - Return today's stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatsResponse> {
    state
        .get_stats()
        .map(|stats| Json(stats.into()))
        .map_err(|e| internal_error("Failed to get stats", e))
}

/// Handle POST /stats/tasks/completed - Count a completed task
pub async fn task_completed_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<StatsResponse> {
    state
        .record_task_completed()
        .map(|stats| Json(stats.into()))
        .map_err(|e| internal_error("Failed to record task completion", e))
}

/// Handle GET /status - Return timer, stats and server status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let timer = state
        .get_snapshot()
        .map_err(|e| internal_error("Failed to get timer state", e))?;
    let stats = state
        .get_stats()
        .map_err(|e| internal_error("Failed to get stats", e))?;

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        ticking: state.is_ticking(),
        stats: stats.into(),
        errors: state.reporter.recent(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
