//! Reservation trigger API handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use seatgrab_core::orchestrator::{AttemptResult, OrchestratorError, RunReport};
use seatgrab_core::windows::TimeWindow;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an immediate reservation run
#[derive(Debug, Default, Deserialize)]
pub struct ReserveBody {
    /// Windows to book. Falls back to the currently selected windows.
    #[serde(default)]
    pub windows: Option<Vec<TimeWindow>>,
}

/// Request body for a diagnostic run against an arbitrary date
#[derive(Debug, Deserialize)]
pub struct ReserveDateBody {
    pub date: NaiveDate,
    pub windows: Vec<TimeWindow>,
}

/// Response for a completed run
#[derive(Debug, Serialize)]
pub struct ReserveResponse {
    pub run_id: String,
    pub date: NaiveDate,
    pub display_date: String,
    pub results: Vec<AttemptResult>,
}

impl From<RunReport> for ReserveResponse {
    fn from(report: RunReport) -> Self {
        Self {
            run_id: report.run_id,
            date: report.date.date,
            display_date: report.date.display,
            results: report.results,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ReserveErrorResponse {
    pub error: String,
}

type ReserveError = (StatusCode, Json<ReserveErrorResponse>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ReserveError {
    (
        status,
        Json(ReserveErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a run error to a response. A login failure is the portal refusing
/// us, not a fault in this service, so it maps to 502.
fn run_error(e: OrchestratorError) -> ReserveError {
    match e {
        OrchestratorError::Authentication(_) => {
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
        OrchestratorError::Settings(_) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Run a reservation now for the supplied or currently selected windows
pub async fn reserve_now(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReserveBody>,
) -> Result<Json<ReserveResponse>, ReserveError> {
    let windows = match body.windows {
        Some(windows) if !windows.is_empty() => windows,
        _ => {
            let settings = state
                .settings()
                .load()
                .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
            settings.selected_windows
        }
    };

    if windows.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No windows selected",
        ));
    }

    let run_id = format!("run-{}", Uuid::new_v4());
    info!(run_id, windows = windows.len(), "API reservation run requested");

    let report = state
        .runner()
        .run(&windows, &run_id, None)
        .await
        .map_err(run_error)?;

    Ok(Json(ReserveResponse::from(report)))
}

/// Run a reservation for an arbitrary date, outside normal time rules
pub async fn reserve_for_date(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReserveDateBody>,
) -> Result<Json<ReserveResponse>, ReserveError> {
    if body.windows.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No windows selected",
        ));
    }

    let run_id = format!("diag-{}", Uuid::new_v4());
    info!(run_id, date = %body.date, "Diagnostic reservation run requested");

    let report = state
        .runner()
        .run(&body.windows, &run_id, Some(body.date))
        .await
        .map_err(run_error)?;

    Ok(Json(ReserveResponse::from(report)))
}
