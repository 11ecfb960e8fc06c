//! Audit history API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use seatgrab_core::audit::AuditEntry;
use seatgrab_core::dates::to_jalali;

use crate::state::AppState;

/// Maximum allowed limit for history queries
const MAX_LIMIT: i64 = 1000;

/// Default limit for history queries
const DEFAULT_LIMIT: i64 = 50;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for the recent-history endpoint
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// Maximum number of entries to return (default 50, max 1000)
    pub limit: Option<i64>,
}

/// Response for recent history
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<AuditEntry>,
    pub limit: i64,
}

/// Response for a single date's history
#[derive(Debug, Serialize)]
pub struct DayHistoryResponse {
    pub date: NaiveDate,
    pub display_date: String,
    pub entries: Vec<AuditEntry>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct HistoryErrorResponse {
    pub error: String,
}

type HistoryError = (StatusCode, Json<HistoryErrorResponse>);

fn storage_error(e: impl std::fmt::Display) -> HistoryError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(HistoryErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Most recent audit entries, newest first
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, HistoryError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let entries = state.audit_store().recent(limit).map_err(storage_error)?;

    Ok(Json(HistoryResponse { entries, limit }))
}

/// All audit entries for one reservation date
pub async fn for_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayHistoryResponse>, HistoryError> {
    let entries = state.audit_store().for_date(date).map_err(storage_error)?;

    Ok(Json(DayHistoryResponse {
        date,
        display_date: to_jalali(date),
        entries,
    }))
}
