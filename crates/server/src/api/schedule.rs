//! Schedule API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use seatgrab_core::audit::{AuditEntry, AuditStatus};
use seatgrab_core::settings::CustomSchedule;
use seatgrab_core::windows::TimeWindow;

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for setting a day's scheduled windows
#[derive(Debug, Deserialize)]
pub struct SetDayBody {
    /// Windows to book when the daily trigger reaches this date.
    /// An empty list clears the entry.
    pub windows: Vec<TimeWindow>,
}

/// Response after setting or clearing a day schedule
#[derive(Debug, Serialize)]
pub struct DayScheduleResponse {
    pub date: NaiveDate,
    pub windows: Vec<TimeWindow>,
}

/// Request body for creating a custom schedule
#[derive(Debug, Deserialize)]
pub struct CreateCustomScheduleBody {
    pub reserve_date: NaiveDate,
    pub windows: Vec<TimeWindow>,
    pub execution_date: NaiveDate,
    pub execution_hour: u32,
    pub execution_minute: u32,
}

/// Simple message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ScheduleErrorResponse {
    pub error: String,
}

type ScheduleError = (StatusCode, Json<ScheduleErrorResponse>);

fn storage_error(e: impl std::fmt::Display) -> ScheduleError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ScheduleErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn bad_request(message: &str) -> ScheduleError {
    (
        StatusCode::BAD_REQUEST,
        Json(ScheduleErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Set or clear the daily window schedule for one date
pub async fn set_day(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<SetDayBody>,
) -> Result<Json<DayScheduleResponse>, ScheduleError> {
    let mut settings = state.settings().load().map_err(storage_error)?;

    if body.windows.is_empty() {
        settings.scheduled_days.remove(&date);
    } else {
        settings
            .scheduled_days
            .insert(date, body.windows.clone());
    }
    state.settings().save(&settings).map_err(storage_error)?;

    // One pending entry per window so the history view shows what is queued
    for window in &body.windows {
        state
            .audit()
            .record(AuditEntry::new(
                date,
                window.label(),
                AuditStatus::Scheduled,
                Some("تایم‌بندی شده برای اجرای خودکار".to_string()),
                None,
            ))
            .await;
    }

    Ok(Json(DayScheduleResponse {
        date,
        windows: body.windows,
    }))
}

/// Create a one-shot custom schedule
pub async fn create_custom(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCustomScheduleBody>,
) -> Result<(StatusCode, Json<CustomSchedule>), ScheduleError> {
    if body.windows.is_empty() {
        return Err(bad_request("No windows selected"));
    }
    if body.execution_hour > 23 {
        return Err(bad_request("Execution hour must be 0-23"));
    }
    if body.execution_minute > 59 {
        return Err(bad_request("Execution minute must be 0-59"));
    }

    let schedule = CustomSchedule {
        id: Uuid::new_v4().to_string(),
        reserve_date: body.reserve_date,
        windows: body.windows,
        execution_date: body.execution_date,
        execution_hour: body.execution_hour,
        execution_minute: body.execution_minute,
        executed: false,
    };

    let mut settings = state.settings().load().map_err(storage_error)?;
    settings.custom_schedules.push(schedule.clone());
    state.settings().save(&settings).map_err(storage_error)?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// Delete a custom schedule by id
pub async fn delete_custom(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ScheduleError> {
    let mut settings = state.settings().load().map_err(storage_error)?;

    let before = settings.custom_schedules.len();
    settings.custom_schedules.retain(|s| s.id != id);
    if settings.custom_schedules.len() == before {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ScheduleErrorResponse {
                error: format!("Schedule not found: {}", id),
            }),
        ));
    }

    state.settings().save(&settings).map_err(storage_error)?;

    Ok(Json(MessageResponse {
        message: "Schedule deleted".to_string(),
    }))
}
