//! Booking settings API handlers.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use seatgrab_core::dates::DateMode;
use seatgrab_core::settings::{
    AdvancedUpdate, BookingSettings, CustomSchedule, SelectionUpdate,
};
use seatgrab_core::windows::TimeWindow;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// Booking settings as exposed over the API.
///
/// The stored secret never leaves the server; callers only learn whether
/// one has been set.
#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub username: String,
    pub password_set: bool,
    pub session_code: String,
    pub default_seat: u32,
    pub seat_priority: Vec<u32>,
    pub concurrency: usize,
    pub start_jitter_ms: u64,
    pub date_mode: DateMode,
    pub selected_windows: Vec<TimeWindow>,
    pub scheduled_days: BTreeMap<NaiveDate, Vec<TimeWindow>>,
    pub custom_schedules: Vec<CustomSchedule>,
    pub last_quota: Option<String>,
}

impl From<BookingSettings> for SettingsView {
    fn from(settings: BookingSettings) -> Self {
        Self {
            username: settings.credentials.username,
            password_set: !settings.credentials.password.is_empty(),
            session_code: settings.credentials.session_code,
            default_seat: settings.default_seat,
            seat_priority: settings.seat_priority,
            concurrency: settings.concurrency,
            start_jitter_ms: settings.start_jitter_ms,
            date_mode: settings.date_mode,
            selected_windows: settings.selected_windows,
            scheduled_days: settings.scheduled_days,
            custom_schedules: settings.custom_schedules,
            last_quota: settings.last_quota,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ConfigErrorResponse {
    pub error: String,
}

type ConfigError = (StatusCode, Json<ConfigErrorResponse>);

fn storage_error(e: impl std::fmt::Display) -> ConfigError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ConfigErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the current booking settings
pub async fn get_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SettingsView>, ConfigError> {
    let settings = state.settings().load().map_err(storage_error)?;
    Ok(Json(SettingsView::from(settings)))
}

/// Update the main selection (default seat, date mode, selected windows)
pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> Result<Json<SettingsView>, ConfigError> {
    let mut settings = state.settings().load().map_err(storage_error)?;
    settings.apply_selection(update);
    state.settings().save(&settings).map_err(storage_error)?;
    Ok(Json(SettingsView::from(settings)))
}

/// Update credentials and tuning knobs
pub async fn update_credentials(
    State(state): State<Arc<AppState>>,
    Json(update): Json<AdvancedUpdate>,
) -> Result<Json<SettingsView>, ConfigError> {
    let mut settings = state.settings().load().map_err(storage_error)?;
    settings.apply_advanced(update);
    state.settings().save(&settings).map_err(storage_error)?;
    Ok(Json(SettingsView::from(settings)))
}
