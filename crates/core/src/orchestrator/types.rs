//! Types for the booking orchestrator.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::dates::ReservationDate;
use crate::windows::TimeWindow;

/// Errors that abort a whole reservation run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Login failed twice, once with the original session and once with a
    /// fresh one.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Settings store error.
    #[error("settings error: {0}")]
    Settings(#[from] crate::settings::SettingsError),
}

/// Errors from a single per-window reservation task.
///
/// These never abort the run; each window reports its own failure.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error(transparent)]
    Portal(#[from] crate::portal::PortalError),

    #[error(transparent)]
    Markup(#[from] crate::portal::MarkupError),

    #[error(transparent)]
    Seats(#[from] crate::seats::NoSeatsAvailable),
}

/// Outcome of one window's reservation attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub window: TimeWindow,
    pub success: bool,
    pub message: String,
    /// Raw portal response body, kept for the dashboard and diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
}

impl AttemptResult {
    /// Build a failed result from a task error.
    pub fn failed(window: TimeWindow, error: &TaskError) -> Self {
        Self {
            window,
            success: false,
            message: error.to_string(),
            raw_response: None,
        }
    }
}

/// Trait for components that execute reservation runs.
///
/// Both the scheduler and the API trigger runs through this, so tests can
/// substitute a recording mock for the real orchestrator.
#[async_trait]
pub trait ReservationRunner: Send + Sync {
    /// Run one reservation pass over the given windows.
    ///
    /// `date_override` forces a specific reservation date; without it the
    /// date comes from the persisted date mode (today/tomorrow).
    async fn run(
        &self,
        windows: &[TimeWindow],
        run_id: &str,
        date_override: Option<NaiveDate>,
    ) -> Result<RunReport, OrchestratorError>;
}

/// Report of a full reservation run, one entry per requested window.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub date: ReservationDate,
    pub results: Vec<AttemptResult>,
}

impl RunReport {
    /// True when every requested window was reserved.
    pub fn all_succeeded(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.success)
    }

    /// True when at least one window was reserved.
    pub fn any_succeeded(&self) -> bool {
        self.results.iter().any(|r| r.success)
    }
}
