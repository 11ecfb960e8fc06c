use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::DateMode;
use crate::windows::TimeWindow;

/// Portal credentials. Defaults are empty; the operator supplies real
/// values through the settings API before the first run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Opaque code the portal uses to scope the reservation service page.
    #[serde(default)]
    pub session_code: String,
}

fn default_seat() -> u32 {
    33
}

fn default_seat_priority() -> Vec<u32> {
    vec![33, 32, 34, 37, 42]
}

fn default_concurrency() -> usize {
    3
}

fn default_start_jitter_ms() -> u64 {
    400
}

/// One-shot schedule: at `execution_date` `execution_hour:execution_minute`
/// local time, book `windows` for `reserve_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSchedule {
    pub id: String,
    pub reserve_date: NaiveDate,
    pub windows: Vec<TimeWindow>,
    pub execution_date: NaiveDate,
    pub execution_hour: u32,
    pub execution_minute: u32,
    /// Flips false to true exactly once, when the trigger fires.
    #[serde(default)]
    pub executed: bool,
}

/// The whole persisted settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSettings {
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_seat")]
    pub default_seat: u32,
    /// Seat numbers to try in order when a window has free seats.
    #[serde(default = "default_seat_priority")]
    pub seat_priority: Vec<u32>,
    /// Parallel window attempts per run.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Upper bound for each task's randomized start delay.
    #[serde(default = "default_start_jitter_ms")]
    pub start_jitter_ms: u64,
    #[serde(default)]
    pub date_mode: DateMode,
    #[serde(default)]
    pub selected_windows: Vec<TimeWindow>,
    /// Daily schedules keyed by calendar date, consumed when triggered.
    #[serde(default)]
    pub scheduled_days: BTreeMap<NaiveDate, Vec<TimeWindow>>,
    #[serde(default)]
    pub custom_schedules: Vec<CustomSchedule>,
    /// Last quota message seen in a successful portal reply.
    #[serde(default)]
    pub last_quota: Option<String>,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            default_seat: default_seat(),
            seat_priority: default_seat_priority(),
            concurrency: default_concurrency(),
            start_jitter_ms: default_start_jitter_ms(),
            date_mode: DateMode::default(),
            selected_windows: Vec::new(),
            scheduled_days: BTreeMap::new(),
            custom_schedules: Vec::new(),
            last_quota: None,
        }
    }
}

impl BookingSettings {
    /// Re-applies defaults to values that would break a run. Invalid
    /// values are corrected when written, never at use time.
    pub fn normalize(&mut self) {
        if self.concurrency == 0 {
            self.concurrency = default_concurrency();
        }
        if self.seat_priority.is_empty() {
            self.seat_priority = default_seat_priority();
        }
    }

    pub fn apply_selection(&mut self, update: SelectionUpdate) {
        if let Some(seat) = update.default_seat {
            self.default_seat = seat;
        }
        if let Some(mode) = update.date_mode {
            self.date_mode = mode;
        }
        if let Some(windows) = update.selected_windows {
            self.selected_windows = windows;
        }
    }

    /// Applies credential and tuning updates. Empty credential strings
    /// are treated as absent so a form can post every field without
    /// wiping stored secrets.
    pub fn apply_advanced(&mut self, update: AdvancedUpdate) {
        if let Some(username) = update.username.filter(|v| !v.is_empty()) {
            self.credentials.username = username;
        }
        if let Some(password) = update.password.filter(|v| !v.is_empty()) {
            self.credentials.password = password;
        }
        if let Some(session_code) = update.session_code.filter(|v| !v.is_empty()) {
            self.credentials.session_code = session_code;
        }
        if let Some(priority) = update.seat_priority {
            self.seat_priority = priority;
        }
        if let Some(concurrency) = update.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(jitter) = update.start_jitter_ms {
            self.start_jitter_ms = jitter;
        }
        self.normalize();
    }
}

/// Partial update of the main selection. Absent fields stay untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectionUpdate {
    pub default_seat: Option<u32>,
    pub date_mode: Option<DateMode>,
    pub selected_windows: Option<Vec<TimeWindow>>,
}

/// Partial update of credentials and tuning knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvancedUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_code: Option<String>,
    pub seat_priority: Option<Vec<u32>>,
    pub concurrency: Option<usize>,
    pub start_jitter_ms: Option<u64>,
}
