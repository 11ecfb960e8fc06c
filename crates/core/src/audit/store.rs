use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dates::to_jalali;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Outcome recorded for one window of one run, or a pending schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Failed,
    Scheduled,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "success",
            AuditStatus::Failed => "failed",
            AuditStatus::Scheduled => "scheduled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(AuditStatus::Success),
            "failed" => Some(AuditStatus::Failed),
            "scheduled" => Some(AuditStatus::Scheduled),
            _ => None,
        }
    }
}

/// One append-only audit row. Entries are write-once; nothing updates
/// them after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub date: NaiveDate,
    pub window: String,
    pub status: AuditStatus,
    pub message: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub display_date: String,
}

impl AuditEntry {
    /// Stamps creation time and derives the id and Jalali display date.
    /// The microsecond component keeps ids unique when several windows
    /// finish within the same second.
    pub fn new(
        date: NaiveDate,
        window: impl Into<String>,
        status: AuditStatus,
        message: Option<String>,
        error: Option<String>,
    ) -> Self {
        let window = window.into();
        let timestamp = Utc::now();
        Self {
            id: format!("{date}-{window}-{}", timestamp.timestamp_micros()),
            display_date: to_jalali(date),
            date,
            window,
            status,
            message,
            error,
            timestamp,
        }
    }
}

/// Trait for audit log storage
pub trait AuditStore: Send + Sync {
    /// Append one entry
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// Most recent entries, newest first
    fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>, AuditError>;

    /// All entries for one reservation date, newest first
    fn for_date(&self, date: NaiveDate) -> Result<Vec<AuditEntry>, AuditError>;

    /// Delete entries older than the given number of days, returning how
    /// many were removed
    fn prune_older_than(&self, days: i64) -> Result<usize, AuditError>;
}
