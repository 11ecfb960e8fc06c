use thiserror::Error;

use super::BookingSettings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage backend for the settings document.
///
/// The document is read-modify-write: callers load, mutate and save the
/// whole thing, and every mutation is persisted before the next scheduler
/// tick can read it. Writes are last-writer-wins.
pub trait SettingsStore: Send + Sync {
    /// Loads the document, falling back to defaults when none was saved.
    fn load(&self) -> Result<BookingSettings, SettingsError>;

    /// Replaces the whole document.
    fn save(&self, settings: &BookingSettings) -> Result<(), SettingsError>;
}
