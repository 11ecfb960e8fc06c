//! Persisted booking settings: credentials, seat preferences, schedules.

mod sqlite;
mod store;
mod types;

pub use sqlite::SqliteSettingsStore;
pub use store::{SettingsError, SettingsStore};
pub use types::{AdvancedUpdate, BookingSettings, Credentials, CustomSchedule, SelectionUpdate};
