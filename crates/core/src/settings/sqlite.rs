use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{BookingSettings, SettingsError, SettingsStore};

/// SQLite-backed settings store. The document lives in a single row as
/// one JSON blob; partial updates go through load-modify-save.
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    /// Create a new SQLite settings store, creating the database file and
    /// table if needed.
    pub fn new(path: &Path) -> Result<Self, SettingsError> {
        let conn = Connection::open(path).map_err(|e| SettingsError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite settings store (useful for testing).
    pub fn in_memory() -> Result<Self, SettingsError> {
        let conn =
            Connection::open_in_memory().map_err(|e| SettingsError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                data TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<BookingSettings, SettingsError> {
        let conn = self.conn.lock().unwrap();

        let data: Option<String> = conn
            .query_row("SELECT data FROM settings WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| SettingsError::Database(e.to_string()))?;

        let Some(data) = data else {
            return Ok(BookingSettings::default());
        };

        let mut settings: BookingSettings =
            serde_json::from_str(&data).map_err(|e| SettingsError::Serialization(e.to_string()))?;
        settings.normalize();
        Ok(settings)
    }

    fn save(&self, settings: &BookingSettings) -> Result<(), SettingsError> {
        let conn = self.conn.lock().unwrap();

        let data = serde_json::to_string(settings)
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;

        conn.execute(
            "INSERT INTO settings (id, data) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET data = excluded.data",
            params![data],
        )
        .map_err(|e| SettingsError::Database(e.to_string()))?;

        Ok(())
    }
}
