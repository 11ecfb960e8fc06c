use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};

use super::{AuditEntry, AuditError, AuditStatus, AuditStore};

/// SQLite-backed audit store
pub struct SqliteAuditStore {
    conn: Mutex<Connection>,
}

impl SqliteAuditStore {
    /// Create a new SQLite audit store, creating the database file and
    /// tables if needed
    pub fn new(path: &Path) -> Result<Self, AuditError> {
        let conn = Connection::open(path).map_err(|e| AuditError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audit_entries (
                entry_id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                window TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                error TEXT,
                timestamp TEXT NOT NULL,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_entries_date ON audit_entries(date);
            CREATE INDEX IF NOT EXISTS idx_audit_entries_status ON audit_entries(status);
            CREATE INDEX IF NOT EXISTS idx_audit_entries_timestamp ON audit_entries(timestamp);
            "#,
        )
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite audit store (useful for testing)
    pub fn in_memory() -> Result<Self, AuditError> {
        let conn = Connection::open_in_memory().map_err(|e| AuditError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS audit_entries (
                entry_id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                window TEXT NOT NULL,
                status TEXT NOT NULL,
                message TEXT,
                error TEXT,
                timestamp TEXT NOT NULL,
                display_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_audit_entries_date ON audit_entries(date);
            CREATE INDEX IF NOT EXISTS idx_audit_entries_status ON audit_entries(status);
            CREATE INDEX IF NOT EXISTS idx_audit_entries_timestamp ON audit_entries(timestamp);
            "#,
        )
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_parts(
        row: &Row<'_>,
    ) -> rusqlite::Result<(
        String,
        String,
        String,
        String,
        Option<String>,
        Option<String>,
        String,
        String,
    )> {
        Ok((
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ))
    }

    fn parts_to_entry(
        (id, date, window, status, message, error, timestamp, display_date): (
            String,
            String,
            String,
            String,
            Option<String>,
            Option<String>,
            String,
            String,
        ),
    ) -> Result<AuditEntry, AuditError> {
        let date: NaiveDate = date
            .parse()
            .map_err(|e| AuditError::Database(format!("Invalid date: {}", e)))?;

        let status = AuditStatus::parse(&status)
            .ok_or_else(|| AuditError::Database(format!("Invalid status: {}", status)))?;

        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&timestamp)
            .map_err(|e| AuditError::Database(format!("Invalid timestamp: {}", e)))?
            .into();

        Ok(AuditEntry {
            id,
            date,
            window,
            status,
            message,
            error,
            timestamp,
            display_date,
        })
    }
}

const SELECT_COLUMNS: &str =
    "entry_id, date, window, status, message, error, timestamp, display_date";

impl AuditStore for SqliteAuditStore {
    fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO audit_entries (entry_id, date, window, status, message, error, timestamp, display_date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.date.to_string(),
                entry.window,
                entry.status.as_str(),
                entry.message,
                entry.error,
                entry.timestamp.to_rfc3339(),
                entry.display_date,
            ],
        )
        .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(())
    }

    fn recent(&self, limit: i64) -> Result<Vec<AuditEntry>, AuditError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM audit_entries ORDER BY timestamp DESC LIMIT ?"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], Self::row_to_parts)
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row_result in rows {
            let parts = row_result.map_err(|e| AuditError::Database(e.to_string()))?;
            entries.push(Self::parts_to_entry(parts)?);
        }

        Ok(entries)
    }

    fn for_date(&self, date: NaiveDate) -> Result<Vec<AuditEntry>, AuditError> {
        let conn = self.conn.lock().unwrap();

        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM audit_entries WHERE date = ? ORDER BY timestamp DESC"
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![date.to_string()], Self::row_to_parts)
            .map_err(|e| AuditError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row_result in rows {
            let parts = row_result.map_err(|e| AuditError::Database(e.to_string()))?;
            entries.push(Self::parts_to_entry(parts)?);
        }

        Ok(entries)
    }

    fn prune_older_than(&self, days: i64) -> Result<usize, AuditError> {
        let conn = self.conn.lock().unwrap();

        let cutoff = Utc::now() - Duration::days(days);
        let removed = conn
            .execute(
                "DELETE FROM audit_entries WHERE timestamp < ?",
                params![cutoff.to_rfc3339()],
            )
            .map_err(|e| AuditError::Database(e.to_string()))?;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteAuditStore {
        SqliteAuditStore::in_memory().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn success_entry(d: NaiveDate, window: &str) -> AuditEntry {
        AuditEntry::new(
            d,
            window,
            AuditStatus::Success,
            Some("رزرو با موفقیت انجام شد".to_string()),
            None,
        )
    }

    #[test]
    fn test_append_and_recent() {
        let store = create_test_store();
        let entry = success_entry(date(2025, 12, 9), "8-11");

        store.append(&entry).unwrap();

        let entries = store.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], entry);
    }

    #[test]
    fn test_recent_orders_newest_first_and_limits() {
        let store = create_test_store();

        let base = Utc::now();
        for i in 0..5 {
            let mut entry = success_entry(date(2025, 12, 9), "8-11");
            entry.id = format!("e-{}", i);
            entry.timestamp = base + Duration::seconds(i);
            store.append(&entry).unwrap();
        }

        let entries = store.recent(3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].id, "e-4");
        assert_eq!(entries[2].id, "e-2");
    }

    #[test]
    fn test_for_date_filters() {
        let store = create_test_store();

        store
            .append(&success_entry(date(2025, 12, 9), "8-11"))
            .unwrap();
        store
            .append(&success_entry(date(2025, 12, 9), "20-21"))
            .unwrap();
        store
            .append(&success_entry(date(2025, 12, 10), "8-11"))
            .unwrap();

        let entries = store.for_date(date(2025, 12, 9)).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.date == date(2025, 12, 9)));

        let entries = store.for_date(date(2025, 12, 11)).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_failed_entry_round_trips_error_text() {
        let store = create_test_store();
        let entry = AuditEntry::new(
            date(2025, 12, 9),
            "11-14",
            AuditStatus::Failed,
            None,
            Some("Portal request timed out".to_string()),
        );

        store.append(&entry).unwrap();

        let entries = store.recent(1).unwrap();
        assert_eq!(entries[0].status, AuditStatus::Failed);
        assert_eq!(
            entries[0].error.as_deref(),
            Some("Portal request timed out")
        );
        assert_eq!(entries[0].message, None);
    }

    #[test]
    fn test_prune_older_than() {
        let store = create_test_store();

        let mut old_entry = success_entry(date(2025, 9, 1), "8-11");
        old_entry.timestamp = Utc::now() - Duration::days(120);
        store.append(&old_entry).unwrap();

        let fresh_entry = success_entry(date(2025, 12, 9), "8-11");
        store.append(&fresh_entry).unwrap();

        let removed = store.prune_older_than(90).unwrap();
        assert_eq!(removed, 1);

        let entries = store.recent(10).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, fresh_entry.id);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let store = create_test_store();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO audit_entries (entry_id, date, window, status, message, error, timestamp, display_date)
                 VALUES ('x', '2025-12-09', '8-11', 'pending', NULL, NULL, ?, '1404/09/18')",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();
        }

        let err = store.recent(10).unwrap_err();
        assert!(err.to_string().contains("Invalid status"));
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let store = SqliteAuditStore::new(&db_path).unwrap();
        store
            .append(&success_entry(date(2025, 12, 9), "8-11"))
            .unwrap();

        assert!(db_path.exists());
        assert_eq!(store.recent(10).unwrap().len(), 1);
    }
}
