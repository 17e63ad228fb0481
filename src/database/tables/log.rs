//! Log table repository
//!
//! The `log` table is an append-only audit trail with no relationship to the
//! other tables. Rows are normally written through [`crate::logger::DbLogger`].

use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// Format SQLite's `datetime('now')` produces
const SQLITE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A row of the `log` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub log_id: i64,
    pub component: String,
    pub level: String,
    pub message: String,
    /// UTC insertion time, `None` if the stored text is not a SQLite datetime
    pub created_at: Option<NaiveDateTime>,
}

impl LogRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(4)?;
        Ok(Self {
            log_id: row.get(0)?,
            component: row.get(1)?,
            level: row.get(2)?,
            message: row.get(3)?,
            created_at: NaiveDateTime::parse_from_str(&created_at, SQLITE_DATETIME_FORMAT).ok(),
        })
    }
}

pub struct LogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LogRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append an entry; the timestamp is filled in by the database
    pub fn insert(&self, component: &str, level: &str, message: &str) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO log (component, level, message) VALUES (?1, ?2, ?3)",
                params![component, level, message],
            )
            .map_err(|e| anyhow!("Failed to insert log entry: {}", e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All entries in insertion order
    pub fn list(&self) -> Result<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, component, level, message, created_at FROM log ORDER BY log_id",
        )?;
        let records = stmt
            .query_map([], LogRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| anyhow!("Failed to list log entries: {}", e))?;
        Ok(records)
    }

    /// Entries with the given level (case-insensitive), in insertion order
    pub fn list_by_level(&self, level: &str) -> Result<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT log_id, component, level, message, created_at FROM log
             WHERE UPPER(level) = UPPER(?1) ORDER BY log_id",
        )?;
        let records = stmt
            .query_map([level], LogRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| anyhow!("Failed to list {} log entries: {}", level, e))?;
        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM log", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get log count: {}", e))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::core::{DatabaseConn, SchemaManager};

    fn setup() -> DatabaseConn {
        let db = DatabaseConn::open_in_memory().unwrap();
        SchemaManager::new(&db.conn).initialize().unwrap();
        db
    }

    #[test]
    fn test_insert_sets_timestamp() {
        let db = setup();
        let repo = LogRepository::new(&db.conn);

        repo.insert("align", "INFO", "started").unwrap();
        let entries = repo.list().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].component, "align");
        assert_eq!(entries[0].message, "started");
        assert!(entries[0].created_at.is_some());
    }

    #[test]
    fn test_unparseable_timestamp_is_none() {
        let db = setup();
        db.conn
            .execute(
                "INSERT INTO log (component, level, message, created_at) VALUES ('a', 'INFO', 'm', 'yesterday')",
                [],
            )
            .unwrap();

        let entries = LogRepository::new(&db.conn).list().unwrap();
        assert_eq!(entries[0].created_at, None);
    }

    #[test]
    fn test_list_by_level() {
        let db = setup();
        let repo = LogRepository::new(&db.conn);

        repo.insert("align", "INFO", "one").unwrap();
        repo.insert("align", "ERROR", "two").unwrap();
        repo.insert("align", "INFO", "three").unwrap();

        let infos: Vec<String> = repo
            .list_by_level("info")
            .unwrap()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(infos, vec!["one", "three"]);
        assert_eq!(repo.count().unwrap(), 3);
    }
}
