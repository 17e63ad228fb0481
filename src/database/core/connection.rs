//! Database connection management
//!
//! This module provides the connection wrapper used by pipeline sessions.

use crate::error::{PipeDbError, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Core database connection wrapper
///
/// `DatabaseConn` provides a thin wrapper around a SQLite connection that is
/// configured the same way for every pipeline stage: foreign keys enforced
/// and temporary tables kept in memory. The journal mode is left at SQLite's
/// default rollback journal so that a closed store is a single
/// self-contained file that can be streamed to the next stage.
pub struct DatabaseConn {
    pub conn: Connection,
    path: Option<PathBuf>,
}

impl DatabaseConn {
    /// Open the database file at `path` and verify it answers a query
    pub fn open(path: &Path) -> Result<Self> {
        let connection_error = |source| PipeDbError::Connection {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(connection_error)?;
        let db = DatabaseConn {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.configure().map_err(connection_error)?;
        db.ping().map_err(connection_error)?;
        Ok(db)
    }

    /// Create an in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let connection_error = |source| PipeDbError::Connection {
            path: PathBuf::from(":memory:"),
            source,
        };

        let conn = Connection::open_in_memory().map_err(connection_error)?;
        let db = DatabaseConn { conn, path: None };
        db.configure().map_err(connection_error)?;
        Ok(db)
    }

    fn configure(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA temp_store = MEMORY;",
        )
    }

    /// Round-trip query against the schema table
    ///
    /// Opening a SQLite file is lazy; reading `sqlite_master` forces the
    /// header to be parsed so a non-database input is rejected here.
    pub fn ping(&self) -> rusqlite::Result<()> {
        let _: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get(0))?;
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Close the connection, flushing any pending state to the file
    pub fn close(self) -> rusqlite::Result<()> {
        self.conn.close().map_err(|(_, e)| e)
    }
}
