//! Database schema management
//!
//! This module holds the fixed schema every pipeline stage shares. All tables
//! are `STRICT`, so type-mismatched values are rejected at insert time.

use crate::error::{PipeDbError, Result};
use rusqlite::Connection;
use tracing::debug;

/// Current schema version, stored in the SQLite `user_version` header field
/// Increment this when making breaking schema changes
pub const SCHEMA_VERSION: u32 = 1;

/// Tables every initialized store must contain
pub const REQUIRED_TABLES: [&str; 4] = ["ident", "scripts", "words", "log"];

/// Schema definitions for all tables in the pipeline database
pub struct SchemaDefinitions;

impl SchemaDefinitions {
    /// Dataset identity, one row per dataset
    pub const IDENT_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS ident (
            dataset_id INTEGER PRIMARY KEY AUTOINCREMENT,
            bible_id TEXT NOT NULL,
            audio_OT_id TEXT NOT NULL,
            audio_NT_id TEXT NOT NULL,
            text_OT_id TEXT NOT NULL,
            text_NT_id TEXT NOT NULL,
            text_source TEXT NOT NULL,
            language_iso TEXT NOT NULL,
            asr_language_iso TEXT NOT NULL DEFAULT '',
            version_code TEXT NOT NULL,
            language_id INTEGER NOT NULL,
            rolv_id INTEGER NOT NULL,
            alphabet TEXT NOT NULL,
            language_name TEXT NOT NULL,
            version_name TEXT NOT NULL
        ) STRICT
    "#;

    pub const IDENT_INDEXES: &'static [&'static str] =
        &["CREATE UNIQUE INDEX IF NOT EXISTS ident_bible_idx ON ident (bible_id)"];

    /// Script segments, verse-level text and audio alignment
    pub const SCRIPTS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS scripts (
            script_id INTEGER PRIMARY KEY AUTOINCREMENT,
            dataset_id INTEGER NOT NULL,
            book_id TEXT NOT NULL,
            chapter_num INTEGER NOT NULL,
            chapter_end INTEGER NOT NULL,
            verse_str TEXT NOT NULL,
            verse_end TEXT NOT NULL,
            verse_num INTEGER NOT NULL,
            audio_file TEXT NOT NULL,
            script_num TEXT NOT NULL,
            usfm_style TEXT NOT NULL DEFAULT '',
            person TEXT NOT NULL DEFAULT '',
            actor TEXT NOT NULL DEFAULT '',
            script_text TEXT NOT NULL,
            uroman TEXT NOT NULL DEFAULT '',
            script_begin_ts REAL NOT NULL DEFAULT 0.0,
            script_end_ts REAL NOT NULL DEFAULT 0.0,
            fa_score REAL NOT NULL DEFAULT 0.0,
            FOREIGN KEY(dataset_id) REFERENCES ident(dataset_id)
        ) STRICT
    "#;

    pub const SCRIPTS_INDEXES: &'static [&'static str] = &[
        "CREATE UNIQUE INDEX IF NOT EXISTS scripts_idx ON scripts (book_id, chapter_num, verse_str)",
        "CREATE INDEX IF NOT EXISTS script_num_idx ON scripts (script_num)",
        "CREATE INDEX IF NOT EXISTS scripts_file_idx ON scripts (audio_file)",
    ];

    /// Word-level alignment units
    pub const WORDS_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS words (
            word_id INTEGER PRIMARY KEY AUTOINCREMENT,
            script_id INTEGER NOT NULL,
            word_seq INTEGER NOT NULL,
            verse_num INTEGER NOT NULL,
            ttype TEXT NOT NULL DEFAULT 'W',
            word TEXT NOT NULL,
            uroman TEXT NOT NULL DEFAULT '',
            word_begin_ts REAL NOT NULL DEFAULT 0.0,
            word_end_ts REAL NOT NULL DEFAULT 0.0,
            fa_score REAL NOT NULL DEFAULT 0.0,
            word_enc TEXT NOT NULL DEFAULT '',
            src_word_enc TEXT NOT NULL DEFAULT '',
            word_multi_enc TEXT NOT NULL DEFAULT '',
            src_word_multi_enc TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(script_id) REFERENCES scripts(script_id)
        ) STRICT
    "#;

    pub const WORDS_INDEXES: &'static [&'static str] =
        &["CREATE UNIQUE INDEX IF NOT EXISTS words_idx ON words (script_id, word_seq)"];

    /// Free-standing audit trail written by log sinks
    pub const LOG_TABLE: &'static str = r#"
        CREATE TABLE IF NOT EXISTS log (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            component TEXT NOT NULL,
            level TEXT NOT NULL,
            message TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        ) STRICT
    "#;

    /// All bootstrap statements in dependency order, each with a label used
    /// in error messages
    pub fn statements() -> Vec<(&'static str, &'static str)> {
        let mut stmts = vec![("ident table", Self::IDENT_TABLE)];
        stmts.extend(Self::IDENT_INDEXES.iter().map(|s| ("ident index", *s)));
        stmts.push(("scripts table", Self::SCRIPTS_TABLE));
        stmts.extend(Self::SCRIPTS_INDEXES.iter().map(|s| ("scripts index", *s)));
        stmts.push(("words table", Self::WORDS_TABLE));
        stmts.extend(Self::WORDS_INDEXES.iter().map(|s| ("words index", *s)));
        stmts.push(("log table", Self::LOG_TABLE));
        stmts
    }
}

/// Schema manager for a pipeline database
///
/// Handles schema initialization and version checking.
pub struct SchemaManager<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaManager<'a> {
    /// Create a new schema manager for the given connection
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Initialize the database schema
    ///
    /// Creates all tables and indexes if they don't exist. Safe to run
    /// against a store produced by an earlier pipeline stage: statements
    /// for existing objects are no-ops and the version is only written when
    /// it is behind, so an up-to-date store is left untouched.
    pub fn initialize(&self) -> Result<()> {
        for (statement, sql) in SchemaDefinitions::statements() {
            self.conn
                .execute(sql, [])
                .map_err(|source| PipeDbError::Schema { statement, source })?;
        }

        let version = self
            .schema_version()
            .map_err(|source| PipeDbError::Schema {
                statement: "schema version lookup",
                source,
            })?;
        if version < SCHEMA_VERSION {
            debug!("stamping schema version {} (was {})", SCHEMA_VERSION, version);
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)
                .map_err(|source| PipeDbError::Schema {
                    statement: "schema version update",
                    source,
                })?;
        }

        Ok(())
    }

    /// Check the current schema status
    pub fn check_status(&self) -> rusqlite::Result<SchemaStatus> {
        let missing = self.missing_tables()?;
        if missing.len() == REQUIRED_TABLES.len() {
            return Ok(SchemaStatus::NotInitialized);
        }

        let version = self.schema_version()?;
        if version > SCHEMA_VERSION {
            return Ok(SchemaStatus::Incompatible {
                database_version: version,
                required_version: SCHEMA_VERSION,
            });
        }

        if missing.is_empty() {
            Ok(SchemaStatus::Current)
        } else {
            Ok(SchemaStatus::Incomplete { missing })
        }
    }

    /// Get the schema version stamped in the database header
    pub fn schema_version(&self) -> rusqlite::Result<u32> {
        self.conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
    }

    fn missing_tables(&self) -> rusqlite::Result<Vec<&'static str>> {
        let mut missing = Vec::new();
        for table in REQUIRED_TABLES {
            let exists: i32 = self.conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )?;
            if exists == 0 {
                missing.push(table);
            }
        }
        Ok(missing)
    }
}

/// Status of the database schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Database has none of the pipeline tables (fresh database)
    NotInitialized,

    /// All tables present and the version is supported
    Current,

    /// Some but not all tables exist
    Incomplete { missing: Vec<&'static str> },

    /// Database was stamped by a newer schema version
    Incompatible {
        database_version: u32,
        required_version: u32,
    },
}

impl std::fmt::Display for SchemaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaStatus::NotInitialized => write!(f, "not initialized"),
            SchemaStatus::Current => write!(f, "current"),
            SchemaStatus::Incomplete { missing } => {
                write!(f, "incomplete (missing: {})", missing.join(", "))
            }
            SchemaStatus::Incompatible {
                database_version,
                required_version,
            } => write!(
                f,
                "incompatible (database v{}, supported v{})",
                database_version, required_version
            ),
        }
    }
}
