//! Dataset identity repository
//!
//! One row per dataset, keyed by the unique `bible_id` business identifier.

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// A row of the `ident` table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IdentRecord {
    /// Assigned by the database; ignored on insert
    pub dataset_id: i64,
    pub bible_id: String,
    pub audio_ot_id: String,
    pub audio_nt_id: String,
    pub text_ot_id: String,
    pub text_nt_id: String,
    pub text_source: String,
    pub language_iso: String,
    pub asr_language_iso: String,
    pub version_code: String,
    pub language_id: i64,
    pub rolv_id: i64,
    pub alphabet: String,
    pub language_name: String,
    pub version_name: String,
}

impl IdentRecord {
    /// A record with only the business id set
    pub fn new(bible_id: impl Into<String>) -> Self {
        Self {
            bible_id: bible_id.into(),
            ..Default::default()
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            dataset_id: row.get(0)?,
            bible_id: row.get(1)?,
            audio_ot_id: row.get(2)?,
            audio_nt_id: row.get(3)?,
            text_ot_id: row.get(4)?,
            text_nt_id: row.get(5)?,
            text_source: row.get(6)?,
            language_iso: row.get(7)?,
            asr_language_iso: row.get(8)?,
            version_code: row.get(9)?,
            language_id: row.get(10)?,
            rolv_id: row.get(11)?,
            alphabet: row.get(12)?,
            language_name: row.get(13)?,
            version_name: row.get(14)?,
        })
    }
}

const SELECT_IDENT: &str = "SELECT dataset_id, bible_id, audio_OT_id, audio_NT_id, text_OT_id,
        text_NT_id, text_source, language_iso, asr_language_iso, version_code,
        language_id, rolv_id, alphabet, language_name, version_name
    FROM ident";

/// Repository for dataset identity rows
pub struct IdentRepository<'a> {
    conn: &'a Connection,
}

impl<'a> IdentRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a dataset identity, returning its `dataset_id`
    ///
    /// Fails if the `bible_id` is already present.
    pub fn insert(&self, record: &IdentRecord) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO ident (bible_id, audio_OT_id, audio_NT_id, text_OT_id, text_NT_id,
                    text_source, language_iso, asr_language_iso, version_code, language_id,
                    rolv_id, alphabet, language_name, version_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    record.bible_id,
                    record.audio_ot_id,
                    record.audio_nt_id,
                    record.text_ot_id,
                    record.text_nt_id,
                    record.text_source,
                    record.language_iso,
                    record.asr_language_iso,
                    record.version_code,
                    record.language_id,
                    record.rolv_id,
                    record.alphabet,
                    record.language_name,
                    record.version_name,
                ],
            )
            .map_err(|e| anyhow!("Failed to insert ident '{}': {}", record.bible_id, e))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lookup a dataset by its business id
    pub fn get_by_bible_id(&self, bible_id: &str) -> Result<Option<IdentRecord>> {
        let query = format!("{} WHERE bible_id = ?1", SELECT_IDENT);
        self.conn
            .query_row(&query, [bible_id], IdentRecord::from_row)
            .optional()
            .map_err(|e| anyhow!("Failed to lookup ident '{}': {}", bible_id, e))
    }

    /// All datasets in insertion order
    pub fn list(&self) -> Result<Vec<IdentRecord>> {
        let query = format!("{} ORDER BY dataset_id", SELECT_IDENT);
        let mut stmt = self.conn.prepare(&query)?;
        let records = stmt
            .query_map([], IdentRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| anyhow!("Failed to list idents: {}", e))?;
        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM ident", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get ident count: {}", e))?;
        Ok(count)
    }
}
