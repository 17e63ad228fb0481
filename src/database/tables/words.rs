//! Word alignment repository

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// Token type used for ordinary words
pub const WORD_TOKEN: &str = "W";

/// A row of the `words` table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordRecord {
    /// Assigned by the database; ignored on insert
    pub word_id: i64,
    pub script_id: i64,
    pub word_seq: i64,
    pub verse_num: i64,
    pub ttype: String,
    pub word: String,
    pub uroman: String,
    pub word_begin_ts: f64,
    pub word_end_ts: f64,
    pub fa_score: f64,
    pub word_enc: String,
    pub src_word_enc: String,
    pub word_multi_enc: String,
    pub src_word_multi_enc: String,
}

impl Default for WordRecord {
    fn default() -> Self {
        Self {
            word_id: 0,
            script_id: 0,
            word_seq: 0,
            verse_num: 0,
            ttype: WORD_TOKEN.to_string(),
            word: String::new(),
            uroman: String::new(),
            word_begin_ts: 0.0,
            word_end_ts: 0.0,
            fa_score: 0.0,
            word_enc: String::new(),
            src_word_enc: String::new(),
            word_multi_enc: String::new(),
            src_word_multi_enc: String::new(),
        }
    }
}

impl WordRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            word_id: row.get(0)?,
            script_id: row.get(1)?,
            word_seq: row.get(2)?,
            verse_num: row.get(3)?,
            ttype: row.get(4)?,
            word: row.get(5)?,
            uroman: row.get(6)?,
            word_begin_ts: row.get(7)?,
            word_end_ts: row.get(8)?,
            fa_score: row.get(9)?,
            word_enc: row.get(10)?,
            src_word_enc: row.get(11)?,
            word_multi_enc: row.get(12)?,
            src_word_multi_enc: row.get(13)?,
        })
    }
}

/// Repository for word rows
pub struct WordRepository<'a> {
    conn: &'a Connection,
}

impl<'a> WordRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a word, returning its `word_id`
    pub fn insert(&self, record: &WordRecord) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO words (script_id, word_seq, verse_num, ttype, word, uroman,
                    word_begin_ts, word_end_ts, fa_score, word_enc, src_word_enc,
                    word_multi_enc, src_word_multi_enc)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    record.script_id,
                    record.word_seq,
                    record.verse_num,
                    record.ttype,
                    record.word,
                    record.uroman,
                    record.word_begin_ts,
                    record.word_end_ts,
                    record.fa_score,
                    record.word_enc,
                    record.src_word_enc,
                    record.word_multi_enc,
                    record.src_word_multi_enc,
                ],
            )
            .map_err(|e| {
                anyhow!(
                    "Failed to insert word {} of script {}: {}",
                    record.word_seq,
                    record.script_id,
                    e
                )
            })?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Words of one script segment ordered by sequence number
    pub fn list_for_script(&self, script_id: i64) -> Result<Vec<WordRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT word_id, script_id, word_seq, verse_num, ttype, word, uroman,
                word_begin_ts, word_end_ts, fa_score, word_enc, src_word_enc,
                word_multi_enc, src_word_multi_enc
             FROM words WHERE script_id = ?1 ORDER BY word_seq",
        )?;
        let records = stmt
            .query_map([script_id], WordRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| anyhow!("Failed to list words of script {}: {}", script_id, e))?;
        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get word count: {}", e))?;
        Ok(count)
    }
}
