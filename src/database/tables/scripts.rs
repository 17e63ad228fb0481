//! Script segment repository

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// A row of the `scripts` table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScriptRecord {
    /// Assigned by the database; ignored on insert
    pub script_id: i64,
    pub dataset_id: i64,
    pub book_id: String,
    pub chapter_num: i64,
    pub chapter_end: i64,
    pub verse_str: String,
    pub verse_end: String,
    pub verse_num: i64,
    pub audio_file: String,
    pub script_num: String,
    pub usfm_style: String,
    pub person: String,
    pub actor: String,
    pub script_text: String,
    pub uroman: String,
    pub script_begin_ts: f64,
    pub script_end_ts: f64,
    pub fa_score: f64,
}

impl ScriptRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            script_id: row.get(0)?,
            dataset_id: row.get(1)?,
            book_id: row.get(2)?,
            chapter_num: row.get(3)?,
            chapter_end: row.get(4)?,
            verse_str: row.get(5)?,
            verse_end: row.get(6)?,
            verse_num: row.get(7)?,
            audio_file: row.get(8)?,
            script_num: row.get(9)?,
            usfm_style: row.get(10)?,
            person: row.get(11)?,
            actor: row.get(12)?,
            script_text: row.get(13)?,
            uroman: row.get(14)?,
            script_begin_ts: row.get(15)?,
            script_end_ts: row.get(16)?,
            fa_score: row.get(17)?,
        })
    }
}

const SELECT_SCRIPTS: &str = "SELECT script_id, dataset_id, book_id, chapter_num, chapter_end,
        verse_str, verse_end, verse_num, audio_file, script_num, usfm_style, person, actor,
        script_text, uroman, script_begin_ts, script_end_ts, fa_score
    FROM scripts";

/// Repository for script segments
pub struct ScriptRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ScriptRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a script segment, returning its `script_id`
    ///
    /// The owning dataset must exist and (book, chapter, verse start) must be
    /// unused.
    pub fn insert(&self, record: &ScriptRecord) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO scripts (dataset_id, book_id, chapter_num, chapter_end, verse_str,
                    verse_end, verse_num, audio_file, script_num, usfm_style, person, actor,
                    script_text, uroman, script_begin_ts, script_end_ts, fa_score)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    record.dataset_id,
                    record.book_id,
                    record.chapter_num,
                    record.chapter_end,
                    record.verse_str,
                    record.verse_end,
                    record.verse_num,
                    record.audio_file,
                    record.script_num,
                    record.usfm_style,
                    record.person,
                    record.actor,
                    record.script_text,
                    record.uroman,
                    record.script_begin_ts,
                    record.script_end_ts,
                    record.fa_score,
                ],
            )
            .map_err(|e| {
                anyhow!(
                    "Failed to insert script {} {}:{}: {}",
                    record.book_id,
                    record.chapter_num,
                    record.verse_str,
                    e
                )
            })?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find_by_script_num(&self, script_num: &str) -> Result<Vec<ScriptRecord>> {
        self.query_where("script_num = ?1", script_num)
    }

    pub fn find_by_audio_file(&self, audio_file: &str) -> Result<Vec<ScriptRecord>> {
        self.query_where("audio_file = ?1", audio_file)
    }

    /// All segments of one dataset, in insertion order
    pub fn list_for_dataset(&self, dataset_id: i64) -> Result<Vec<ScriptRecord>> {
        self.query_where("dataset_id = ?1", dataset_id)
    }

    pub fn count(&self) -> Result<u64> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scripts", [], |row| row.get(0))
            .map_err(|e| anyhow!("Failed to get script count: {}", e))?;
        Ok(count)
    }

    fn query_where<P: rusqlite::ToSql>(&self, condition: &str, value: P) -> Result<Vec<ScriptRecord>> {
        let query = format!("{} WHERE {} ORDER BY script_id", SELECT_SCRIPTS, condition);
        let mut stmt = self.conn.prepare(&query)?;
        let records = stmt
            .query_map([value], ScriptRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| anyhow!("Failed to query scripts: {}", e))?;
        Ok(records)
    }
}
