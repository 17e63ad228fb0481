//! Pipeline database session
//!
//! A `PipeSession` owns one transient SQLite file for the lifetime of a
//! process invocation: it is filled from the input stream on acquire, used
//! through the connection, and either streamed to the output or thrown away.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use crate::database::core::{DatabaseConn, SchemaManager, SchemaStatus};
use crate::error::{PipeDbError, Result};

use super::classifier::{Endpoint, StreamClassifier, StreamKind};

/// Advisory written to the diagnostic channel when output is withheld
pub const TERMINAL_NOTICE: [&str; 2] = [
    "stdout is a terminal, skipping database output",
    "pipe to a file or another component to capture the database",
];

/// Default file name prefix for backing stores
pub const DEFAULT_STORE_PREFIX: &str = "pipedb-";

/// Where and how backing stores are allocated
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Scratch directory holding backing stores
    pub dir: PathBuf,
    /// File name prefix; a random suffix and `.db` are appended
    pub prefix: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            dir: std::env::temp_dir(),
            prefix: DEFAULT_STORE_PREFIX.to_string(),
        }
    }
}

impl StoreOptions {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }
}

/// What `emit` did with the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Database bytes were streamed to the output
    Written { bytes: u64 },
    /// Output was a terminal, nothing was written
    Withheld,
}

/// One acquire..emit/discard cycle over a private backing store
///
/// The backing store file is removed when the session is emitted, discarded,
/// or dropped, whichever comes first.
pub struct PipeSession {
    // declared before `store` so the connection closes before the file is removed
    db: DatabaseConn,
    store: TempPath,
}

impl PipeSession {
    /// Acquire a session from an input stream
    ///
    /// A piped input is copied byte-for-byte into a fresh backing store; a
    /// terminal input is never read and the session starts from an empty
    /// database. The schema is bootstrapped before returning. On any failure
    /// the backing store is removed.
    pub fn acquire<R>(input: &mut R, kind: StreamKind, options: &StoreOptions) -> Result<Self>
    where
        R: Read + ?Sized,
    {
        let mut file = tempfile::Builder::new()
            .prefix(&options.prefix)
            .suffix(".db")
            .tempfile_in(&options.dir)
            .map_err(|source| PipeDbError::StoreAllocation {
                dir: options.dir.clone(),
                source,
            })?;
        debug!("allocated backing store {}", file.path().display());

        match kind {
            StreamKind::Piped => {
                let bytes =
                    io::copy(input, file.as_file_mut()).map_err(PipeDbError::InputTransfer)?;
                debug!("read {} bytes from input stream", bytes);
            }
            StreamKind::Terminal => {
                debug!("input is a terminal, starting from an empty database");
            }
        }

        let store = file.into_temp_path();
        let db = DatabaseConn::open(&store)?;

        let schema = SchemaManager::new(&db.conn);
        match schema.check_status() {
            Ok(SchemaStatus::NotInitialized) => info!("initializing empty database schema"),
            Ok(status @ SchemaStatus::Incompatible { .. }) => {
                warn!("input database schema is {}, continuing", status)
            }
            Ok(status) => debug!("input database schema is {}", status),
            Err(e) => debug!("schema status check failed: {}", e),
        }
        schema.initialize()?;

        Ok(Self { db, store })
    }

    /// Acquire from the process stdin, classified by `classifier`
    pub fn open_stdio<C>(classifier: &C, options: &StoreOptions) -> Result<Self>
    where
        C: StreamClassifier + ?Sized,
    {
        let kind = classifier.classify(Endpoint::Stdin);
        let stdin = io::stdin();
        let mut input = stdin.lock();
        Self::acquire(&mut input, kind, options)
    }

    /// Database handle for the session
    pub fn connection(&self) -> &Connection {
        &self.db.conn
    }

    /// Location of the backing store
    pub fn path(&self) -> &Path {
        &self.store
    }

    /// Emit the database to `output`
    ///
    /// For a piped output the connection is closed first so every write is in
    /// the file, then the file is copied to `output`. For a terminal output
    /// nothing is written there and the two-line notice goes to
    /// `diagnostics` instead. The backing store is removed in both cases,
    /// including when streaming fails.
    pub fn emit<W, D>(
        self,
        output: &mut W,
        kind: StreamKind,
        diagnostics: &mut D,
    ) -> Result<EmitOutcome>
    where
        W: Write + ?Sized,
        D: Write + ?Sized,
    {
        let PipeSession { db, store } = self;

        let outcome = match kind {
            StreamKind::Terminal => {
                if let Err(e) = db.close() {
                    debug!("closing database with withheld output: {}", e);
                }
                for line in TERMINAL_NOTICE {
                    if let Err(e) = writeln!(diagnostics, "{}", line) {
                        debug!("writing terminal notice: {}", e);
                    }
                }
                Ok(EmitOutcome::Withheld)
            }
            StreamKind::Piped => stream_out(db, &store, output),
        };

        remove_store(store);
        outcome
    }

    /// Emit to the process stdout, with notices on stderr
    pub fn emit_stdio<C>(self, classifier: &C) -> Result<EmitOutcome>
    where
        C: StreamClassifier + ?Sized,
    {
        let kind = classifier.classify(Endpoint::Stdout);
        let stdout = io::stdout();
        let mut output = stdout.lock();
        let stderr = io::stderr();
        let mut diagnostics = stderr.lock();
        self.emit(&mut output, kind, &mut diagnostics)
    }

    /// Close the connection and remove the backing store without output
    pub fn discard(self) {
        let PipeSession { db, store } = self;
        if let Err(e) = db.close() {
            debug!("closing discarded database: {}", e);
        }
        remove_store(store);
    }
}

fn stream_out<W>(db: DatabaseConn, path: &Path, output: &mut W) -> Result<EmitOutcome>
where
    W: Write + ?Sized,
{
    db.close()
        .map_err(|e| PipeDbError::output_transfer("closing database before output", e))?;

    let mut file = File::open(path)
        .map_err(|e| PipeDbError::output_transfer("opening database file for output", e))?;
    let bytes = io::copy(&mut file, output)
        .map_err(|e| PipeDbError::output_transfer("writing database to output", e))?;
    output
        .flush()
        .map_err(|e| PipeDbError::output_transfer("flushing output", e))?;

    debug!("wrote {} bytes to output stream", bytes);
    Ok(EmitOutcome::Written { bytes })
}

fn remove_store(store: TempPath) {
    let path = store.to_path_buf();
    if let Err(e) = store.close() {
        warn!("failed to remove backing store {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::tables::{IdentRecord, IdentRepository, ScriptRecord, ScriptRepository};
    use std::io::Cursor;

    /// Reader that must never be touched
    struct UntouchableReader;

    impl Read for UntouchableReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("terminal input must not be read");
        }
    }

    /// Reader that yields some bytes and then fails
    struct BrokenReader {
        sent: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "upstream died"));
            }
            self.sent = true;
            let n = buf.len().min(16);
            buf[..n].fill(b'x');
            Ok(n)
        }
    }

    /// Writer that always fails
    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "downstream closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    fn acquire_bytes(bytes: Vec<u8>, options: &StoreOptions) -> Result<PipeSession> {
        PipeSession::acquire(&mut Cursor::new(bytes), StreamKind::Piped, options)
    }

    fn emit_bytes(session: PipeSession) -> Vec<u8> {
        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        let outcome = session
            .emit(&mut output, StreamKind::Piped, &mut diagnostics)
            .unwrap();
        assert_eq!(
            outcome,
            EmitOutcome::Written {
                bytes: output.len() as u64
            }
        );
        assert!(diagnostics.is_empty());
        output
    }

    fn sample_script(dataset_id: i64, verse: &str) -> ScriptRecord {
        ScriptRecord {
            dataset_id,
            book_id: "JHN".to_string(),
            chapter_num: 3,
            chapter_end: 3,
            verse_str: verse.to_string(),
            verse_end: verse.to_string(),
            verse_num: verse.parse().unwrap_or(0),
            audio_file: "B04___03_John________ENGWEBN2DA.mp3".to_string(),
            script_num: format!("3_{}", verse),
            script_text: "For God so loved the world".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_terminal_input_is_never_read() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let session =
            PipeSession::acquire(&mut UntouchableReader, StreamKind::Terminal, &options).unwrap();
        let status = SchemaManager::new(session.connection())
            .check_status()
            .unwrap();
        assert_eq!(status, SchemaStatus::Current);
        assert_eq!(IdentRepository::new(session.connection()).count().unwrap(), 0);

        session.discard();
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_empty_piped_input_creates_schema() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let session = acquire_bytes(Vec::new(), &options).unwrap();
        assert!(session.path().starts_with(dir.path()));
        let name = session.path().file_name().unwrap().to_string_lossy();
        assert!(name.starts_with(DEFAULT_STORE_PREFIX));
        assert!(name.ends_with(".db"));

        let status = SchemaManager::new(session.connection())
            .check_status()
            .unwrap();
        assert_eq!(status, SchemaStatus::Current);
    }

    #[test]
    fn test_store_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let first = acquire_bytes(Vec::new(), &options).unwrap();
        let second = acquire_bytes(Vec::new(), &options).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_pass_through_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let first = emit_bytes(acquire_bytes(Vec::new(), &options).unwrap());
        assert!(!first.is_empty());

        let second = emit_bytes(acquire_bytes(first.clone(), &options).unwrap());
        assert_eq!(first, second);
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_round_trip_between_stages() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let stage_one = acquire_bytes(Vec::new(), &options).unwrap();
        IdentRepository::new(stage_one.connection())
            .insert(&IdentRecord::new("ENGWEB"))
            .unwrap();
        let bytes = emit_bytes(stage_one);

        let stage_two = acquire_bytes(bytes, &options).unwrap();
        let idents = IdentRepository::new(stage_two.connection()).list().unwrap();
        assert_eq!(idents.len(), 1);
        assert_eq!(idents[0].bible_id, "ENGWEB");

        stage_two.discard();
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_terminal_output_is_withheld() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());
        let session = acquire_bytes(Vec::new(), &options).unwrap();
        let path = session.path().to_path_buf();

        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        let outcome = session
            .emit(&mut output, StreamKind::Terminal, &mut diagnostics)
            .unwrap();

        assert_eq!(outcome, EmitOutcome::Withheld);
        assert!(output.is_empty());
        let notice = String::from_utf8(diagnostics).unwrap();
        assert_eq!(notice.lines().collect::<Vec<_>>(), TERMINAL_NOTICE.to_vec());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_output_still_removes_store() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());
        let session = acquire_bytes(Vec::new(), &options).unwrap();
        let path = session.path().to_path_buf();

        let result = session.emit(&mut BrokenWriter, StreamKind::Piped, &mut io::sink());
        match result {
            Err(PipeDbError::OutputTransfer { stage, .. }) => {
                assert_eq!(stage, "writing database to output")
            }
            other => panic!("expected output transfer error, got {:?}", other),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_broken_input_removes_store() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let result =
            PipeSession::acquire(&mut BrokenReader { sent: false }, StreamKind::Piped, &options);
        assert!(matches!(result, Err(PipeDbError::InputTransfer(_))));
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_non_database_input_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());

        let result = acquire_bytes(vec![0xAB; 4096], &options);
        assert!(matches!(result, Err(PipeDbError::Connection { .. })));
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_conflicting_schema_is_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upstream.sqlite3");
        {
            let conn = Connection::open(&source).unwrap();
            conn.execute_batch("CREATE TABLE ident (dataset_id INTEGER PRIMARY KEY)")
                .unwrap();
        }
        let bytes = std::fs::read(&source).unwrap();
        std::fs::remove_file(&source).unwrap();

        let options = StoreOptions::in_dir(dir.path());
        let result = acquire_bytes(bytes, &options);
        assert!(matches!(result, Err(PipeDbError::Schema { .. })));
        assert!(is_empty_dir(dir.path()));
    }

    #[test]
    fn test_missing_scratch_dir_is_allocation_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path().join("does-not-exist"));

        let result = acquire_bytes(Vec::new(), &options);
        assert!(matches!(result, Err(PipeDbError::StoreAllocation { .. })));
    }

    #[test]
    fn test_drop_removes_store() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(dir.path());
        let session = acquire_bytes(Vec::new(), &options).unwrap();
        let path = session.path().to_path_buf();
        assert!(path.exists());

        drop(session);
        assert!(!path.exists());
    }

    #[test]
    fn test_foreign_key_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let session = acquire_bytes(Vec::new(), &StoreOptions::in_dir(dir.path())).unwrap();

        let result = ScriptRepository::new(session.connection()).insert(&sample_script(999, "16"));
        assert!(result.is_err());
    }

    #[test]
    fn test_duplicate_verse_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let session = acquire_bytes(Vec::new(), &StoreOptions::in_dir(dir.path())).unwrap();
        let conn = session.connection();

        let dataset_id = IdentRepository::new(conn)
            .insert(&IdentRecord::new("ENGWEB"))
            .unwrap();
        let scripts = ScriptRepository::new(conn);
        scripts.insert(&sample_script(dataset_id, "16")).unwrap();

        let mut duplicate = sample_script(dataset_id, "16");
        duplicate.script_num = "3_16b".to_string();
        assert!(scripts.insert(&duplicate).is_err());
        assert_eq!(scripts.count().unwrap(), 1);
    }
}
