//! Error types for the session lifecycle
//!
//! Each variant corresponds to one failure kind of the acquire/emit cycle so
//! callers can decide per kind whether to retry, report, or abort.

use std::path::PathBuf;

/// Result alias for lifecycle operations
pub type Result<T> = std::result::Result<T, PipeDbError>;

#[derive(Debug, thiserror::Error)]
pub enum PipeDbError {
    /// The scratch file backing the session could not be created
    #[error("creating backing store in '{dir}': {source}")]
    StoreAllocation {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copying the input stream into the backing store failed
    #[error("reading database from input stream: {0}")]
    InputTransfer(#[source] std::io::Error),

    /// The backing store could not be opened or did not answer a query
    #[error("opening database at '{path}': {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A schema bootstrap statement failed
    #[error("schema bootstrap failed on {statement}: {source}")]
    Schema {
        statement: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Closing, reopening, or streaming the backing store failed
    #[error("{stage}: {source}")]
    OutputTransfer {
        stage: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A directory listing could not be read
    #[error("reading directory {dir}: {source}")]
    DirectoryRead {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A fatal condition reported through a log sink
    #[error("fatal [{component}]: {message}")]
    Fatal { component: String, message: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl PipeDbError {
    pub(crate) fn output_transfer<E>(stage: &'static str, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::OutputTransfer {
            stage,
            source: source.into(),
        }
    }

    /// Whether this error came from a fatal log entry
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}
