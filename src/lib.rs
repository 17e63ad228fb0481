#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! pipedb - pass a SQLite database through a shell pipeline
//!
//! Each pipeline stage reads a serialized SQLite database on stdin, works on
//! it, and writes the updated database to stdout:
//!
//! ```text
//! pipedb init | stage-a | stage-b > result.db
//! ```
//!
//! A stage whose stdin is a terminal starts from an empty database instead
//! of waiting for input, and a stage whose stdout is a terminal prints a
//! notice on stderr instead of writing binary data to the screen.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | (none) | Library: sessions, schema, repositories, log sink | `rusqlite`, `tempfile` |
//! | `display` | Table formatting with `tabled` | `tabled` |
//! | `cli` | The `pipedb` binary | All above + `clap`, `tracing-subscriber` |
//!
//! # Architecture
//!
//! - **[`database`]**: Session lifecycle, schema, and table repositories
//!   - `core`: SQLite connection wrapper and schema bootstrap
//!   - `session`: Acquire from / emit to byte streams
//!   - `tables`: Typed records for `ident`, `scripts`, `words`, `log`
//! - **[`logger`]**: `LogSink` trait and the table-backed `DbLogger`
//! - **[`files`]**: Directory listing by file suffix
//! - **[`utils`]**: String helpers
//! - **[`config`]**: Configuration management
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pipedb::{DbLogger, LogSink, PipeSession, StoreOptions, TerminalClassifier};
//!
//! # fn main() -> anyhow::Result<()> {
//! let classifier = TerminalClassifier;
//! let session = PipeSession::open_stdio(&classifier, &StoreOptions::default())?;
//!
//! let logger = DbLogger::new(Some(session.connection()), "my-stage");
//! logger.info("stage started");
//! drop(logger);
//!
//! session.emit_stdio(&classifier)?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod files;
pub mod logger;
pub mod output;
pub mod utils;

// =============================================================================
// Configuration
// =============================================================================

pub use config::PipedbConfig;

// =============================================================================
// Errors
// =============================================================================

pub use error::{PipeDbError, Result};

// =============================================================================
// Database Module - Re-export commonly used types
// =============================================================================

// Session lifecycle
pub use database::{
    EmitOutcome, Endpoint, FixedClassifier, PipeSession, StoreOptions, StreamClassifier,
    StreamKind, TerminalClassifier,
};

// Core database types
pub use database::{DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, SCHEMA_VERSION};

// Table repositories
pub use database::{
    IdentRecord, IdentRepository, LogRecord, LogRepository, ScriptRecord, ScriptRepository,
    WordRecord, WordRepository,
};

// =============================================================================
// Collaborators
// =============================================================================

pub use files::read_dir_with_suffix;
pub use logger::{DbLogger, LogLevel, LogSink, MemoryLogger, NullLogger};
pub use output::OutputFormat;
pub use utils::zero_fill;
