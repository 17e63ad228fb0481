//! Database module
//!
//! This module provides all database functionality for pipedb, organized into:
//!
//! - **core**: SQLite connection wrapper and schema management
//! - **session**: Acquire/emit of a database over standard streams
//! - **tables**: Typed repositories for the schema's tables
//!
//! # Architecture
//!
//! ```text
//! database/
//! ├── core/           # Foundation
//! │   ├── connection  # SQLite DatabaseConn wrapper
//! │   └── schema      # Schema definitions and bootstrap
//! │
//! ├── session/        # One process invocation
//! │   ├── classifier  # Terminal vs. pipe detection
//! │   └── pipe_session# Acquire / emit / discard
//! │
//! └── tables/         # Repositories
//!     ├── ident       # Dataset identity
//!     ├── scripts     # Script segments
//!     ├── words       # Word alignments
//!     └── log         # Audit trail
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use pipedb::database::{IdentRecord, IdentRepository, PipeSession, StoreOptions, TerminalClassifier};
//!
//! # fn main() -> anyhow::Result<()> {
//! let classifier = TerminalClassifier;
//! let session = PipeSession::open_stdio(&classifier, &StoreOptions::default())?;
//!
//! IdentRepository::new(session.connection()).insert(&IdentRecord::new("ENGWEB"))?;
//!
//! session.emit_stdio(&classifier)?;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod session;
pub mod tables;

pub use core::{
    DatabaseConn, SchemaDefinitions, SchemaManager, SchemaStatus, REQUIRED_TABLES,
    SCHEMA_VERSION,
};

pub use session::{
    EmitOutcome, Endpoint, FixedClassifier, PipeSession, StoreOptions, StreamClassifier,
    StreamKind, TerminalClassifier, DEFAULT_STORE_PREFIX, TERMINAL_NOTICE,
};

pub use tables::{
    IdentRecord, IdentRepository, LogRecord, LogRepository, ScriptRecord, ScriptRepository,
    WordRecord, WordRepository, WORD_TOKEN,
};
