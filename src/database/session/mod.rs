//! Stream-backed database sessions
//!
//! This module moves a SQLite database through a shell pipeline. Each
//! process invocation:
//! - acquires the database from stdin (or starts empty when stdin is a terminal)
//! - works on a private scratch copy through the session's connection
//! - emits the result to stdout (or withholds it when stdout is a terminal)
//!
//! Scratch copies are always removed at the end of the session, including
//! on error paths.

mod classifier;
mod pipe_session;

pub use classifier::{Endpoint, FixedClassifier, StreamClassifier, StreamKind, TerminalClassifier};
pub use pipe_session::{
    EmitOutcome, PipeSession, StoreOptions, DEFAULT_STORE_PREFIX, TERMINAL_NOTICE,
};
