//! Typed access to the pipeline tables
//!
//! Each repository borrows a connection (usually [`PipeSession::connection`])
//! and covers one table of the schema contract.
//!
//! [`PipeSession::connection`]: crate::database::PipeSession::connection

mod ident;
mod log;
mod scripts;
mod words;

pub use ident::{IdentRecord, IdentRepository};
pub use log::{LogRecord, LogRepository};
pub use scripts::{ScriptRecord, ScriptRepository};
pub use words::{WordRecord, WordRepository, WORD_TOKEN};
