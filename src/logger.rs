//! Log sinks that record into the database
//!
//! Pipeline stages keep their audit trail inside the database they pass
//! along, so the final stage's output carries the log of every stage.
//!
//! | Level | `log` row | diagnostic line |
//! |-------|-----------|-----------------|
//! | info  | yes       | no              |
//! | warn  | yes       | no              |
//! | error | yes       | yes             |
//! | fatal | yes       | yes, then a [`PipeDbError::Fatal`] is returned |
//!
//! A failed insert never propagates; it is reported on the diagnostic
//! channel instead.

use std::cell::RefCell;
use std::io::{self, Write};

use rusqlite::Connection;

use crate::database::LogRepository;
use crate::error::PipeDbError;

/// Severity stored in the `level` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "Unknown log level '{}'. Valid levels: info, warn, error",
                s
            )),
        }
    }
}

/// Minimal logging capability used by pipeline stages
pub trait LogSink {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);

    /// Record `message` at error level and hand back a fatal error for the
    /// caller to propagate. Only the outermost entry point should exit.
    fn fatal(&self, message: &str) -> PipeDbError;

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => self.info(message),
            LogLevel::Warn => self.warn(message),
            LogLevel::Error => self.error(message),
        }
    }
}

/// Log sink writing rows into the `log` table
///
/// Without a connection every operation is a no-op apart from `fatal`
/// still returning its error.
pub struct DbLogger<'a, W: Write = io::Stderr> {
    conn: Option<&'a Connection>,
    component: String,
    diagnostics: RefCell<W>,
}

impl<'a> DbLogger<'a, io::Stderr> {
    /// Logger echoing to the process stderr
    pub fn new(conn: Option<&'a Connection>, component: impl Into<String>) -> Self {
        Self::with_diagnostics(conn, component, io::stderr())
    }
}

impl<'a, W: Write> DbLogger<'a, W> {
    pub fn with_diagnostics(
        conn: Option<&'a Connection>,
        component: impl Into<String>,
        diagnostics: W,
    ) -> Self {
        Self {
            conn,
            component: component.into(),
            diagnostics: RefCell::new(diagnostics),
        }
    }

    /// Give back the diagnostic writer
    pub fn into_diagnostics(self) -> W {
        self.diagnostics.into_inner()
    }

    fn insert(&self, level: LogLevel, message: &str) {
        let Some(conn) = self.conn else {
            return;
        };
        if let Err(e) = LogRepository::new(conn).insert(&self.component, level.as_str(), message) {
            self.diagnostic(format_args!(
                "WARN [{}]: failed to write log to db: {}",
                self.component, e
            ));
        }
    }

    fn diagnostic(&self, line: std::fmt::Arguments<'_>) {
        let mut out = self.diagnostics.borrow_mut();
        // nowhere left to report a broken diagnostic channel
        let _ = writeln!(out, "{}", line);
    }
}

impl<W: Write> LogSink for DbLogger<'_, W> {
    fn info(&self, message: &str) {
        self.insert(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.insert(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        if self.conn.is_none() {
            return;
        }
        self.insert(LogLevel::Error, message);
        self.diagnostic(format_args!("ERROR [{}]: {}", self.component, message));
    }

    fn fatal(&self, message: &str) -> PipeDbError {
        self.error(message);
        PipeDbError::Fatal {
            component: self.component.clone(),
            message: message.to_string(),
        }
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Default)]
pub struct NullLogger {
    pub component: String,
}

impl LogSink for NullLogger {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}

    fn fatal(&self, message: &str) -> PipeDbError {
        PipeDbError::Fatal {
            component: self.component.clone(),
            message: message.to_string(),
        }
    }
}

/// Sink collecting entries in memory
#[derive(Debug, Default)]
pub struct MemoryLogger {
    pub component: String,
    entries: RefCell<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            entries: RefCell::new(Vec::new()),
        }
    }

    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.borrow().clone()
    }
}

impl LogSink for MemoryLogger {
    fn info(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push((LogLevel::Info, message.to_string()));
    }

    fn warn(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push((LogLevel::Warn, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.entries
            .borrow_mut()
            .push((LogLevel::Error, message.to_string()));
    }

    fn fatal(&self, message: &str) -> PipeDbError {
        self.error(message);
        PipeDbError::Fatal {
            component: self.component.clone(),
            message: message.to_string(),
        }
    }
}
