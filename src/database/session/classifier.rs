//! Terminal detection for stream endpoints
//!
//! Whether a standard stream is attached to a terminal gates both ends of a
//! session: a terminal stdin is never read, and a terminal stdout never
//! receives database bytes.

use std::io::IsTerminal;

/// Classifier verdict for one stream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Interactive terminal
    Terminal,
    /// Pipe, regular file, or redirect
    Piped,
}

impl StreamKind {
    /// Classify any stream handle.
    ///
    /// A failed mode query reports "not a terminal", so unknown endpoints
    /// get pipe behavior.
    pub fn of<S: IsTerminal>(stream: &S) -> Self {
        if stream.is_terminal() {
            StreamKind::Terminal
        } else {
            StreamKind::Piped
        }
    }

    pub fn is_terminal(self) -> bool {
        self == StreamKind::Terminal
    }
}

/// Standard stream endpoints a session reads from or writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Stdin,
    Stdout,
}

/// Injectable terminal detection for the standard endpoints
pub trait StreamClassifier {
    fn classify(&self, endpoint: Endpoint) -> StreamKind;
}

/// Classifier backed by the real process streams
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalClassifier;

impl StreamClassifier for TerminalClassifier {
    fn classify(&self, endpoint: Endpoint) -> StreamKind {
        match endpoint {
            Endpoint::Stdin => StreamKind::of(&std::io::stdin()),
            Endpoint::Stdout => StreamKind::of(&std::io::stdout()),
        }
    }
}

/// Classifier with fixed verdicts, for tests and forced behavior
#[derive(Debug, Clone, Copy)]
pub struct FixedClassifier {
    pub input: StreamKind,
    pub output: StreamKind,
}

impl FixedClassifier {
    pub fn new(input: StreamKind, output: StreamKind) -> Self {
        Self { input, output }
    }

    /// Both endpoints piped, the usual middle-of-pipeline case
    pub fn piped() -> Self {
        Self::new(StreamKind::Piped, StreamKind::Piped)
    }
}

impl StreamClassifier for FixedClassifier {
    fn classify(&self, endpoint: Endpoint) -> StreamKind {
        match endpoint {
            Endpoint::Stdin => self.input,
            Endpoint::Stdout => self.output,
        }
    }
}
