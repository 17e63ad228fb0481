pub mod config;
pub mod ident;
pub mod init;
pub mod log;
pub mod logs;
pub mod scan;
pub mod stats;

use anyhow::Result;
use pipedb::{
    Endpoint, EmitOutcome, PipeSession, PipedbConfig, StoreOptions, StreamClassifier,
};
use std::io::{self, Read, Write};
use tracing::debug;

/// Run `stage` on the database read from stdin, then emit it to stdout
pub(crate) fn with_session<C, F>(config: &PipedbConfig, classifier: &C, stage: F) -> Result<()>
where
    C: StreamClassifier,
    F: FnOnce(&PipeSession) -> Result<()>,
{
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_stage(
        &mut io::stdin().lock(),
        &mut stdout.lock(),
        &mut stderr.lock(),
        classifier,
        &config.store_options(),
        stage,
    )
}

/// Run `report` on the database read from stdin, then discard it
pub(crate) fn consume_session<C, F>(config: &PipedbConfig, classifier: &C, report: F) -> Result<()>
where
    C: StreamClassifier,
    F: FnOnce(&PipeSession) -> Result<()>,
{
    run_report(
        &mut io::stdin().lock(),
        classifier,
        &config.store_options(),
        report,
    )
}

/// Acquire from `input`, run `stage`, emit to `output`
///
/// A failing stage discards the session, so `output` receives nothing.
pub(crate) fn run_stage<R, W, D, C, F>(
    input: &mut R,
    output: &mut W,
    diagnostics: &mut D,
    classifier: &C,
    options: &StoreOptions,
    stage: F,
) -> Result<()>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
    D: Write + ?Sized,
    C: StreamClassifier + ?Sized,
    F: FnOnce(&PipeSession) -> Result<()>,
{
    let session = PipeSession::acquire(input, classifier.classify(Endpoint::Stdin), options)?;

    if let Err(e) = stage(&session) {
        session.discard();
        return Err(e);
    }

    match session.emit(output, classifier.classify(Endpoint::Stdout), diagnostics)? {
        EmitOutcome::Written { bytes } => debug!("emitted {} bytes", bytes),
        EmitOutcome::Withheld => debug!("output withheld, stdout is a terminal"),
    }
    Ok(())
}

pub(crate) fn run_report<R, C, F>(
    input: &mut R,
    classifier: &C,
    options: &StoreOptions,
    report: F,
) -> Result<()>
where
    R: Read + ?Sized,
    C: StreamClassifier + ?Sized,
    F: FnOnce(&PipeSession) -> Result<()>,
{
    let session = PipeSession::acquire(input, classifier.classify(Endpoint::Stdin), options)?;
    let result = report(&session);
    session.discard();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use pipedb::{
        FixedClassifier, IdentRecord, IdentRepository, LogRepository, PipeDbError, StreamKind,
    };
    use std::io::Cursor;
    use std::path::Path;

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    /// Run a stage over `input` with both ends piped, returning the output bytes
    fn piped_stage<F>(input: Vec<u8>, options: &StoreOptions, stage: F) -> (Result<()>, Vec<u8>)
    where
        F: FnOnce(&PipeSession) -> Result<()>,
    {
        let mut output = Vec::new();
        let mut diagnostics = Vec::new();
        let result = run_stage(
            &mut Cursor::new(input),
            &mut output,
            &mut diagnostics,
            &FixedClassifier::piped(),
            options,
            stage,
        );
        (result, output)
    }

    #[test]
    fn test_stage_output_feeds_next_stage() {
        let scratch = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(scratch.path());

        let (result, first) = piped_stage(Vec::new(), &options, |session| {
            IdentRepository::new(session.connection()).insert(&IdentRecord::new("ENGWEB"))?;
            Ok(())
        });
        result.unwrap();
        assert!(!first.is_empty());

        let mut bible_ids = Vec::new();
        run_report(
            &mut Cursor::new(first),
            &FixedClassifier::piped(),
            &options,
            |session| {
                for ident in IdentRepository::new(session.connection()).list()? {
                    bible_ids.push(ident.bible_id);
                }
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(bible_ids, vec!["ENGWEB"]);
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_failed_stage_writes_nothing() {
        let scratch = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(scratch.path());

        let (result, output) = piped_stage(Vec::new(), &options, |session| {
            IdentRepository::new(session.connection()).insert(&IdentRecord::new("ENGWEB"))?;
            Err(anyhow!("alignment failed"))
        });

        assert_eq!(result.unwrap_err().to_string(), "alignment failed");
        assert!(output.is_empty());
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_scan_of_missing_dir_is_fatal() {
        let scratch = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(scratch.path());
        let missing = scratch.path().join("no-such-audio");

        let (result, output) = piped_stage(Vec::new(), &options, |session| {
            scan::record_files(session.connection(), "scan", &missing, ".mp3", 5)
        });

        let err = result.unwrap_err();
        let fatal = err.downcast_ref::<PipeDbError>().unwrap();
        assert!(fatal.is_fatal());
        assert!(fatal.to_string().starts_with("fatal [scan]:"));
        assert!(output.is_empty());
        assert!(is_empty_dir(scratch.path()));
    }

    #[test]
    fn test_scan_logs_numbered_files() {
        let scratch = tempfile::tempdir().unwrap();
        let audio = tempfile::tempdir().unwrap();
        for name in ["B02.MP3", "B01.mp3", "notes.txt"] {
            std::fs::write(audio.path().join(name), b"").unwrap();
        }
        let options = StoreOptions::in_dir(scratch.path());

        let (result, output) = piped_stage(Vec::new(), &options, |session| {
            scan::record_files(session.connection(), "scan", audio.path(), ".mp3", 3)
        });
        result.unwrap();

        let mut messages = Vec::new();
        run_report(
            &mut Cursor::new(output),
            &FixedClassifier::piped(),
            &options,
            |session| {
                for entry in LogRepository::new(session.connection()).list()? {
                    messages.push(entry.message);
                }
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(messages.len(), 3);
        assert!(messages[0].starts_with("001 ") && messages[0].ends_with("B01.mp3"));
        assert!(messages[1].starts_with("002 ") && messages[1].ends_with("B02.MP3"));
        assert!(messages[2].starts_with("found 2 files"));
    }

    #[test]
    fn test_terminal_output_is_withheld() {
        let scratch = tempfile::tempdir().unwrap();
        let options = StoreOptions::in_dir(scratch.path());
        let mut output = Vec::new();
        let mut diagnostics = Vec::new();

        run_stage(
            &mut Cursor::new(Vec::new()),
            &mut output,
            &mut diagnostics,
            &FixedClassifier::new(StreamKind::Piped, StreamKind::Terminal),
            &options,
            |_| Ok(()),
        )
        .unwrap();

        assert!(output.is_empty());
        assert_eq!(String::from_utf8(diagnostics).unwrap().lines().count(), 2);
        assert!(is_empty_dir(scratch.path()));
    }
}
