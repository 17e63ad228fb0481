use anyhow::Result;
use clap::Args;
use pipedb::{read_dir_with_suffix, zero_fill, DbLogger, LogSink, PipedbConfig, StreamClassifier};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Arguments for the Scan command
#[derive(Args)]
pub struct ScanArgs {
    /// Directory to list (not recursive)
    #[clap(name = "DIR")]
    pub dir: PathBuf,

    /// File name suffix to match, case-insensitive, e.g. .mp3
    #[clap(short, long)]
    pub suffix: String,

    /// Component tag, defaults to the configured component
    #[clap(short = 't', long)]
    pub component: Option<String>,

    /// Digits used to number the files
    #[clap(short, long, default_value_t = 5)]
    pub width: usize,
}

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C, args: ScanArgs) -> Result<()> {
    let component = args
        .component
        .unwrap_or_else(|| config.component.clone());

    super::with_session(config, classifier, |session| {
        record_files(
            session.connection(),
            &component,
            &args.dir,
            &args.suffix,
            args.width,
        )
    })
}

/// Log one numbered info entry per file in `dir` ending with `suffix`
///
/// An unreadable directory is fatal.
pub(crate) fn record_files(
    conn: &Connection,
    component: &str,
    dir: &Path,
    suffix: &str,
    width: usize,
) -> Result<()> {
    let logger = DbLogger::new(Some(conn), component);

    let files = match read_dir_with_suffix(dir, suffix) {
        Ok(files) => files,
        Err(e) => return Err(logger.fatal(&e.to_string()).into()),
    };

    if files.is_empty() {
        logger.warn(&format!(
            "no files ending in '{}' in {}",
            suffix,
            dir.display()
        ));
        return Ok(());
    }

    for (i, file) in files.iter().enumerate() {
        let number = zero_fill(&(i + 1).to_string(), width);
        logger.info(&format!("{} {}", number, file.display()));
    }
    logger.info(&format!(
        "found {} files ending in '{}' in {}",
        files.len(),
        suffix,
        dir.display()
    ));
    Ok(())
}
