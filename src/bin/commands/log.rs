use anyhow::Result;
use clap::Args;
use pipedb::{DbLogger, LogLevel, LogSink, PipedbConfig, StreamClassifier};

/// Arguments for the Log command
#[derive(Args)]
pub struct LogArgs {
    /// Severity: info, warn, or error
    #[clap(short, long, default_value = "info")]
    pub level: LogLevel,

    /// Component tag, defaults to the configured component
    #[clap(short = 't', long)]
    pub component: Option<String>,

    /// Message text; multiple words are joined with spaces
    #[clap(required = true)]
    pub message: Vec<String>,
}

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C, args: LogArgs) -> Result<()> {
    let LogArgs {
        level,
        component,
        message,
    } = args;
    let component = component.unwrap_or_else(|| config.component.clone());
    let message = message.join(" ");

    super::with_session(config, classifier, |session| {
        let logger = DbLogger::new(Some(session.connection()), component);
        logger.log(level, &message);
        Ok(())
    })
}
