use anyhow::Result;
use clap::Args;
use pipedb::{LogLevel, LogRecord, LogRepository, OutputFormat, PipedbConfig, StreamClassifier};
use serde::Serialize;
use tabled::Tabled;

/// Arguments for the Logs command
#[derive(Args)]
pub struct LogsArgs {
    /// Only show entries of this level
    #[clap(short, long)]
    pub level: Option<LogLevel>,

    /// Output format: table (default), markdown, json, json-pretty, psv
    #[clap(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled, Serialize)]
struct LogRow {
    id: i64,
    time: String,
    component: String,
    level: String,
    message: String,
}

impl From<LogRecord> for LogRow {
    fn from(record: LogRecord) -> Self {
        LogRow {
            id: record.log_id,
            time: record
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            component: record.component,
            level: record.level,
            message: record.message,
        }
    }
}

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C, args: LogsArgs) -> Result<()> {
    super::consume_session(config, classifier, |session| {
        let repo = LogRepository::new(session.connection());
        let records = match args.level {
            Some(level) => repo.list_by_level(level.as_str())?,
            None => repo.list()?,
        };
        let rows: Vec<LogRow> = records.into_iter().map(LogRow::from).collect();

        println!("{}", args.format.render(&rows)?);
        Ok(())
    })
}
