use anyhow::Result;
use clap::Args;
use pipedb::{
    IdentRepository, LogRepository, OutputFormat, PipedbConfig, ScriptRepository,
    SchemaManager, StreamClassifier, WordRepository,
};
use serde::Serialize;
use tabled::Tabled;

/// Arguments for the Stats command
#[derive(Args)]
pub struct StatsArgs {
    /// Output format: table (default), markdown, json, json-pretty, psv
    #[clap(short, long, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Tabled, Serialize)]
struct TableCount {
    table: &'static str,
    rows: u64,
}

#[derive(Serialize)]
struct StatsReport {
    schema_status: String,
    schema_version: u32,
    tables: Vec<TableCount>,
}

pub fn run<C: StreamClassifier>(config: &PipedbConfig, classifier: &C, args: StatsArgs) -> Result<()> {
    super::consume_session(config, classifier, |session| {
        let conn = session.connection();
        let schema = SchemaManager::new(conn);
        let status = schema.check_status()?;
        let version = schema.schema_version()?;

        let counts = vec![
            TableCount {
                table: "ident",
                rows: IdentRepository::new(conn).count()?,
            },
            TableCount {
                table: "scripts",
                rows: ScriptRepository::new(conn).count()?,
            },
            TableCount {
                table: "words",
                rows: WordRepository::new(conn).count()?,
            },
            TableCount {
                table: "log",
                rows: LogRepository::new(conn).count()?,
            },
        ];

        if args.format.is_json() {
            let report = StatsReport {
                schema_status: status.to_string(),
                schema_version: version,
                tables: counts,
            };
            println!("{}", args.format.to_json(&report)?);
        } else {
            if args.format != OutputFormat::Psv {
                println!("Schema: {} (version {})", status, version);
                println!();
            }
            println!("{}", args.format.render(&counts)?);
        }
        Ok(())
    })
}
