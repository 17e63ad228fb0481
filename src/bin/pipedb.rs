use clap::{Parser, Subcommand};
use pipedb::{PipeDbError, PipedbConfig, TerminalClassifier};
use tracing::Level;

mod commands;

use commands::config::ConfigArgs;
use commands::ident::IdentArgs;
use commands::log::LogArgs;
use commands::logs::LogsArgs;
use commands::scan::ScanArgs;
use commands::stats::StatsArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.pipedb/pipedb.toml is used if present
    #[clap(short, long, global = true)]
    config: Option<String>,

    /// Print debug information to stderr
    #[clap(long, global = true)]
    debug: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a pipeline with an empty database, or pass a piped one through with the schema ensured.
    Init,

    /// Add a dataset identity row to the piped database.
    Ident(IdentArgs),

    /// Append an entry to the log table of the piped database.
    Log(LogArgs),

    /// Record the files of a directory that match a suffix in the log table.
    Scan(ScanArgs),

    /// Print schema status and row counts of the piped database (consumes it).
    Stats(StatsArgs),

    /// Print the log table of the piped database (consumes it).
    Logs(LogsArgs),

    /// Show the effective configuration or write a config template.
    Config(ConfigArgs),
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        // stdout carries database bytes, so diagnostics must stay on stderr
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    // `config --init` creates the file, so it must not require one to exist
    let loaded = match &cli.command {
        Commands::Config(args) if args.init => Ok(PipedbConfig::default()),
        _ => PipedbConfig::new(&cli.config),
    };
    let config = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let classifier = TerminalClassifier;

    let result = match cli.command {
        Commands::Init => commands::init::run(&config, &classifier),
        Commands::Ident(args) => commands::ident::run(&config, &classifier, args),
        Commands::Log(args) => commands::log::run(&config, &classifier, args),
        Commands::Scan(args) => commands::scan::run(&config, &classifier, args),
        Commands::Stats(args) => commands::stats::run(&config, &classifier, args),
        Commands::Logs(args) => commands::logs::run(&config, &classifier, args),
        Commands::Config(args) => commands::config::run(&config, &cli.config, args),
    };

    if let Err(e) = result {
        // fatal log entries have already been echoed by the logger
        let already_reported = e
            .downcast_ref::<PipeDbError>()
            .is_some_and(PipeDbError::is_fatal);
        if !already_reported {
            eprintln!("ERROR: {:#}", e);
        }
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_component_does_not_clash_with_config() {
        let cli = Cli::try_parse_from([
            "pipedb", "-c", "pipedb.toml", "log", "-t", "align", "-l", "warn", "short", "verse",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("pipedb.toml"));
        match cli.command {
            Commands::Log(args) => {
                assert_eq!(args.component.as_deref(), Some("align"));
                assert_eq!(args.level, pipedb::LogLevel::Warn);
                assert_eq!(args.message, vec!["short", "verse"]);
            }
            _ => panic!("expected log subcommand"),
        }

        let cli = Cli::try_parse_from([
            "pipedb", "scan", "audio", "-s", ".mp3", "-t", "scan", "-c", "other.toml",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("other.toml"));
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.component.as_deref(), Some("scan"));
                assert_eq!(args.width, 5);
            }
            _ => panic!("expected scan subcommand"),
        }
    }

    #[test]
    fn test_report_format_parsing() {
        let cli = Cli::try_parse_from(["pipedb", "stats", "-f", "json-pretty"]).unwrap();
        match cli.command {
            Commands::Stats(args) => assert_eq!(args.format, pipedb::OutputFormat::JsonPretty),
            _ => panic!("expected stats subcommand"),
        }
        assert!(Cli::try_parse_from(["pipedb", "logs", "-f", "xml"]).is_err());
    }
}
