use anyhow::{anyhow, Result};
use clap::Args;
use pipedb::PipedbConfig;
use std::path::PathBuf;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write a commented config template to the --config path or the default location
    #[clap(long)]
    pub init: bool,

    /// Print the effective configuration as JSON
    #[clap(long)]
    pub json: bool,
}

pub fn run(config: &PipedbConfig, config_path: &Option<String>, args: ConfigArgs) -> Result<()> {
    if args.init {
        let path = match config_path {
            Some(p) => PathBuf::from(p),
            None => PipedbConfig::config_file_path()
                .ok_or_else(|| anyhow!("Could not determine home directory"))?,
        };
        PipedbConfig::write_template(&path)?;
        eprintln!("Config template written to {}", path.display());
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", config.summary());
        let file = config_path
            .clone()
            .map(PathBuf::from)
            .or_else(PipedbConfig::config_file_path)
            .filter(|p| p.exists());
        match file {
            Some(p) => println!("Config File:        {}", p.display()),
            None => println!("Config File:        (none, using defaults)"),
        }
    }
    Ok(())
}
