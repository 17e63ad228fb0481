use anyhow::{anyhow, Result};
use config::Config;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::database::{StoreOptions, DEFAULT_STORE_PREFIX};

/// Default component tag for log entries written by the CLI
pub const DEFAULT_COMPONENT: &str = "pipedb";

#[derive(Debug, Clone, Serialize)]
pub struct PipedbConfig {
    /// Directory holding the transient backing stores
    pub scratch_dir: String,

    /// File name prefix for backing stores
    pub store_prefix: String,

    /// Component tag for log entries
    pub component: String,
}

pub const EMPTY_CONFIG: &str = r#"### pipedb configuration file

### directory for transient database copies (defaults to the system temp dir)
# scratch_dir = "/tmp"

### file name prefix of transient database copies
# store_prefix = "pipedb-"

### component name recorded in the log table
# component = "pipedb"
"#;

impl Default for PipedbConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().to_string_lossy().to_string(),
            store_prefix: DEFAULT_STORE_PREFIX.to_string(),
            component: DEFAULT_COMPONENT.to_string(),
        }
    }
}

impl PipedbConfig {
    /// Build the configuration from an optional file and the environment
    ///
    /// With `path` set, that file must exist. Otherwise `~/.pipedb/pipedb.toml`
    /// is read when present. Environment variables prefixed `PIPEDB_` (e.g.
    /// `PIPEDB_SCRATCH_DIR`) override file values.
    pub fn new(path: &Option<String>) -> Result<PipedbConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                if !Path::new(p.as_str()).exists() {
                    return Err(anyhow!("Config file '{}' does not exist", p));
                }
                builder = builder.add_source(config::File::with_name(p.as_str()));
            }
            None => {
                if let Some(default_path) = Self::config_file_path() {
                    if default_path.exists() {
                        builder = builder.add_source(config::File::from(default_path));
                    }
                }
            }
        }

        // E.g., `PIPEDB_SCRATCH_DIR=/dev/shm pipedb init` keeps stores in memory
        builder = builder.add_source(config::Environment::with_prefix("PIPEDB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let values = settings
            .try_deserialize::<HashMap<String, String>>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        Ok(Self::from_values(&values))
    }

    fn from_values(values: &HashMap<String, String>) -> PipedbConfig {
        let defaults = PipedbConfig::default();
        let pick = |key: &str, default: String| {
            values
                .get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        PipedbConfig {
            scratch_dir: pick("scratch_dir", defaults.scratch_dir),
            store_prefix: pick("store_prefix", defaults.store_prefix),
            component: pick("component", defaults.component),
        }
    }

    /// Backing store allocation settings
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            dir: PathBuf::from(&self.scratch_dir),
            prefix: self.store_prefix.clone(),
        }
    }

    /// Default config file location, `~/.pipedb/pipedb.toml`
    pub fn config_file_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pipedb").join("pipedb.toml"))
    }

    /// Write the commented template to `path`, creating parent directories
    pub fn write_template(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(anyhow!("Config file '{}' already exists", path.display()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow!("Unable to create config directory: {}", e))?;
        }
        std::fs::write(path, EMPTY_CONFIG)
            .map_err(|e| anyhow!("Unable to create config file {}: {}", path.display(), e))
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        [
            format!("Scratch Directory:  {}", self.scratch_dir),
            format!("Store Prefix:       {}", self.store_prefix),
            format!("Log Component:      {}", self.component),
        ]
        .join("\n")
    }
}
