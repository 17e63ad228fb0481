//! Rendering of report rows
//!
//! Reports are printed only by commands that consume the database instead of
//! emitting it, so they never share stdout with database bytes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How `stats` and `logs` print their rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Rounded-border table for reading in a terminal
    #[default]
    Table,
    Markdown,
    /// One JSON array on a single line
    Json,
    JsonPretty,
    /// `|`-separated header line, then one line per row
    Psv,
}

const FORMAT_NAMES: [(&str, OutputFormat); 5] = [
    ("table", OutputFormat::Table),
    ("markdown", OutputFormat::Markdown),
    ("json", OutputFormat::Json),
    ("json-pretty", OutputFormat::JsonPretty),
    ("psv", OutputFormat::Psv),
];

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::JsonPretty)
    }

    /// Serialize `value` as compact or pretty JSON
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            Self::JsonPretty => serde_json::to_string_pretty(value),
            _ => serde_json::to_string(value),
        }
    }

    /// Render rows in this format, without a trailing newline
    #[cfg(feature = "display")]
    pub fn render<T>(&self, rows: &[T]) -> serde_json::Result<String>
    where
        T: tabled::Tabled + Serialize,
    {
        use tabled::settings::Style;
        use tabled::Table;

        let text = match self {
            Self::Table => Table::new(rows).with(Style::rounded()).to_string(),
            Self::Markdown => Table::new(rows).with(Style::markdown()).to_string(),
            Self::Json | Self::JsonPretty => self.to_json(rows)?,
            Self::Psv => {
                let mut lines = vec![T::headers().join("|")];
                lines.extend(rows.iter().map(|row| row.fields().join("|")));
                lines.join("\n")
            }
        };
        Ok(text)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = FORMAT_NAMES
            .iter()
            .find(|(_, format)| format == self)
            .map(|(name, _)| *name)
            .unwrap_or_default();
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        FORMAT_NAMES
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, format)| *format)
            .ok_or_else(|| {
                let names: Vec<&str> = FORMAT_NAMES.iter().map(|(name, _)| *name).collect();
                format!("unknown format '{}', expected one of: {}", s, names.join(", "))
            })
    }
}
