//! Rendering of status page responses for the inspection commands.
//!
//! Every response renders as YAML, JSON or plain text tables.

mod table;

pub use table::Tables;

use chrono::SecondsFormat;
use serde::Serialize;
use statuswatch_types::Timestamp;

use crate::error::Result;

/// Output format of the inspection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Format {
    Yaml,
    Json,
    #[default]
    Table,
}

/// Render `target` in `format`.
pub fn render<T: Serialize + Tables>(target: &T, format: Format) -> Result<String> {
    match format {
        Format::Yaml => Ok(serde_yaml::to_string(target)?),
        Format::Json => {
            let mut out = serde_json::to_string_pretty(target)?;
            out.push('\n');
            Ok(out)
        }
        Format::Table => Ok(target.tables()),
    }
}

/// RFC 3339 in UTC to the second, or `-` when unset.
pub fn format_timestamp(at: Option<Timestamp>) -> String {
    match at {
        Some(at) => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => "-".to_string(),
    }
}
