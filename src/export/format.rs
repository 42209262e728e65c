//! Export format selection and output naming.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};

use crate::treehole::{PostId, TreeholeError};

/// Supported export formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// A single JSON document holding post, comments, and participants.
    #[default]
    Json,
    /// Machine-readable JSON Lines (one object per line).
    Jsonl,
}

impl ExportFormat {
    /// File extension used for generated file names.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = TreeholeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "json-lines" | "jsonlines" => Ok(Self::Jsonl),
            _ => Err(TreeholeError::Configuration {
                message: format!(
                    "unsupported export format '{s}': valid options are 'json' or 'jsonl'"
                ),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Builds the default output name, e.g. `PKU树洞#42-20250101_083000.json`.
#[must_use]
pub fn default_file_name<Tz>(pid: PostId, now: &DateTime<Tz>, format: ExportFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!(
        "PKU树洞#{pid}-{stamp}.{extension}",
        stamp = now.format("%Y%m%d_%H%M%S"),
        extension = format.extension()
    )
}
