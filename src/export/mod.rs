//! Thread export for downstream renderers.
//!
//! The aggregate is handed to an external renderer as data; this module only
//! serialises it. Two formats are supported:
//!
//! - **JSON**: one pretty-printed `{post, comments, users}` document
//! - **JSONL**: the post on the first line, then one comment per line
//!
//! Comments keep the order they were fetched in.

mod format;
mod json;

pub use format::{ExportFormat, default_file_name};
pub use json::{write_aggregate, write_aggregate_json, write_aggregate_jsonl};
