//! JSON and JSONL writers for thread aggregates.

use std::io::Write;

use crate::treehole::{Aggregate, TreeholeError};

use super::format::ExportFormat;

/// Writes the aggregate in the requested format.
///
/// # Errors
///
/// Returns [`TreeholeError::Io`] if serialisation or writing fails.
pub fn write_aggregate<W: Write>(
    writer: &mut W,
    aggregate: &Aggregate,
    format: ExportFormat,
) -> Result<(), TreeholeError> {
    match format {
        ExportFormat::Json => write_aggregate_json(writer, aggregate),
        ExportFormat::Jsonl => write_aggregate_jsonl(writer, aggregate),
    }
}

/// Writes the aggregate as one pretty-printed JSON document followed by a
/// newline.
///
/// # Errors
///
/// Returns [`TreeholeError::Io`] if serialisation or writing fails.
pub fn write_aggregate_json<W: Write>(
    writer: &mut W,
    aggregate: &Aggregate,
) -> Result<(), TreeholeError> {
    serde_json::to_writer_pretty(&mut *writer, aggregate).map_err(|e| TreeholeError::Io {
        message: format!("JSON serialization failed: {e}"),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Writes the post on the first line and each comment on its own line.
///
/// Participants are not written; they are derivable from the comment names.
///
/// # Errors
///
/// Returns [`TreeholeError::Io`] if serialisation or writing fails.
pub fn write_aggregate_jsonl<W: Write>(
    writer: &mut W,
    aggregate: &Aggregate,
) -> Result<(), TreeholeError> {
    write_line(writer, &aggregate.post)?;
    for comment in &aggregate.comments {
        write_line(writer, comment)?;
    }
    Ok(())
}

fn write_line<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> Result<(), TreeholeError> {
    serde_json::to_writer(&mut *writer, value).map_err(|e| TreeholeError::Io {
        message: format!("JSON serialization failed: {e}"),
    })?;
    writeln!(writer).map_err(|e| io_error(&e))
}

/// Converts an I/O error to a [`TreeholeError::Io`].
fn io_error(error: &std::io::Error) -> TreeholeError {
    TreeholeError::Io {
        message: error.to_string(),
    }
}
