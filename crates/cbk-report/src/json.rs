//! JSON output for records and error reports.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cbk_model::{DecodedRecord, ProcessingError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Stream(#[source] std::io::Error),
}

/// Records as a JSON array of objects, fields in schema order.
pub fn records_to_json(records: &[DecodedRecord]) -> Result<Value, ReportError> {
    Ok(serde_json::to_value(records)?)
}

/// Errors as `[{line_number, error, raw_line}]`.
pub fn errors_to_json(errors: &[ProcessingError]) -> Result<Value, ReportError> {
    Ok(serde_json::to_value(errors)?)
}

/// Pretty-print `value` with two-space indentation and a trailing newline.
pub fn write_json_pretty<W, T>(mut writer: W, value: &T) -> Result<(), ReportError>
where
    W: Write,
    T: Serialize + ?Sized,
{
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n").map_err(ReportError::Stream)?;
    writer.flush().map_err(ReportError::Stream)
}

/// Pretty-print `value` into a file, creating parent directories as needed.
pub fn write_json_file<T>(path: &Path, value: &T) -> Result<(), ReportError>
where
    T: Serialize + ?Sized,
{
    let io_error = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    let file = File::create(path).map_err(io_error)?;
    match write_json_pretty(BufWriter::new(file), value) {
        Err(ReportError::Stream(source)) => Err(io_error(source)),
        other => {
            debug!(path = %path.display(), "wrote json report");
            other
        }
    }
}
