use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Layout problems found while building a [`crate::Schema`]. Fatal for a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("layout defines no fields")]
    EmptyLayout,

    #[error("field #{index} has an empty name")]
    EmptyFieldName { index: usize },

    #[error("duplicate field name: {name}")]
    DuplicateField { name: String },

    #[error("field '{field}' has negative start offset {start}")]
    NegativeOffset { field: String, start: i64 },

    #[error("field '{field}' has invalid length {length} (must be positive)")]
    InvalidLength { field: String, length: i64 },

    #[error("field '{field}' has unknown type '{kind}'")]
    UnknownKind { field: String, kind: String },

    #[error("decimal field '{field}' is missing required 'scale'")]
    MissingScale { field: String },

    #[error("field '{field}' has scale {scale}, expected 0..=28")]
    ScaleOutOfRange { field: String, scale: i64 },

    #[error("field '{field}' of type {kind} cannot have a non-zero scale")]
    ScaleNotApplicable { field: String, kind: String },

    #[error("field '{field}' ends at {end}, beyond record length {record_length}")]
    FieldBeyondRecord {
        field: String,
        end: usize,
        record_length: usize,
    },
}

/// Failures of the input source itself. Fatal for a run, never per-line.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("data file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied reading {path}")]
    PermissionDenied { path: PathBuf },

    #[error("line {line_number} is not valid UTF-8")]
    Encoding { line_number: usize },

    #[error("failed to read {}: {source}", describe_path(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
}

impl DataSourceError {
    /// Classify an I/O error raised while opening or reading `path`.
    pub fn from_io(path: Option<PathBuf>, source: io::Error) -> Self {
        match (source.kind(), path) {
            (io::ErrorKind::NotFound, Some(path)) => Self::NotFound { path },
            (io::ErrorKind::PermissionDenied, Some(path)) => Self::PermissionDenied { path },
            (_, path) => Self::Io { path, source },
        }
    }
}

fn describe_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "input".to_string(), |path| path.display().to_string())
}

/// Why a numeric field could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericFault {
    #[error("field is blank")]
    Blank,
    #[error("sign without digits")]
    MissingDigits,
    #[error("non-digit character '{0}'")]
    NonDigit(char),
    #[error("negative sign on unsigned field")]
    NegativeUnsigned,
    #[error("value exceeds supported precision")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("line is truncated ({required} characters required, {actual} present)")]
    TruncatedLine { required: usize, actual: usize },

    #[error("invalid numeric value: {fault}")]
    InvalidNumeric { fault: NumericFault },

    #[error("unknown field kind '{kind}'")]
    UnknownFieldKind { kind: String },
}

/// A single line failed to decode. No partial record exists when this is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': {kind} (raw '{raw}')")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub line_number: usize,
    pub field: String,
    /// The field's raw slice (possibly partial for truncated lines).
    pub raw: String,
    /// The whole line, terminator stripped.
    pub raw_line: String,
}

impl DecodeError {
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::TruncatedLine { .. })
    }
}
