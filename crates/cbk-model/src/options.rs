//! Configuration options for decoding and batch processing.

use serde::{Deserialize, Serialize};

/// What to do when a line is shorter than the schema requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortLinePolicy {
    /// Reject the line with a truncated-line error.
    #[default]
    Fail,
    /// Treat missing characters as spaces.
    Pad,
}

/// Whitespace trimming applied to text fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    #[default]
    Both,
    Leading,
    Trailing,
    None,
}

impl TrimPolicy {
    pub fn apply<'a>(&self, value: &'a str) -> &'a str {
        match self {
            Self::Both => value.trim(),
            Self::Leading => value.trim_start(),
            Self::Trailing => value.trim_end(),
            Self::None => value,
        }
    }
}

/// Options for the line decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    pub short_lines: ShortLinePolicy,
    pub trim: TrimPolicy,
}

impl DecodeOptions {
    pub fn with_short_lines(mut self, policy: ShortLinePolicy) -> Self {
        self.short_lines = policy;
        self
    }

    pub fn with_trim(mut self, trim: TrimPolicy) -> Self {
        self.trim = trim;
        self
    }
}

/// Options controlling a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOptions {
    pub decode: DecodeOptions,
    /// Stop once this many lines have failed. The partial result is kept and
    /// flagged as truncated. `Some(0)` means no limit.
    pub max_errors: Option<usize>,
    /// Decode and apply rules on a worker pool. Output order is unchanged.
    pub parallel: bool,
}

impl BatchOptions {
    pub fn with_decode(mut self, decode: DecodeOptions) -> Self {
        self.decode = decode;
        self
    }

    pub fn with_max_errors(mut self, limit: Option<usize>) -> Self {
        self.max_errors = limit;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// The effective error limit, if any.
    pub fn error_limit(&self) -> Option<usize> {
        self.max_errors.filter(|limit| *limit > 0)
    }
}
