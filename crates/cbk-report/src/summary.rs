use cbk_model::{BatchResult, ErrorCategory};
use serde::Serialize;

/// Counts describing one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub errors: usize,
    pub decode_errors: usize,
    pub validation_errors: usize,
    pub unexpected_errors: usize,
    pub warnings: usize,
    pub lines_read: usize,
    pub blank_lines: usize,
    pub truncated: bool,
}

impl RunSummary {
    pub fn from_result(result: &BatchResult) -> Self {
        Self {
            records: result.records.len(),
            errors: result.errors.len(),
            decode_errors: result.error_count(ErrorCategory::Decode),
            validation_errors: result.error_count(ErrorCategory::Validation),
            unexpected_errors: result.error_count(ErrorCategory::Unexpected),
            warnings: result.warnings.len(),
            lines_read: result.lines_read,
            blank_lines: result.blank_lines,
            truncated: result.truncated,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0
    }
}

impl From<&BatchResult> for RunSummary {
    fn from(result: &BatchResult) -> Self {
        Self::from_result(result)
    }
}
