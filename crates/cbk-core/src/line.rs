//! Processing of a single source line.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use cbk_ingest::{decode_line, strip_line_terminator};
use cbk_model::{DecodeOptions, DecodedRecord, ErrorCategory, ProcessingError, RecordWarning, Schema};
use cbk_validate::RuleEngine;
use tracing::warn;

/// What one line contributed to the batch.
#[derive(Debug)]
pub(crate) enum LineOutcome {
    Blank,
    Record {
        record: DecodedRecord,
        warnings: Vec<RecordWarning>,
    },
    Failed(ProcessingError),
}

/// Decode `line` and run the rules over it. Never panics and never fails:
/// every problem becomes a [`LineOutcome::Failed`]. A trailing `\n` or
/// `\r\n` is dropped first, so raw lines in errors never carry one.
pub(crate) fn process_line(
    schema: &Schema,
    rules: &RuleEngine,
    options: &DecodeOptions,
    line_number: usize,
    line: &str,
) -> LineOutcome {
    let line = strip_line_terminator(line);
    if line.trim().is_empty() {
        return LineOutcome::Blank;
    }
    isolate(line_number, line, || {
        decode_and_apply(schema, rules, options, line_number, line)
    })
}

fn decode_and_apply(
    schema: &Schema,
    rules: &RuleEngine,
    options: &DecodeOptions,
    line_number: usize,
    line: &str,
) -> LineOutcome {
    let mut record = match decode_line(line, schema, line_number, options) {
        Ok(record) => record,
        Err(err) => {
            return LineOutcome::Failed(ProcessingError::processing(
                line_number,
                err,
                line,
                ErrorCategory::Decode,
            ));
        }
    };
    match rules.apply(&mut record, line_number) {
        Ok(warnings) => LineOutcome::Record { record, warnings },
        Err(err) if err.is_validation() => LineOutcome::Failed(ProcessingError::processing(
            line_number,
            err,
            line,
            ErrorCategory::Validation,
        )),
        Err(err) => LineOutcome::Failed(ProcessingError::unexpected(line_number, err, line)),
    }
}

/// Run `stage`, turning a panic into a failed line.
pub(crate) fn isolate<F>(line_number: usize, line: &str, stage: F) -> LineOutcome
where
    F: FnOnce() -> LineOutcome,
{
    match panic::catch_unwind(AssertUnwindSafe(stage)) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            warn!(line_number, "line processing panicked: {detail}");
            LineOutcome::Failed(ProcessingError::unexpected(line_number, detail, line))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
