//! Batch processing over a stream of lines.
//!
//! Each non-blank line is decoded and passed through the rule engine. Per-line
//! failures are collected next to the successful records; only a failure of
//! the line source itself ends the run with an error.

use std::ops::ControlFlow;
use std::time::Instant;

use cbk_model::{BatchOptions, BatchResult, DataSourceError, ProcessingError, Schema};
use cbk_validate::RuleEngine;
use tracing::{info, info_span, warn};

use crate::line::{LineOutcome, process_line};
use crate::parallel;

/// Process every line from `lines`.
///
/// Line numbers are 1-based and count blank lines, so they match the source
/// file. The first `Err` from `lines` aborts the batch and is returned as is.
pub fn process<I>(
    schema: &Schema,
    rules: &RuleEngine,
    lines: I,
    options: &BatchOptions,
) -> Result<BatchResult, DataSourceError>
where
    I: IntoIterator<Item = Result<String, DataSourceError>>,
{
    let span = info_span!(
        "batch",
        fields = schema.len(),
        rules = rules.len(),
        parallel = options.parallel,
        max_errors = ?options.error_limit()
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut collector = Collector::new(options.error_limit());
    if options.parallel {
        parallel::run(schema, rules, lines.into_iter(), options, &mut collector)?;
    } else {
        run_sequential(schema, rules, lines.into_iter(), options, &mut collector)?;
    }
    let result = collector.finish();

    info!(
        records = result.records.len(),
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        lines_read = result.lines_read,
        blank_lines = result.blank_lines,
        truncated = result.truncated,
        duration_ms = start.elapsed().as_millis(),
        "Finished processing"
    );
    Ok(result)
}

/// [`process`] over lines that cannot fail to read.
pub fn process_lines<'a, I>(
    schema: &Schema,
    rules: &RuleEngine,
    lines: I,
    options: &BatchOptions,
) -> BatchResult
where
    I: IntoIterator<Item = &'a str>,
{
    let lines = lines.into_iter().map(|line| Ok(line.to_string()));
    // The source never yields an error, so neither does the batch.
    process(schema, rules, lines, options).unwrap_or_default()
}

fn run_sequential<I>(
    schema: &Schema,
    rules: &RuleEngine,
    lines: I,
    options: &BatchOptions,
    collector: &mut Collector,
) -> Result<(), DataSourceError>
where
    I: Iterator<Item = Result<String, DataSourceError>>,
{
    for line in lines {
        let line = line?;
        let line_number = collector.next_line_number();
        let outcome = process_line(schema, rules, &options.decode, line_number, &line);
        if collector.push(outcome).is_break() {
            break;
        }
    }
    Ok(())
}

/// Folds line outcomes into a [`BatchResult`] in line order.
pub(crate) struct Collector {
    result: BatchResult,
    max_errors: Option<usize>,
}

impl Collector {
    pub(crate) fn new(max_errors: Option<usize>) -> Self {
        Self {
            result: BatchResult::default(),
            max_errors,
        }
    }

    /// Number the next line will carry.
    pub(crate) fn next_line_number(&self) -> usize {
        self.result.lines_read + 1
    }

    /// Record one outcome. Breaks once the error limit is reached.
    pub(crate) fn push(&mut self, outcome: LineOutcome) -> ControlFlow<()> {
        self.result.lines_read += 1;
        match outcome {
            LineOutcome::Blank => self.result.blank_lines += 1,
            LineOutcome::Record { record, warnings } => {
                self.result.records.push(record);
                self.result.warnings.extend(warnings);
            }
            LineOutcome::Failed(error) => return self.push_error(error),
        }
        ControlFlow::Continue(())
    }

    fn push_error(&mut self, error: ProcessingError) -> ControlFlow<()> {
        warn!(
            line_number = error.line_number,
            category = ?error.category,
            "{}",
            error.message
        );
        self.result.errors.push(error);
        match self.max_errors {
            Some(limit) if self.result.errors.len() >= limit => {
                self.result.truncated = true;
                info!(limit, lines_read = self.result.lines_read, "error limit reached, stopping");
                ControlFlow::Break(())
            }
            _ => ControlFlow::Continue(()),
        }
    }

    pub(crate) fn finish(self) -> BatchResult {
        self.result
    }
}
