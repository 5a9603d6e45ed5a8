//! Worker-pool variant of the batch loop.
//!
//! Lines are read on the calling thread in chunks, decoded on the rayon pool,
//! and merged back in line order by the single [`Collector`]. Results match
//! the sequential loop exactly, error limit included.

use cbk_model::{BatchOptions, DataSourceError, Schema};
use cbk_validate::RuleEngine;
use rayon::prelude::*;
use tracing::trace;

use crate::batch::Collector;
use crate::line::{LineOutcome, process_line};

/// Lines read before a chunk is handed to the pool.
pub(crate) const CHUNK_LINES: usize = 4096;

pub(crate) fn run<I>(
    schema: &Schema,
    rules: &RuleEngine,
    mut lines: I,
    options: &BatchOptions,
    collector: &mut Collector,
) -> Result<(), DataSourceError>
where
    I: Iterator<Item = Result<String, DataSourceError>>,
{
    loop {
        let first_line = collector.next_line_number();
        let mut chunk = Vec::with_capacity(CHUNK_LINES);
        let mut failure = None;
        for line in lines.by_ref() {
            match line {
                Ok(line) => chunk.push(line),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
            if chunk.len() == CHUNK_LINES {
                break;
            }
        }
        if chunk.is_empty() && failure.is_none() {
            return Ok(());
        }
        let exhausted = chunk.len() < CHUNK_LINES;
        trace!(first_line, lines = chunk.len(), "processing chunk");

        let outcomes: Vec<LineOutcome> = chunk
            .par_iter()
            .enumerate()
            .map(|(offset, line)| {
                process_line(schema, rules, &options.decode, first_line + offset, line)
            })
            .collect();

        for outcome in outcomes {
            if collector.push(outcome).is_break() {
                // The sequential loop would never have read past this line.
                return Ok(());
            }
        }
        if let Some(err) = failure {
            return Err(err);
        }
        if exhausted {
            return Ok(());
        }
    }
}
