//! Batch processing of fixed-width record streams.
//!
//! [`process`] drives a line source through the decoder and the rule engine,
//! keeping successful records and per-line failures in two ordered lists.
//! Set [`BatchOptions::parallel`](cbk_model::BatchOptions) to spread the work
//! over a rayon pool; the merged result is identical to a sequential run.

mod batch;
mod line;
mod parallel;

pub use batch::{process, process_lines};
