//! Output rendering for batch results.
//!
//! Records and errors are rendered as two independent JSON documents. Exact
//! decimals are written as strings holding their literal digits.

pub mod json;
pub mod summary;

pub use json::{ReportError, errors_to_json, records_to_json, write_json_file, write_json_pretty};
pub use summary::RunSummary;
