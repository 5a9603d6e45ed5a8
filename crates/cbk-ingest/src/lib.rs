//! Fixed-width record ingestion.
//!
//! - **decoder**: slice a line by the schema and coerce each field
//! - **numeric**: exact decimal and unsigned integer parsing
//! - **source**: streaming line reader over files or any `BufRead`

pub mod decoder;
pub mod numeric;
pub mod source;

pub use decoder::{decode_line, raw_slice, strip_line_terminator};
pub use numeric::{parse_decimal, parse_unsigned};
pub use source::LineSource;
