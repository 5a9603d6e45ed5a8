//! Library side of the `cbk` command-line tool.

pub mod logging;
pub mod pipeline;
