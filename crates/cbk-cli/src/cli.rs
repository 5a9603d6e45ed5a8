//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cbk",
    version,
    about = "Convert fixed-width copybook records to JSON",
    long_about = "Convert fixed-width (COBOL copybook style) record files to JSON.\n\n\
                  Fields are sliced by a JSON layout, coerced to text, exact decimals\n\
                  or integers, and passed through configurable validation rules.\n\
                  Lines that fail are reported separately with their line number."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow raw record text in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert a data file to JSON records.
    Run(RunArgs),

    /// Validate a layout file and print its fields.
    Check(CheckArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Layout file (JSON list of fields with name, start, length, type, scale).
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,

    /// Fixed-width data file.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Rule configuration file (JSON list of rules).
    #[arg(long = "rules", value_name = "FILE", conflicts_with = "reference_rules")]
    pub rules: Option<PathBuf>,

    /// Apply the built-in customer-record rules.
    #[arg(long = "reference-rules")]
    pub reference_rules: bool,

    /// Write records here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write the error report here (default: <DATA stem>.errors.json next to
    /// the records file, or next to DATA). Only created when some line fails.
    #[arg(long = "errors", value_name = "FILE")]
    pub errors: Option<PathBuf>,

    /// Stop after this many failed lines (0 for no limit).
    #[arg(long = "max-errors", value_name = "N")]
    pub max_errors: Option<usize>,

    /// Treat short lines as padded with spaces instead of failing them.
    #[arg(long = "pad-short-lines")]
    pub pad_short_lines: bool,

    /// Whitespace trimming for text fields.
    #[arg(long = "trim", value_enum, default_value = "both")]
    pub trim: TrimArg,

    /// Accept unknown field types; lines then fail at decode time.
    #[arg(long = "defer-unknown-kinds")]
    pub defer_unknown_kinds: bool,

    /// Decode on all cores. Output order is unchanged.
    #[arg(long = "parallel")]
    pub parallel: bool,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Layout file to validate.
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,

    /// Accept unknown field types.
    #[arg(long = "defer-unknown-kinds")]
    pub defer_unknown_kinds: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TrimArg {
    Both,
    Leading,
    Trailing,
    None,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
