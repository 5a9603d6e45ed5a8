//! `cbk` command-line tool.

use std::io::{self, IsTerminal};

use clap::{ColorChoice, Parser};
use cbk_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_check, run_run};
use crate::summary::print_summary;

/// Every line converted.
const EXIT_OK: i32 = 0;
/// Layout, rules, data source or output failure.
const EXIT_FATAL: i32 = 1;
/// Finished, but some lines were rejected.
const EXIT_LINE_ERRORS: i32 = 2;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FATAL);
    }
    let exit_code = match cli.command {
        Command::Run(args) => match run_run(&args) {
            Ok(outcome) => {
                print_summary(&outcome);
                if outcome.has_errors() {
                    EXIT_LINE_ERRORS
                } else {
                    EXIT_OK
                }
            }
            Err(err) => fatal(&err),
        },
        Command::Check(args) => match run_check(&args) {
            Ok(()) => EXIT_OK,
            Err(err) => fatal(&err),
        },
    };
    std::process::exit(exit_code);
}

fn fatal(err: &anyhow::Error) -> i32 {
    eprintln!("error: {err:#}");
    EXIT_FATAL
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.log_data = cli.log_data;
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
