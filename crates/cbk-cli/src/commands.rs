use anyhow::Result;
use cbk_cli::pipeline::{RuleSource, RunConfig, RunOutcome, load_schema, run_conversion};
use cbk_model::{
    BatchOptions, DecodeOptions, SchemaOptions, ShortLinePolicy, TrimPolicy, UnknownKindPolicy,
};

use crate::cli::{CheckArgs, RunArgs, TrimArg};
use crate::summary::print_layout;

pub fn run_run(args: &RunArgs) -> Result<RunOutcome> {
    let rules = match (&args.rules, args.reference_rules) {
        (Some(path), _) => RuleSource::File(path.clone()),
        (None, true) => RuleSource::Reference,
        (None, false) => RuleSource::None,
    };
    let decode = DecodeOptions::default()
        .with_short_lines(if args.pad_short_lines {
            ShortLinePolicy::Pad
        } else {
            ShortLinePolicy::Fail
        })
        .with_trim(trim_policy(args.trim));
    let config = RunConfig {
        rules,
        output: args.output.clone(),
        errors: args.errors.clone(),
        schema: schema_options(args.defer_unknown_kinds),
        batch: BatchOptions::default()
            .with_decode(decode)
            .with_max_errors(args.max_errors)
            .with_parallel(args.parallel),
        ..RunConfig::new(&args.layout, &args.data)
    };
    run_conversion(&config)
}

pub fn run_check(args: &CheckArgs) -> Result<()> {
    let schema = load_schema(&args.layout, &schema_options(args.defer_unknown_kinds))?;
    print_layout(&schema);
    Ok(())
}

fn schema_options(defer_unknown_kinds: bool) -> SchemaOptions {
    SchemaOptions::default().with_unknown_kinds(if defer_unknown_kinds {
        UnknownKindPolicy::Defer
    } else {
        UnknownKindPolicy::Reject
    })
}

fn trim_policy(arg: TrimArg) -> TrimPolicy {
    match arg {
        TrimArg::Both => TrimPolicy::Both,
        TrimArg::Leading => TrimPolicy::Leading,
        TrimArg::Trailing => TrimPolicy::Trailing,
        TrimArg::None => TrimPolicy::None,
    }
}
