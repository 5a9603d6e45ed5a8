//! Conversion run with explicit stages.
//!
//! 1. **Layout**: load the layout file and build the schema
//! 2. **Rules**: resolve the rule set
//! 3. **Process**: stream the data file through the batch processor
//! 4. **Output**: write records and, when there are any, the error report

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use cbk_core::process;
use cbk_ingest::LineSource;
use cbk_model::{BatchOptions, BatchResult, LayoutConfig, Schema, SchemaOptions};
use cbk_report::{RunSummary, write_json_file, write_json_pretty};
use cbk_validate::{RuleConfig, RuleEngine};
use tracing::{info, info_span, trace, warn};

use crate::logging::redact_value;

/// Where the rule set comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RuleSource {
    /// Decode only.
    #[default]
    None,
    /// The built-in customer-record rules.
    Reference,
    /// A JSON list of rule configurations.
    File(PathBuf),
}

/// Everything a conversion run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub layout: PathBuf,
    pub data: PathBuf,
    pub rules: RuleSource,
    /// Records file; stdout when `None`.
    pub output: Option<PathBuf>,
    /// Error report file, written only when some line failed. Defaults to
    /// [`default_error_report_path`].
    pub errors: Option<PathBuf>,
    pub schema: SchemaOptions,
    pub batch: BatchOptions,
}

impl RunConfig {
    pub fn new(layout: impl Into<PathBuf>, data: impl Into<PathBuf>) -> Self {
        Self {
            layout: layout.into(),
            data: data.into(),
            rules: RuleSource::None,
            output: None,
            errors: None,
            schema: SchemaOptions::default(),
            batch: BatchOptions::default(),
        }
    }
}

#[derive(Debug)]
pub struct RunOutcome {
    pub result: BatchResult,
    pub summary: RunSummary,
    /// Records file written, if any.
    pub output: Option<PathBuf>,
    /// Error report written, if any.
    pub errors: Option<PathBuf>,
}

impl RunOutcome {
    pub fn has_errors(&self) -> bool {
        self.result.has_errors()
    }
}

pub fn load_layout(path: &Path) -> Result<LayoutConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("read layout {}", path.display()))?;
    let layout: LayoutConfig = serde_json::from_str(&text)
        .with_context(|| format!("parse layout {}", path.display()))?;
    info!(path = %path.display(), fields = layout.fields.len(), "Loaded layout");
    Ok(layout)
}

/// Load a layout file and validate it into a schema. Overlapping fields are
/// allowed but logged.
pub fn load_schema(path: &Path, options: &SchemaOptions) -> Result<Schema> {
    let layout = load_layout(path)?;
    let schema = Schema::from_layout(&layout, options)
        .with_context(|| format!("invalid layout {}", path.display()))?;
    for overlap in schema.overlaps() {
        warn!(
            first = %overlap.first,
            second = %overlap.second,
            start = overlap.start,
            end = overlap.end,
            "fields overlap"
        );
    }
    Ok(schema)
}

pub fn load_rules(path: &Path) -> Result<RuleEngine> {
    let text = fs::read_to_string(path).with_context(|| format!("read rules {}", path.display()))?;
    let configs: Vec<RuleConfig> = serde_json::from_str(&text)
        .with_context(|| format!("parse rules {}", path.display()))?;
    let engine = RuleEngine::from_configs(&configs)
        .with_context(|| format!("invalid rules {}", path.display()))?;
    info!(path = %path.display(), rules = engine.len(), "Loaded rules");
    Ok(engine)
}

pub fn resolve_rules(source: &RuleSource) -> Result<RuleEngine> {
    match source {
        RuleSource::None => Ok(RuleEngine::new()),
        RuleSource::Reference => Ok(RuleEngine::reference_rules()),
        RuleSource::File(path) => load_rules(path),
    }
}

/// Run a full conversion. Per-line failures are part of the outcome; only
/// layout, rule, data source and output failures return an error.
pub fn run_conversion(config: &RunConfig) -> Result<RunOutcome> {
    let span = info_span!("run", data = %config.data.display());
    let _guard = span.enter();
    let start = Instant::now();

    let schema = load_schema(&config.layout, &config.schema)?;
    let rules = resolve_rules(&config.rules)?;

    info!(path = %config.data.display(), "Processing data file");
    let source = LineSource::open(&config.data)
        .with_context(|| format!("open data {}", config.data.display()))?;
    let result = process(&schema, &rules, source, &config.batch)
        .with_context(|| format!("read data {}", config.data.display()))?;
    for error in &result.errors {
        trace!(
            line_number = error.line_number,
            raw_line = redact_value(&error.raw_line),
            "rejected line"
        );
    }

    let output = write_records(&result, config.output.as_deref())?;
    let errors = write_errors(&result, &error_report_path(config))?;

    let summary = RunSummary::from_result(&result);
    info!(
        records = summary.records,
        errors = summary.errors,
        duration_ms = start.elapsed().as_millis(),
        "conversion complete"
    );
    Ok(RunOutcome {
        result,
        summary,
        output,
        errors,
    })
}

fn write_records(result: &BatchResult, path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => {
            write_json_file(path, &result.records)
                .with_context(|| format!("write records {}", path.display()))?;
            info!(
                records = result.records.len(),
                path = %path.display(),
                "Successfully wrote records"
            );
            Ok(Some(path.to_path_buf()))
        }
        None => {
            write_json_pretty(io::stdout().lock(), &result.records).context("write records")?;
            Ok(None)
        }
    }
}

/// Where the error report of `config` goes.
pub fn error_report_path(config: &RunConfig) -> PathBuf {
    config
        .errors
        .clone()
        .unwrap_or_else(|| default_error_report_path(&config.data, config.output.as_deref()))
}

/// `<data stem>.errors.json`, next to the records file when there is one and
/// next to the data file otherwise.
pub fn default_error_report_path(data: &Path, output: Option<&Path>) -> PathBuf {
    let stem = data
        .file_stem()
        .map_or_else(|| "records".into(), |stem| stem.to_string_lossy());
    let dir = output.unwrap_or(data).parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{stem}.errors.json"))
}

fn write_errors(result: &BatchResult, path: &Path) -> Result<Option<PathBuf>> {
    if !result.has_errors() {
        return Ok(None);
    }
    write_json_file(path, &result.errors)
        .with_context(|| format!("write error report {}", path.display()))?;
    info!(errors = result.errors.len(), path = %path.display(), "Wrote error report");
    Ok(Some(path.to_path_buf()))
}
