//! End-to-end run: load, analyze, render.
//!
//! Resolves the dataset definition, streams and cleans its rows behind an
//! `indicatif` spinner, runs the citywide and per-borough analysis, then
//! hands the report to every requested sink.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use shooting_trends_analytics::pipeline::{PipelineConfig, run_analysis};
use shooting_trends_cli_utils::{IndicatifProgress, MultiProgress};
use shooting_trends_incident_models::Borough;
use shooting_trends_report::{OutputFormat, ReportContext, ReportSink, render_all};
use shooting_trends_source::dataset_def::DatasetDefinition;
use shooting_trends_source::registry::find_dataset;
use shooting_trends_source::{FetchOptions, LoadedDataset, load_incidents};
use shooting_trends_source_models::DateErrorPolicy;

/// Options for one `run` invocation.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub dataset: String,
    pub input: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub limit: Option<u64>,
    pub on_date_error: Option<DateErrorPolicy>,
    /// Empty means the default comparisons.
    pub comparisons: Vec<(Borough, Borough)>,
    pub formats: Vec<OutputFormat>,
}

/// Parses an `X:Y` borough pair.
///
/// # Errors
///
/// Returns a message if the value is not two distinct boroughs separated
/// by a colon.
pub fn parse_comparison(value: &str) -> Result<(Borough, Borough), String> {
    let (x, y) = value
        .split_once(':')
        .ok_or_else(|| format!("expected X:Y, got '{value}'"))?;
    let parse = |name: &str| {
        Borough::from_raw(name).ok_or_else(|| format!("unknown borough '{}'", name.trim()))
    };
    let (x, y) = (parse(x)?, parse(y)?);
    if x == y {
        return Err(format!("cannot compare {} with itself", x.label()));
    }
    Ok((x, y))
}

/// Parses a date error policy name.
///
/// # Errors
///
/// Returns a message for anything other than `fatal` or `skip`.
pub fn parse_date_policy(value: &str) -> Result<DateErrorPolicy, String> {
    value
        .parse()
        .map_err(|_| format!("expected 'fatal' or 'skip', got '{value}'"))
}

/// Parses an output format name.
///
/// # Errors
///
/// Returns a message for anything other than `md`, `csv`, `json` or `svg`.
pub fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("expected md, csv, json or svg, got '{value}'"))
}

fn pipeline_config(comparisons: Vec<(Borough, Borough)>) -> PipelineConfig {
    if comparisons.is_empty() {
        PipelineConfig::default()
    } else {
        PipelineConfig { comparisons }
    }
}

fn sinks(formats: &[OutputFormat]) -> Vec<Box<dyn ReportSink>> {
    let mut seen = Vec::new();
    for &format in formats {
        if !seen.contains(&format) {
            seen.push(format);
        }
    }
    seen.into_iter().map(OutputFormat::sink).collect()
}

fn report_context(definition: &DatasetDefinition, loaded: &LoadedDataset) -> ReportContext {
    ReportContext {
        dataset_id: loaded.dataset_id.clone(),
        dataset_name: definition.name().to_owned(),
        portal_url: definition.portal_url().map(str::to_owned),
        attribution: definition.license().attribution_text.clone(),
        stats: loaded.stats,
        generated_at: Utc::now(),
    }
}

/// Runs the full analysis and returns the files written.
///
/// The `multi` parameter is the shared [`MultiProgress`] that is also
/// registered with the log bridge.
///
/// # Errors
///
/// Returns an error if the dataset is unknown or cannot be loaded, or if a
/// sink fails to write its output.
pub async fn run(
    multi: &MultiProgress,
    args: RunArgs,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let definition = find_dataset(&args.dataset)?;
    log::info!("Analyzing {} ({})", definition.name(), definition.id());

    let options = FetchOptions {
        input_override: args.input,
        limit: args.limit,
        date_error_policy: args.on_date_error,
    };
    let progress = IndicatifProgress::records_spinner(multi, definition.id());
    let loaded = load_incidents(&definition, &options, &progress).await?;
    log::info!(
        "Loaded {} incidents ({} rows dropped)",
        loaded.records.len(),
        loaded.stats.dropped()
    );

    let report = run_analysis(&loaded.records, &pipeline_config(args.comparisons));

    let context = report_context(&definition, &loaded);
    let files = render_all(&sinks(&args.formats), &context, &report, &args.output_dir)?;

    log::info!(
        "Wrote {} file(s) to {} in {:.1}s",
        files.len(),
        args.output_dir.display(),
        start.elapsed().as_secs_f64()
    );

    Ok(files)
}
