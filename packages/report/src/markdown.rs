//! Narrative Markdown report.
//!
//! The document opens with dataset provenance and data-quality counts,
//! then gives one section per scope (citywide first) with a short
//! narrative, a yearly table and the percent-change regression, and ends
//! with the borough-to-borough comparisons.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use shooting_trends_analytics_models::{
    AnalysisReport, PeriodCount, ScopeComparison, ScopeReport, TrendModel, TrendOutcome,
};

use crate::{ReportContext, ReportError, ReportSink, format_percent, write_atomic};

/// File name of the Markdown report.
pub const FILE_NAME: &str = "report.md";

/// Slopes smaller than this (percentage points per year) read as flat.
const FLAT_SLOPE: f64 = 0.5;

/// Writes [`FILE_NAME`] with narrative, tables and regression summaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSink;

impl ReportSink for MarkdownSink {
    fn name(&self) -> &'static str {
        "markdown"
    }

    fn render(
        &self,
        context: &ReportContext,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let path = output_dir.join(FILE_NAME);
        let markdown = render_markdown(context, report)?;
        write_atomic(&path, markdown.as_bytes())?;
        log::info!("Saved report to {}", path.display());
        Ok(vec![path])
    }
}

/// Renders the whole report as a Markdown document.
///
/// # Errors
///
/// Returns [`ReportError::Format`] if writing to the buffer fails.
pub fn render_markdown(
    context: &ReportContext,
    report: &AnalysisReport,
) -> Result<String, ReportError> {
    let mut out = String::new();

    writeln!(out, "# Shooting incident trends: {}", context.dataset_name)?;
    writeln!(out)?;
    writeln!(
        out,
        "Generated {} from dataset `{}`.",
        context.generated_at.format("%Y-%m-%d %H:%M UTC"),
        context.dataset_id
    )?;
    if let Some(url) = &context.portal_url {
        writeln!(out, "Source: <{url}>.")?;
    }
    if let Some(attribution) = &context.attribution {
        writeln!(out, "Attribution: {attribution}.")?;
    }
    writeln!(out)?;

    write_data_quality(&mut out, context)?;

    for scope_report in std::iter::once(&report.citywide).chain(&report.boroughs) {
        write_scope(&mut out, scope_report)?;
    }

    if !report.comparisons.is_empty() {
        writeln!(out, "## Borough comparisons")?;
        writeln!(out)?;
        for comparison in &report.comparisons {
            write_comparison(&mut out, comparison)?;
        }
    }

    Ok(out)
}

fn write_data_quality(out: &mut String, context: &ReportContext) -> std::fmt::Result {
    let stats = &context.stats;

    writeln!(out, "## Data quality")?;
    writeln!(out)?;
    writeln!(out, "| Rows | Count |")?;
    writeln!(out, "| --- | ---: |")?;
    writeln!(out, "| Read | {} |", stats.total_rows)?;
    writeln!(out, "| Excluded by murder flag | {} |", stats.excluded_by_flag)?;
    writeln!(out, "| Missing occurrence date | {} |", stats.missing_date)?;
    writeln!(out, "| Missing or unknown borough | {} |", stats.missing_region)?;
    writeln!(out, "| Unparseable date | {} |", stats.unparseable_dates)?;
    writeln!(out, "| Analyzed | {} |", stats.retained)?;
    writeln!(out)
}

fn write_scope(out: &mut String, report: &ScopeReport) -> std::fmt::Result {
    writeln!(out, "## {}", report.scope.label())?;
    writeln!(out)?;
    writeln!(out, "{}", narrative(report)?)?;
    writeln!(out)?;

    if !report.yearly_counts.is_empty() {
        writeln!(out, "### Yearly totals")?;
        writeln!(out)?;
        write_yearly_table(out, report)?;
    }

    writeln!(out, "### Trend in year-over-year change")?;
    writeln!(out)?;
    write_trend(out, &report.percent_change_trend, None, "Change")
}

fn write_yearly_table(out: &mut String, report: &ScopeReport) -> std::fmt::Result {
    writeln!(out, "| Year | Incidents | Cumulative | Change |")?;
    writeln!(out, "| --- | ---: | ---: | ---: |")?;

    // Percent change starts at the second year.
    let changes = std::iter::once(None).chain(
        report
            .yearly_percent_change
            .iter()
            .map(|p| Some(p.percent_change)),
    );

    for ((count, cumulative), change) in report
        .yearly_counts
        .iter()
        .zip(&report.yearly_cumulative)
        .zip(changes)
    {
        let change = change.map_or_else(|| "n/a".to_owned(), format_percent);
        writeln!(
            out,
            "| {} | {} | {} | {change} |",
            count.period, count.count, cumulative.cumulative
        )?;
    }
    writeln!(out)
}

/// `x_header` names the regressor column for fits whose x is not the year.
fn write_trend(
    out: &mut String,
    outcome: &TrendOutcome,
    x_header: Option<&str>,
    y_header: &str,
) -> std::fmt::Result {
    match outcome {
        TrendOutcome::Undefined { reason } => {
            writeln!(out, "No trend line could be fitted: {reason}.")?;
            writeln!(out)
        }
        TrendOutcome::Fitted(model) => {
            writeln!(
                out,
                "Slope {:.3}, intercept {:.3}, R² {:.3} over {} points.",
                model.slope,
                model.intercept,
                model.r_squared,
                model.len()
            )?;
            writeln!(out)?;
            write_fit_table(out, model, x_header, y_header)
        }
    }
}

fn write_fit_table(
    out: &mut String,
    model: &TrendModel,
    x_header: Option<&str>,
    y_header: &str,
) -> std::fmt::Result {
    match x_header {
        Some(x_header) => {
            writeln!(
                out,
                "| Year | {x_header} | Actual {y_header} | Predicted {y_header} | Residual |"
            )?;
            writeln!(out, "| --- | ---: | ---: | ---: | ---: |")?;
        }
        None => {
            writeln!(
                out,
                "| Year | Actual {y_header} | Predicted {y_header} | Residual |"
            )?;
            writeln!(out, "| --- | ---: | ---: | ---: |")?;
        }
    }

    for point in &model.points {
        let year = point
            .period
            .map_or_else(|| format!("{:.1}", point.x), |p| p.to_string());
        write!(out, "| {year} |")?;
        if x_header.is_some() {
            write!(out, " {:.1} |", point.x)?;
        }
        writeln!(
            out,
            " {:.1} | {:.1} | {:+.1} |",
            point.observed, point.predicted, point.residual
        )?;
    }
    writeln!(out)
}

fn write_comparison(out: &mut String, comparison: &ScopeComparison) -> std::fmt::Result {
    let x = comparison.x_scope.label();
    let y = comparison.y_scope.label();

    writeln!(out, "### {y} vs {x}")?;
    writeln!(out)?;
    writeln!(
        out,
        "Year-over-year change in {y} regressed on the change in {x}, \
         for years where both are defined."
    )?;
    writeln!(out)?;
    if let TrendOutcome::Fitted(model) = &comparison.trend {
        writeln!(out, "{}", comparison_sentence(x, y, model))?;
        writeln!(out)?;
    }
    write_trend(
        out,
        &comparison.trend,
        Some(&format!("{x} change")),
        &format!("{y} change"),
    )
}

fn comparison_sentence(x: &str, y: &str, model: &TrendModel) -> String {
    let strength = match model.r_squared {
        r if r >= 0.7 => "strongly",
        r if r >= 0.3 => "moderately",
        _ => "weakly",
    };
    format!(
        "A one-point rise in {x}'s change goes with a {:+.2}-point change in {y}'s; \
         the two move {strength} together (R² {:.3}).",
        model.slope, model.r_squared
    )
}

/// One-paragraph summary of a scope's counts and trend.
fn narrative(report: &ScopeReport) -> Result<String, std::fmt::Error> {
    let label = report.scope.label();
    let total = report.total();

    let (Some(first), Some(last)) = (report.yearly_counts.first(), report.yearly_counts.last())
    else {
        return Ok(format!("No shooting incidents were recorded for {label}."));
    };

    let mut text = format!(
        "{label} recorded {total} shooting incidents between {} and {} \
         across {} days with at least one incident.",
        first.period,
        last.period,
        report.daily_counts.len()
    );

    if let Some(peak) = peak_year(&report.yearly_counts) {
        write!(
            text,
            " The busiest year was {} with {} incidents.",
            peak.period, peak.count
        )?;
    }

    if let Some(latest) = report.yearly_percent_change.last() {
        match latest.percent_change {
            Some(change) => write!(
                text,
                " Incidents in {} changed {} from the year before.",
                latest.period,
                format_percent(Some(change))
            )?,
            None => write!(
                text,
                " The change in {} is undefined because the year before had no incidents.",
                latest.period
            )?,
        }
    }

    if let TrendOutcome::Fitted(model) = &report.percent_change_trend {
        let direction = if model.slope.abs() < FLAT_SLOPE {
            "is roughly flat".to_owned()
        } else if model.slope > 0.0 {
            format!("rises by {:.2} percentage points per year", model.slope)
        } else {
            format!("falls by {:.2} percentage points per year", -model.slope)
        };
        write!(
            text,
            " The fitted year-over-year change {direction} (R² {:.3}).",
            model.r_squared
        )?;
    }

    Ok(text)
}

/// Year with the highest count; the earliest wins a tie.
fn peak_year(counts: &[PeriodCount]) -> Option<&PeriodCount> {
    counts
        .iter()
        .max_by(|a, b| a.count.cmp(&b.count).then(b.period.cmp(&a.period)))
}
