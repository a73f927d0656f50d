#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rendering sinks for a finished analysis.
//!
//! Each [`ReportSink`] turns an [`AnalysisReport`] plus its
//! [`ReportContext`] into files under an output directory:
//!
//! * [`markdown::MarkdownSink`] writes the narrative report with yearly
//!   tables and regression summaries.
//! * [`csv_series::CsvSeriesSink`] writes one CSV per chart series for
//!   line-chart tooling.
//! * [`json::JsonSink`] writes the full report as JSON.
//! * [`svg::SvgChartSink`] draws every chart series as an SVG with
//!   `plotters`.
//!
//! Files are written to a temporary name and renamed into place so a
//! failed run never leaves a half-written artifact behind.

pub mod charts;
pub mod csv_series;
pub mod json;
pub mod markdown;
pub mod svg;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shooting_trends_analytics_models::AnalysisReport;
use shooting_trends_source_models::FilterStats;
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Errors that can occur while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// I/O error (directory creation, file write or rename).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Text formatting failed.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Chart drawing failed.
    #[error("Chart error: {0}")]
    Chart(String),
}

/// Output formats a run can produce.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OutputFormat {
    /// Markdown narrative report.
    #[strum(to_string = "markdown", serialize = "md")]
    Markdown,
    /// One CSV per chart series.
    Csv,
    /// Full report as JSON.
    Json,
    /// One SVG chart per chart series.
    Svg,
}

impl OutputFormat {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Markdown, Self::Csv, Self::Json, Self::Svg]
    }

    /// Builds the sink that renders this format.
    #[must_use]
    pub fn sink(self) -> Box<dyn ReportSink> {
        match self {
            Self::Markdown => Box::new(markdown::MarkdownSink),
            Self::Csv => Box::new(csv_series::CsvSeriesSink),
            Self::Json => Box::new(json::JsonSink),
            Self::Svg => Box::new(svg::SvgChartSink),
        }
    }
}

/// Dataset provenance and data-quality details rendered with a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContext {
    /// Identifier of the dataset definition.
    pub dataset_id: String,
    /// Human-readable dataset name.
    pub dataset_name: String,
    /// Portal or download URL of the dataset.
    pub portal_url: Option<String>,
    /// Attribution text required or recommended by the dataset license.
    pub attribution: Option<String>,
    /// Rows read and dropped while cleaning the dataset.
    pub stats: FilterStats,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

/// A destination that renders a finished analysis.
pub trait ReportSink {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// Renders `report` into `output_dir`, returning the files written.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if rendering or writing fails.
    fn render(
        &self,
        context: &ReportContext,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ReportError>;
}

/// Renders `report` with every sink in turn.
///
/// # Errors
///
/// Returns the first [`ReportError`] raised by a sink; sinks after it are
/// not run.
pub fn render_all(
    sinks: &[Box<dyn ReportSink>],
    context: &ReportContext,
    report: &AnalysisReport,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, ReportError> {
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::new();
    for sink in sinks {
        let files = sink.render(context, report, output_dir)?;
        log::info!(
            "{} sink wrote {} file(s) to {}",
            sink.name(),
            files.len(),
            output_dir.display()
        );
        written.extend(files);
    }
    Ok(written)
}

/// Writes `contents` to `path` via a temporary sibling file and a rename.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ReportError> {
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Formats an optional percentage for tables and narrative text.
pub(crate) fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |v| format!("{v:+.1}%"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use chrono::{NaiveDate, TimeZone as _, Utc};
    use shooting_trends_analytics_models::{
        AnalysisReport, CumulativePoint, FittedPoint, PercentChangePoint, Period, PeriodCount,
        Scope, ScopeComparison, ScopeReport, TrendModel, TrendOutcome,
    };
    use shooting_trends_incident_models::Borough;
    use shooting_trends_source_models::FilterStats;

    use super::ReportContext;

    pub fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "shooting_trends_report_{name}_{}",
            std::process::id()
        ));
        std::fs::remove_dir_all(&dir).ok();
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn context() -> ReportContext {
        ReportContext {
            dataset_id: "nypd_shooting_historic".to_owned(),
            dataset_name: "NYPD Shooting Incident Data (Historic)".to_owned(),
            portal_url: Some("https://data.cityofnewyork.us/d/833y-fsy8".to_owned()),
            attribution: Some("NYC OpenData".to_owned()),
            stats: FilterStats {
                total_rows: 50,
                excluded_by_flag: 5,
                missing_date: 0,
                missing_region: 0,
                unparseable_dates: 0,
                retained: 45,
            },
            generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    fn scope_report(scope: Scope, years: &[(i32, u64)]) -> ScopeReport {
        let yearly_counts: Vec<PeriodCount> = years
            .iter()
            .map(|&(year, count)| PeriodCount {
                period: Period::Year(year),
                count,
            })
            .collect();
        let daily_counts: Vec<PeriodCount> = years
            .iter()
            .map(|&(year, count)| PeriodCount {
                period: Period::Day(NaiveDate::from_ymd_opt(year, 6, 1).unwrap()),
                count,
            })
            .collect();
        let cumulative = |counts: &[PeriodCount]| -> Vec<CumulativePoint> {
            let mut total = 0;
            counts
                .iter()
                .map(|c| {
                    total += c.count;
                    CumulativePoint {
                        period: c.period,
                        cumulative: total,
                    }
                })
                .collect()
        };
        #[allow(clippy::cast_precision_loss)]
        let yearly_percent_change: Vec<PercentChangePoint> = yearly_counts
            .windows(2)
            .map(|w| PercentChangePoint {
                period: w[1].period,
                percent_change: (w[0].count > 0)
                    .then(|| (w[1].count as f64 / w[0].count as f64 - 1.0) * 100.0),
            })
            .collect();
        ScopeReport {
            scope,
            daily_cumulative: cumulative(&daily_counts),
            yearly_cumulative: cumulative(&yearly_counts),
            daily_counts,
            yearly_counts,
            yearly_percent_change,
            percent_change_trend: TrendOutcome::Undefined {
                reason: "Insufficient data: need at least 2 points, found 1".to_owned(),
            },
        }
    }

    pub fn report() -> AnalysisReport {
        let mut citywide = scope_report(Scope::Citywide, &[(2018, 10), (2019, 20), (2020, 15)]);
        citywide.percent_change_trend = TrendOutcome::Fitted(TrendModel {
            slope: -125.0,
            intercept: 252_475.0,
            r_squared: 1.0,
            points: vec![
                FittedPoint {
                    period: Some(Period::Year(2019)),
                    x: 2019.0,
                    observed: 100.0,
                    predicted: 100.0,
                    residual: 0.0,
                },
                FittedPoint {
                    period: Some(Period::Year(2020)),
                    x: 2020.0,
                    observed: -25.0,
                    predicted: -25.0,
                    residual: 0.0,
                },
            ],
        });
        let boroughs = vec![
            scope_report(Scope::Borough(Borough::Bronx), &[(2018, 10), (2019, 20), (2020, 15)]),
            scope_report(Scope::Borough(Borough::Brooklyn), &[(2018, 0), (2019, 0), (2020, 0)]),
            scope_report(Scope::Borough(Borough::Manhattan), &[]),
            scope_report(Scope::Borough(Borough::Queens), &[]),
            scope_report(Scope::Borough(Borough::StatenIsland), &[]),
        ];
        AnalysisReport {
            citywide,
            boroughs,
            comparisons: vec![ScopeComparison {
                x_scope: Scope::Borough(Borough::Bronx),
                y_scope: Scope::Borough(Borough::Brooklyn),
                trend: TrendOutcome::Undefined {
                    reason: "Insufficient data: need at least 2 points, found 0".to_owned(),
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_formats() {
        assert_eq!("md".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("Markdown".parse::<OutputFormat>(), Ok(OutputFormat::Markdown));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("svg".parse::<OutputFormat>(), Ok(OutputFormat::Svg));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn formats_percentages() {
        assert_eq!(format_percent(Some(100.0)), "+100.0%");
        assert_eq!(format_percent(Some(-25.0)), "-25.0%");
        assert_eq!(format_percent(None), "n/a");
    }

    #[test]
    fn renders_every_format() {
        let dir = test_support::temp_dir("all");
        let sinks: Vec<Box<dyn ReportSink>> =
            OutputFormat::all().iter().map(|f| f.sink()).collect();

        let files = render_all(
            &sinks,
            &test_support::context(),
            &test_support::report(),
            &dir,
        )
        .unwrap();

        assert!(files.iter().all(|f| f.exists()));
        assert!(dir.join("report.md").exists());
        assert!(dir.join("analysis.json").exists());
        assert!(dir.join("citywide_yearly_counts.csv").exists());
        assert!(dir.join("citywide_percent_change_fit.svg").exists());
        assert!(
            !files
                .iter()
                .any(|f| f.extension().is_some_and(|e| e == "tmp"))
        );

        std::fs::remove_dir_all(dir).ok();
    }
}
