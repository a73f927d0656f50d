//! One CSV file per chart series.

use std::path::{Path, PathBuf};

use shooting_trends_analytics_models::AnalysisReport;

use crate::charts::{ChartSeries, report_series};
use crate::{ReportContext, ReportError, ReportSink};

/// Writes `<scope>_<series>.csv` files with `period,value` columns, plus a
/// `predicted` column for series with a fitted line.
///
/// Undefined values are written as empty cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSeriesSink;

impl ReportSink for CsvSeriesSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn render(
        &self,
        _context: &ReportContext,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ReportError> {
        report_series(report)
            .iter()
            .map(|series| write_series(series, output_dir))
            .collect()
    }
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

fn write_series(series: &ChartSeries, output_dir: &Path) -> Result<PathBuf, ReportError> {
    let path = output_dir.join(format!("{}.csv", series.slug));
    let tmp_path = path.with_extension("tmp");

    let mut writer = csv::Writer::from_path(&tmp_path)?;
    if series.fitted.is_empty() {
        writer.write_record(["period", "value"])?;
        for point in &series.points {
            writer.write_record([point.label.as_str(), cell(point.value).as_str()])?;
        }
    } else {
        writer.write_record(["period", "value", "predicted"])?;
        for (point, fitted) in series.points.iter().zip(&series.fitted) {
            writer.write_record([
                point.label.as_str(),
                cell(point.value).as_str(),
                cell(fitted.value).as_str(),
            ])?;
        }
    }
    writer.flush()?;
    drop(writer);

    std::fs::rename(&tmp_path, &path)?;
    log::debug!("Wrote {} points to {}", series.points.len(), path.display());
    Ok(path)
}
