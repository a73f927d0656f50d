//! SVG charts drawn with `plotters`.
//!
//! One `<slug>.svg` per [`ChartSeries`]: line charts for the count and
//! percent-change series, actual-vs-fitted charts for every defined trend,
//! and scatter plots for the borough comparisons. Charts with no defined
//! value are skipped.

use std::ops::Range;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use shooting_trends_analytics_models::AnalysisReport;

use crate::charts::{ChartPoint, ChartSeries, ChartStyle, report_series};
use crate::{ReportContext, ReportError, ReportSink, write_atomic};

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 600;

/// Writes one `<scope>_<series>.svg` per chart series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgChartSink;

impl ReportSink for SvgChartSink {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn render(
        &self,
        _context: &ReportContext,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let mut written = Vec::new();
        for series in report_series(report) {
            if series.is_empty() {
                log::debug!("Skipping {}: nothing to draw", series.slug);
                continue;
            }
            let path = output_dir.join(format!("{}.svg", series.slug));
            write_atomic(&path, render_svg(&series)?.as_bytes())?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Draws one chart and returns the SVG document.
///
/// # Errors
///
/// Returns [`ReportError::Chart`] if plotting fails.
pub fn render_svg(series: &ChartSeries) -> Result<String, ReportError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        draw(&root, series).map_err(|e| ReportError::Chart(e.to_string()))?;
    }
    Ok(svg)
}

fn draw(
    root: &DrawingArea<SVGBackend<'_>, plotters::coord::Shift>,
    series: &ChartSeries,
) -> Result<(), Box<dyn std::error::Error>> {
    root.fill(&WHITE)?;

    let observed = defined(&series.points);
    let mut fitted = defined(&series.fitted);
    fitted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let all = || observed.iter().chain(&fitted);
    let x_range = padded(all().map(|p| p.0));
    let y_range = padded(all().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(&series.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    let tick_label = |x: &f64| series.tick_label(*x);
    chart
        .configure_mesh()
        .x_desc(&series.x_label)
        .y_desc(&series.y_label)
        .x_label_formatter(&tick_label)
        .draw()?;

    if series.style == ChartStyle::Line {
        for run in runs(&series.points) {
            chart.draw_series(LineSeries::new(run, &BLUE))?;
        }
    }
    chart
        .draw_series(
            observed
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())),
        )?
        .label("actual")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLUE.filled()));

    if !fitted.is_empty() {
        chart
            .draw_series(LineSeries::new(fitted, &RED))?
            .label("fitted")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn defined(points: &[ChartPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter_map(|p| p.value.map(|v| (p.x, v)))
        .collect()
}

/// Maximal runs of consecutive defined values; an undefined value ends a
/// run.
fn runs(points: &[ChartPoint]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point.value {
            Some(value) => current.push((point.x, value)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Axis range covering `values` with a 5% margin; a single value gets a
/// unit margin.
fn padded(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let margin = if (max - min).abs() < f64::EPSILON {
        1.0
    } else {
        (max - min) * 0.05
    };
    (min - margin)..(max + margin)
}
