//! Chart series extracted from a report.
//!
//! Every sink that draws or exports a chart starts from the same
//! [`ChartSeries`] list so titles, axis descriptions and file names stay
//! consistent between the SVG drawings and the CSV exports.

use shooting_trends_analytics_models::{
    AnalysisReport, FittedPoint, Period, Scope, ScopeComparison, ScopeReport, TimeGranularity,
    TrendModel, TrendOutcome,
};

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStyle {
    /// Points joined in x order; undefined values break the line.
    Line,
    /// Unconnected markers, for regressions of one series on another.
    Scatter,
}

/// One plotted value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// Period or other row label, the first CSV column.
    pub label: String,
    /// Position on the horizontal axis.
    pub x: f64,
    /// `None` marks an undefined value, drawn as a gap.
    pub value: Option<f64>,
}

/// One chart: observed points plus an optional fitted trend line.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    /// Caption drawn above the plot.
    pub title: String,
    /// Description of the horizontal axis.
    pub x_label: String,
    /// Description of the vertical axis.
    pub y_label: String,
    /// File-name stem, `<scope>_<series>`.
    pub slug: String,
    /// Granularity used to turn x positions back into period tick labels;
    /// `None` for a plain numeric axis.
    pub time_axis: Option<TimeGranularity>,
    /// How `points` are drawn.
    pub style: ChartStyle,
    /// Observed values.
    pub points: Vec<ChartPoint>,
    /// Trend-line predictions at the observed x positions; empty when no
    /// line was fitted.
    pub fitted: Vec<ChartPoint>,
}

impl ChartSeries {
    /// Whether the chart has anything to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.value.is_none()) && self.fitted.is_empty()
    }

    /// Formats an x position as a tick label.
    #[must_use]
    pub fn tick_label(&self, x: f64) -> String {
        match self.time_axis {
            Some(granularity) => granularity
                .period_at(x)
                .map_or_else(String::new, |p| p.to_string()),
            None => format!("{x:.0}"),
        }
    }
}

fn line(
    scope: Scope,
    name: &str,
    title: &str,
    granularity: TimeGranularity,
    y_label: &str,
    points: Vec<ChartPoint>,
) -> ChartSeries {
    let x_label = match granularity {
        TimeGranularity::Daily => "Date",
        TimeGranularity::Monthly => "Month",
        TimeGranularity::Yearly => "Year",
    };
    ChartSeries {
        title: format!("{} {title}", scope.label()),
        x_label: x_label.to_owned(),
        y_label: y_label.to_owned(),
        slug: format!("{}_{name}", scope.slug()),
        time_axis: Some(granularity),
        style: ChartStyle::Line,
        points,
        fitted: Vec::new(),
    }
}

fn point(period: Period, value: Option<f64>) -> ChartPoint {
    ChartPoint {
        label: period.to_string(),
        x: period.x_value(),
        value,
    }
}

#[allow(clippy::cast_precision_loss)]
fn counts(values: impl Iterator<Item = (Period, u64)>) -> Vec<ChartPoint> {
    values.map(|(p, v)| point(p, Some(v as f64))).collect()
}

fn fitted_label(p: &FittedPoint) -> String {
    p.period
        .map_or_else(|| p.x.to_string(), |period| period.to_string())
}

/// Observed and predicted points of a fitted model.
fn fit_points(model: &TrendModel) -> (Vec<ChartPoint>, Vec<ChartPoint>) {
    model
        .points
        .iter()
        .map(|p| {
            let label = fitted_label(p);
            (
                ChartPoint {
                    label: label.clone(),
                    x: p.x,
                    value: Some(p.observed),
                },
                ChartPoint {
                    label,
                    x: p.x,
                    value: Some(p.predicted),
                },
            )
        })
        .unzip()
}

/// Chart series for one scope.
///
/// Produces daily and yearly counts, their running totals, the yearly
/// percent change and, when the trend is defined, the percent change
/// against its fitted line.
#[must_use]
pub fn scope_series(report: &ScopeReport) -> Vec<ChartSeries> {
    let scope = report.scope;

    let mut charts = vec![
        line(
            scope,
            "daily_counts",
            "shooting incidents per day",
            TimeGranularity::Daily,
            "Incidents",
            counts(report.daily_counts.iter().map(|c| (c.period, c.count))),
        ),
        line(
            scope,
            "daily_cumulative",
            "cumulative shooting incidents",
            TimeGranularity::Daily,
            "Cumulative incidents",
            counts(
                report
                    .daily_cumulative
                    .iter()
                    .map(|c| (c.period, c.cumulative)),
            ),
        ),
        line(
            scope,
            "yearly_counts",
            "shooting incidents per year",
            TimeGranularity::Yearly,
            "Incidents",
            counts(report.yearly_counts.iter().map(|c| (c.period, c.count))),
        ),
        line(
            scope,
            "yearly_cumulative",
            "cumulative shooting incidents by year",
            TimeGranularity::Yearly,
            "Cumulative incidents",
            counts(
                report
                    .yearly_cumulative
                    .iter()
                    .map(|c| (c.period, c.cumulative)),
            ),
        ),
        line(
            scope,
            "yearly_percent_change",
            "year-over-year change in shooting incidents",
            TimeGranularity::Yearly,
            "Percent change",
            report
                .yearly_percent_change
                .iter()
                .map(|p| point(p.period, p.percent_change))
                .collect(),
        ),
    ];

    if let TrendOutcome::Fitted(model) = &report.percent_change_trend {
        let (observed, fitted) = fit_points(model);
        let mut fit = line(
            scope,
            "percent_change_fit",
            "year-over-year change, actual vs fitted",
            TimeGranularity::Yearly,
            "Percent change",
            observed,
        );
        fit.fitted = fitted;
        charts.push(fit);
    }

    charts
}

/// Scatter of one borough's yearly change against another's, with the
/// fitted line. `None` when the comparison could not be fitted.
#[must_use]
pub fn comparison_series(comparison: &ScopeComparison) -> Option<ChartSeries> {
    let model = comparison.trend.model()?;
    let (x, y) = (comparison.x_scope, comparison.y_scope);
    let (points, fitted) = fit_points(model);

    Some(ChartSeries {
        title: format!("{} vs {} year-over-year change", y.label(), x.label()),
        x_label: format!("{} percent change", x.label()),
        y_label: format!("{} percent change", y.label()),
        slug: format!("{}_vs_{}_percent_change", y.slug(), x.slug()),
        time_axis: None,
        style: ChartStyle::Scatter,
        points,
        fitted,
    })
}

/// Chart series for every scope in the report, citywide first, followed by
/// the fitted comparisons.
#[must_use]
pub fn report_series(report: &AnalysisReport) -> Vec<ChartSeries> {
    std::iter::once(&report.citywide)
        .chain(&report.boroughs)
        .flat_map(scope_series)
        .chain(report.comparisons.iter().filter_map(comparison_series))
        .collect()
}
