#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Value types produced by the aggregation and trend-modeling pipeline.
//!
//! Everything here is plain data: periods and per-period counts, the
//! cumulative and percent-change series derived from them, fitted trend
//! models, and the per-scope reports that bundle them for rendering.

use chrono::{Datelike as _, NaiveDate};
use serde::{Deserialize, Serialize};
use shooting_trends_incident_models::{Borough, IncidentRecord};

/// Granularity of a period series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGranularity {
    /// Daily counts.
    Daily,
    /// Monthly counts.
    Monthly,
    /// Yearly counts.
    Yearly,
}

impl std::fmt::Display for TimeGranularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "day"),
            Self::Monthly => write!(f, "month"),
            Self::Yearly => write!(f, "year"),
        }
    }
}

impl TimeGranularity {
    /// Truncates a calendar date to the period containing it.
    #[must_use]
    pub fn period_of(self, date: NaiveDate) -> Period {
        match self {
            Self::Daily => Period::Day(date),
            Self::Monthly => Period::Month {
                year: date.year(),
                month: date.month(),
            },
            Self::Yearly => Period::Year(date.year()),
        }
    }

    /// Inverse of [`Period::x_value`]: the period at a whole-number axis
    /// position.
    ///
    /// Returns `None` for fractional positions and positions outside the
    /// supported calendar.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn period_at(self, x: f64) -> Option<Period> {
        if !x.is_finite() || (x - x.round()).abs() > 1e-9 {
            return None;
        }
        let x = x.round();
        if x < f64::from(i32::MIN) || x > f64::from(i32::MAX) {
            return None;
        }
        let n = x as i32;
        match self {
            Self::Daily => NaiveDate::from_num_days_from_ce_opt(n).map(Period::Day),
            Self::Monthly => Some(Period::Month {
                year: n.div_euclid(12),
                month: n.rem_euclid(12).unsigned_abs() + 1,
            }),
            Self::Yearly => Some(Period::Year(n)),
        }
    }
}

/// A grouping key: a calendar day, month or year.
///
/// All periods within one series share a granularity, so the derived
/// ordering (variant first, then value) is chronological within a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "granularity", content = "value", rename_all = "snake_case")]
pub enum Period {
    /// A single calendar day.
    Day(NaiveDate),
    /// A calendar month.
    Month {
        /// Calendar year.
        year: i32,
        /// Month number, 1-12.
        month: u32,
    },
    /// A calendar year.
    Year(i32),
}

impl Period {
    /// Returns the granularity of this period.
    #[must_use]
    pub const fn granularity(&self) -> TimeGranularity {
        match self {
            Self::Day(_) => TimeGranularity::Daily,
            Self::Month { .. } => TimeGranularity::Monthly,
            Self::Year(_) => TimeGranularity::Yearly,
        }
    }

    /// Re-expresses this period at a coarser (or equal) granularity.
    ///
    /// Returns `None` when `granularity` is finer than this period, since a
    /// year cannot be split into days.
    #[must_use]
    pub fn coarsen(self, granularity: TimeGranularity) -> Option<Self> {
        match (self, granularity) {
            (Self::Day(date), g) => Some(g.period_of(date)),
            (Self::Month { .. }, TimeGranularity::Monthly) | (Self::Year(_), TimeGranularity::Yearly) => {
                Some(self)
            }
            (Self::Month { year, .. }, TimeGranularity::Yearly) => Some(Self::Year(year)),
            (Self::Month { .. } | Self::Year(_), TimeGranularity::Daily)
            | (Self::Year(_), TimeGranularity::Monthly) => None,
        }
    }

    /// Numeric position of the period on a time axis, used as the x value
    /// when fitting trends against time.
    ///
    /// Years map to the year number, months to `year * 12 + (month - 1)`,
    /// and days to the number of days since 0001-01-01.
    #[must_use]
    pub fn x_value(&self) -> f64 {
        match self {
            Self::Day(date) => f64::from(date.num_days_from_ce()),
            Self::Month { year, month } => f64::from(*year) * 12.0 + f64::from(*month - 1),
            Self::Year(year) => f64::from(*year),
        }
    }

    /// The period immediately after this one at the same granularity.
    ///
    /// Returns `None` past the end of the supported calendar.
    #[must_use]
    pub fn succ(self) -> Option<Self> {
        match self {
            Self::Day(date) => date.succ_opt().map(Self::Day),
            Self::Month { year, month: 12 } => Some(Self::Month {
                year: year.checked_add(1)?,
                month: 1,
            }),
            Self::Month { year, month } => Some(Self::Month {
                year,
                month: month + 1,
            }),
            Self::Year(year) => year.checked_add(1).map(Self::Year),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{year:04}-{month:02}"),
            Self::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Which incidents a pipeline run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "borough", rename_all = "snake_case")]
pub enum Scope {
    /// Every borough combined.
    Citywide,
    /// A single borough.
    Borough(Borough),
}

impl Scope {
    /// Returns whether the record falls within this scope.
    #[must_use]
    pub fn includes(&self, record: &IncidentRecord) -> bool {
        match self {
            Self::Citywide => true,
            Self::Borough(borough) => record.borough == *borough,
        }
    }

    /// Human-readable name for narrative text and chart titles.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Citywide => "New York City",
            Self::Borough(borough) => borough.label(),
        }
    }

    /// Lowercase identifier used in output file names.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Citywide => "citywide",
            Self::Borough(borough) => borough.slug(),
        }
    }
}

/// Number of incidents in one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodCount {
    /// The period.
    pub period: Period,
    /// Incidents whose truncated date equals `period`.
    pub count: u64,
}

/// Running total of incidents up to and including a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CumulativePoint {
    /// The period.
    pub period: Period,
    /// Sum of counts for all periods up to and including `period`.
    pub cumulative: u64,
}

/// Change in incident count relative to the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentChangePoint {
    /// The period the change ends in.
    pub period: Period,
    /// `(count / previous_count - 1) * 100`, or `None` when the previous
    /// period had zero incidents.
    pub percent_change: Option<f64>,
}

/// One input point of a trend fit with its prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedPoint {
    /// Period the point was drawn from, when the x axis is time or the
    /// pairs were joined on period.
    pub period: Option<Period>,
    /// Explanatory value.
    pub x: f64,
    /// Observed response.
    pub observed: f64,
    /// Response predicted by the fitted line.
    pub predicted: f64,
    /// `observed - predicted`.
    pub residual: f64,
}

/// Ordinary least squares line fitted to paired observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendModel {
    /// Change in the response per unit of x.
    pub slope: f64,
    /// Response predicted at `x = 0`.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Input points with their predictions, in input order.
    pub points: Vec<FittedPoint>,
}

impl TrendModel {
    /// Number of points the model was fitted on.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the model has no points. Never true for a fitted model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Evaluates the fitted line at `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope.mul_add(x, self.intercept)
    }
}

/// Result of attempting a trend fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrendOutcome {
    /// The fit succeeded.
    Fitted(TrendModel),
    /// The fit is undefined for the available data.
    Undefined {
        /// Why no line could be fitted.
        reason: String,
    },
}

impl TrendOutcome {
    /// Returns the fitted model, if any.
    #[must_use]
    pub const fn model(&self) -> Option<&TrendModel> {
        match self {
            Self::Fitted(model) => Some(model),
            Self::Undefined { .. } => None,
        }
    }
}

/// All derived series and the trend fit for one scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeReport {
    /// Which incidents this report covers.
    pub scope: Scope,
    /// Incidents per day.
    pub daily_counts: Vec<PeriodCount>,
    /// Running total per day.
    pub daily_cumulative: Vec<CumulativePoint>,
    /// Incidents per year.
    pub yearly_counts: Vec<PeriodCount>,
    /// Running total per year.
    pub yearly_cumulative: Vec<CumulativePoint>,
    /// Year-over-year percent change (first year excluded).
    pub yearly_percent_change: Vec<PercentChangePoint>,
    /// Year against year-over-year percent change.
    pub percent_change_trend: TrendOutcome,
}

impl ScopeReport {
    /// Total incidents in this scope.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.yearly_cumulative.last().map_or(0, |p| p.cumulative)
    }
}

/// One borough's percent change regressed on another's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeComparison {
    /// Scope supplying the explanatory series.
    pub x_scope: Scope,
    /// Scope supplying the response series.
    pub y_scope: Scope,
    /// Fit of `y_scope`'s yearly percent change on `x_scope`'s.
    pub trend: TrendOutcome,
}

/// Complete output of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Every borough combined.
    pub citywide: ScopeReport,
    /// One report per borough, in [`Borough::all`] order.
    pub boroughs: Vec<ScopeReport>,
    /// Requested borough-to-borough comparisons.
    pub comparisons: Vec<ScopeComparison>,
}
