//! Scope pipeline.
//!
//! [`analyze_scope`] runs aggregation, the derived-series builders and the
//! trend fit for one scope. [`run_analysis`] invokes it citywide and once
//! per borough, then fits the configured borough-to-borough comparisons.

use shooting_trends_analytics_models::{
    AnalysisReport, Scope, ScopeComparison, ScopeReport, TimeGranularity,
};
use shooting_trends_incident_models::{Borough, IncidentRecord};

use crate::aggregate::{count_by_period, fill_gaps, rollup};
use crate::series::{cumulative, percent_change};
use crate::trend::{fit_against_time, fit_paired, into_outcome};

/// Which regressions to run beyond the per-scope time trends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Borough pairs `(x, y)`: regress `y`'s yearly percent change on `x`'s.
    pub comparisons: Vec<(Borough, Borough)>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            comparisons: vec![(Borough::Bronx, Borough::Brooklyn)],
        }
    }
}

/// Derives every series and the percent-change trend for one scope.
///
/// The yearly series is dense: a year with no incidents between the first
/// and last observed year is counted as zero, so percent change always
/// compares adjacent calendar years.
#[must_use]
pub fn analyze_scope(records: &[IncidentRecord], scope: Scope) -> ScopeReport {
    let daily_counts = count_by_period(records, TimeGranularity::Daily, scope);
    let daily_cumulative = cumulative(&daily_counts);

    let yearly_counts = fill_gaps(&rollup(&daily_counts, TimeGranularity::Yearly));
    let yearly_cumulative = cumulative(&yearly_counts);
    let yearly_percent_change = percent_change(&yearly_counts);

    let percent_change_trend = into_outcome(
        scope.label(),
        fit_against_time(&yearly_percent_change),
    );

    let report = ScopeReport {
        scope,
        daily_counts,
        daily_cumulative,
        yearly_counts,
        yearly_cumulative,
        yearly_percent_change,
        percent_change_trend,
    };

    log::info!(
        "{}: {} incidents over {} days in {} years",
        scope.label(),
        report.total(),
        report.daily_counts.len(),
        report.yearly_counts.len()
    );

    report
}

/// Runs the full analysis: citywide, every borough, and the configured
/// comparisons.
#[must_use]
pub fn run_analysis(records: &[IncidentRecord], config: &PipelineConfig) -> AnalysisReport {
    let citywide = analyze_scope(records, Scope::Citywide);

    let boroughs: Vec<ScopeReport> = Borough::all()
        .iter()
        .map(|&borough| analyze_scope(records, Scope::Borough(borough)))
        .collect();

    let comparisons = config
        .comparisons
        .iter()
        .map(|&(x, y)| compare(&boroughs, x, y))
        .collect();

    AnalysisReport {
        citywide,
        boroughs,
        comparisons,
    }
}

fn compare(boroughs: &[ScopeReport], x: Borough, y: Borough) -> ScopeComparison {
    let x_scope = Scope::Borough(x);
    let y_scope = Scope::Borough(y);

    let series_for = |scope: Scope| {
        boroughs
            .iter()
            .find(|r| r.scope == scope)
            .map(|r| r.yearly_percent_change.as_slice())
            .unwrap_or_default()
    };

    let label = format!("{} vs {}", y.label(), x.label());
    let trend = into_outcome(
        &label,
        fit_paired(series_for(x_scope), series_for(y_scope)),
    );

    ScopeComparison {
        x_scope,
        y_scope,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shooting_trends_analytics_models::{
        CumulativePoint, Period, PeriodCount, TrendOutcome,
    };

    use super::*;

    fn record(y: i32, m: u32, d: u32, borough: Borough) -> IncidentRecord {
        IncidentRecord {
            occurred_on: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            borough,
        }
    }

    fn repeat(n: usize, r: IncidentRecord) -> Vec<IncidentRecord> {
        std::iter::repeat_n(r, n).collect()
    }

    #[test]
    fn single_day_scenario() {
        let records = repeat(2, record(2020, 1, 1, Borough::Bronx));
        let report = analyze_scope(&records, Scope::Citywide);
        let day = Period::Day(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());

        assert_eq!(
            report.daily_counts,
            vec![PeriodCount {
                period: day,
                count: 2
            }]
        );
        assert_eq!(
            report.daily_cumulative,
            vec![CumulativePoint {
                period: day,
                cumulative: 2
            }]
        );
        assert!(report.yearly_percent_change.is_empty());
        assert!(matches!(
            report.percent_change_trend,
            TrendOutcome::Undefined { .. }
        ));
    }

    #[test]
    fn yearly_series_rolls_up_daily_counts() {
        let mut records = repeat(10, record(2018, 3, 1, Borough::Queens));
        records.extend(repeat(20, record(2019, 3, 1, Borough::Queens)));
        records.extend(repeat(15, record(2020, 3, 1, Borough::Queens)));

        let report = analyze_scope(&records, Scope::Borough(Borough::Queens));
        let counts: Vec<u64> = report.yearly_counts.iter().map(|c| c.count).collect();
        let changes: Vec<Option<f64>> = report
            .yearly_percent_change
            .iter()
            .map(|p| p.percent_change)
            .collect();

        assert_eq!(counts, vec![10, 20, 15]);
        assert_eq!(changes, vec![Some(100.0), Some(-25.0)]);
        assert_eq!(report.total(), 45);
        assert!(report.percent_change_trend.model().is_some());
    }

    #[test]
    fn missing_year_counts_as_zero() {
        let mut records = repeat(10, record(2018, 3, 1, Borough::Queens));
        records.extend(repeat(5, record(2020, 3, 1, Borough::Queens)));

        let report = analyze_scope(&records, Scope::Borough(Borough::Queens));
        let counts: Vec<(Period, u64)> = report
            .yearly_counts
            .iter()
            .map(|c| (c.period, c.count))
            .collect();
        let changes: Vec<(Period, Option<f64>)> = report
            .yearly_percent_change
            .iter()
            .map(|p| (p.period, p.percent_change))
            .collect();

        assert_eq!(
            counts,
            vec![
                (Period::Year(2018), 10),
                (Period::Year(2019), 0),
                (Period::Year(2020), 5),
            ]
        );
        assert_eq!(
            changes,
            vec![
                (Period::Year(2019), Some(-100.0)),
                (Period::Year(2020), None),
            ]
        );
        let yearly_cumulative: Vec<u64> = report
            .yearly_cumulative
            .iter()
            .map(|c| c.cumulative)
            .collect();
        assert_eq!(yearly_cumulative, vec![10, 10, 15]);
    }

    #[test]
    fn runs_every_borough_in_fixed_order() {
        let records = vec![
            record(2020, 1, 1, Borough::StatenIsland),
            record(2020, 1, 1, Borough::Bronx),
        ];
        let report = run_analysis(&records, &PipelineConfig::default());

        let scopes: Vec<Scope> = report.boroughs.iter().map(|r| r.scope).collect();
        let expected: Vec<Scope> = Borough::all().iter().map(|&b| Scope::Borough(b)).collect();
        assert_eq!(scopes, expected);
        assert_eq!(report.citywide.total(), 2);
        assert_eq!(report.boroughs[0].total(), 1);
        assert_eq!(report.boroughs[2].total(), 0);
        assert!(report.boroughs[2].daily_counts.is_empty());
    }

    #[test]
    fn borough_totals_sum_to_citywide() {
        let records = vec![
            record(2019, 1, 1, Borough::Bronx),
            record(2019, 6, 1, Borough::Brooklyn),
            record(2020, 2, 2, Borough::Manhattan),
            record(2021, 3, 3, Borough::Queens),
            record(2021, 3, 3, Borough::StatenIsland),
        ];
        let report = run_analysis(&records, &PipelineConfig::default());
        let sum: u64 = report.boroughs.iter().map(ScopeReport::total).sum();
        assert_eq!(sum, report.citywide.total());
    }

    #[test]
    fn comparison_regresses_one_borough_on_another() {
        // Bronx 10, 20, 10, 20 gives +100, -50, +100.
        // Brooklyn 10, 30, 15, 45 gives +200, -50, +200, collinear with Bronx.
        let mut records = Vec::new();
        for (year, bronx, brooklyn) in [
            (2017, 10, 10),
            (2018, 20, 30),
            (2019, 10, 15),
            (2020, 20, 45),
        ] {
            records.extend(repeat(bronx, record(year, 6, 1, Borough::Bronx)));
            records.extend(repeat(brooklyn, record(year, 6, 1, Borough::Brooklyn)));
        }
        let report = run_analysis(&records, &PipelineConfig::default());

        assert_eq!(report.comparisons.len(), 1);
        let comparison = &report.comparisons[0];
        assert_eq!(comparison.x_scope, Scope::Borough(Borough::Bronx));
        assert_eq!(comparison.y_scope, Scope::Borough(Borough::Brooklyn));
        let model = comparison.trend.model().unwrap();
        assert_eq!(model.len(), 3);
        assert!((model.r_squared - 1.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_without_shared_years_is_undefined() {
        let records = vec![
            record(2019, 1, 1, Borough::Bronx),
            record(2020, 1, 1, Borough::Bronx),
        ];
        let config = PipelineConfig {
            comparisons: vec![(Borough::Bronx, Borough::Queens)],
        };
        let report = run_analysis(&records, &config);
        assert!(matches!(
            report.comparisons[0].trend,
            TrendOutcome::Undefined { .. }
        ));
    }
}
