//! Derived series: running totals and period-over-period percent change.
//!
//! Both builders expect counts sorted ascending by period, as produced by
//! [`crate::aggregate`], and do not re-sort.

use shooting_trends_analytics_models::{CumulativePoint, PercentChangePoint, PeriodCount};

/// Running total of `counts`, one point per input period.
#[must_use]
pub fn cumulative(counts: &[PeriodCount]) -> Vec<CumulativePoint> {
    counts
        .iter()
        .scan(0_u64, |total, pc| {
            *total += pc.count;
            Some(CumulativePoint {
                period: pc.period,
                cumulative: *total,
            })
        })
        .collect()
}

/// Percent change of each period's count relative to the previous period.
///
/// The first period has no predecessor and is omitted, so the result has
/// one point fewer than `counts`; point `k` belongs to `counts[k + 1]`.
/// When the previous count is zero the change is `None`.
#[must_use]
pub fn percent_change(counts: &[PeriodCount]) -> Vec<PercentChangePoint> {
    counts
        .windows(2)
        .map(|pair| {
            let (previous, current) = (pair[0], pair[1]);
            PercentChangePoint {
                period: current.period,
                percent_change: percent_between(previous.count, current.count),
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn percent_between(previous: u64, current: u64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    Some((current as f64 / previous as f64 - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use shooting_trends_analytics_models::Period;

    use super::*;

    fn yearly(pairs: &[(i32, u64)]) -> Vec<PeriodCount> {
        pairs
            .iter()
            .map(|&(year, count)| PeriodCount {
                period: Period::Year(year),
                count,
            })
            .collect()
    }

    #[test]
    fn cumulative_is_running_sum() {
        let counts = yearly(&[(2018, 10), (2019, 0), (2020, 15), (2021, 3)]);
        let totals: Vec<u64> = cumulative(&counts).iter().map(|p| p.cumulative).collect();
        assert_eq!(totals, vec![10, 10, 25, 28]);
    }

    #[test]
    fn cumulative_is_monotonic_and_ends_at_sum() {
        let counts = yearly(&[(2006, 2055), (2007, 1887), (2008, 1959), (2009, 1828)]);
        let series = cumulative(&counts);

        assert_eq!(series.len(), counts.len());
        assert!(series.windows(2).all(|w| w[0].cumulative <= w[1].cumulative));
        let sum: u64 = counts.iter().map(|c| c.count).sum();
        assert_eq!(series.last().map(|p| p.cumulative), Some(sum));
    }

    #[test]
    fn cumulative_keeps_periods() {
        let counts = yearly(&[(2019, 1), (2020, 2)]);
        let periods: Vec<Period> = cumulative(&counts).iter().map(|p| p.period).collect();
        assert_eq!(periods, vec![Period::Year(2019), Period::Year(2020)]);
    }

    #[test]
    fn percent_change_excludes_first_period() {
        let counts = yearly(&[(2018, 10), (2019, 20), (2020, 15)]);
        let series = percent_change(&counts);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, Period::Year(2019));
        assert_eq!(series[0].percent_change, Some(100.0));
        assert_eq!(series[1].period, Period::Year(2020));
        assert_eq!(series[1].percent_change, Some(-25.0));
    }

    #[test]
    fn percent_change_after_zero_is_undefined() {
        let counts = yearly(&[(2018, 0), (2019, 5)]);
        let series = percent_change(&counts);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].period, Period::Year(2019));
        assert_eq!(series[0].percent_change, None);
    }

    #[test]
    fn undefined_point_keeps_alignment() {
        let counts = yearly(&[(2017, 4), (2018, 0), (2019, 5), (2020, 10)]);
        let series = percent_change(&counts);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].percent_change, Some(-100.0));
        assert_eq!(series[1].percent_change, None);
        assert_eq!(series[2].period, Period::Year(2020));
        assert_eq!(series[2].percent_change, Some(100.0));
    }

    #[test]
    fn percent_change_of_short_series_is_empty() {
        assert!(percent_change(&[]).is_empty());
        assert!(percent_change(&yearly(&[(2020, 7)])).is_empty());
    }
}
