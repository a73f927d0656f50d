//! Grouped aggregation.
//!
//! Counts incident records per period within a scope. Output is always
//! sorted ascending by period; downstream builders rely on that order and
//! do not sort again.

use std::collections::BTreeMap;

use shooting_trends_analytics_models::{PeriodCount, Scope, TimeGranularity};
use shooting_trends_incident_models::IncidentRecord;

/// Counts records in `scope` per period at the given granularity.
///
/// The result is independent of input order and contains only periods with
/// at least one record.
#[must_use]
pub fn count_by_period(
    records: &[IncidentRecord],
    granularity: TimeGranularity,
    scope: Scope,
) -> Vec<PeriodCount> {
    let mut counts = BTreeMap::new();
    for record in records.iter().filter(|r| scope.includes(r)) {
        *counts
            .entry(granularity.period_of(record.occurred_on))
            .or_insert(0_u64) += 1;
    }

    counts
        .into_iter()
        .map(|(period, count)| PeriodCount { period, count })
        .collect()
}

/// Re-aggregates an existing series to a coarser granularity.
///
/// Periods that cannot be expressed at `granularity` (a yearly series asked
/// for daily counts) are dropped with a warning.
#[must_use]
pub fn rollup(counts: &[PeriodCount], granularity: TimeGranularity) -> Vec<PeriodCount> {
    let mut rolled = BTreeMap::new();
    for pc in counts {
        if let Some(period) = pc.period.coarsen(granularity) {
            *rolled.entry(period).or_insert(0_u64) += pc.count;
        } else {
            log::warn!(
                "Cannot express {} at {granularity} granularity; dropping {} incidents",
                pc.period,
                pc.count
            );
        }
    }

    rolled
        .into_iter()
        .map(|(period, count)| PeriodCount { period, count })
        .collect()
}

/// Makes a sorted series dense by inserting zero counts for every period
/// between its first and last entry.
///
/// Percent change compares neighbouring entries, so its input must have no
/// gaps.
#[must_use]
pub fn fill_gaps(counts: &[PeriodCount]) -> Vec<PeriodCount> {
    let mut dense = Vec::with_capacity(counts.len());
    for pc in counts {
        if let Some(last) = dense.last().map(|prev: &PeriodCount| prev.period) {
            let mut next = last.succ();
            while let Some(period) = next.filter(|p| *p < pc.period) {
                dense.push(PeriodCount { period, count: 0 });
                next = period.succ();
            }
        }
        dense.push(*pc);
    }
    dense
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shooting_trends_analytics_models::Period;
    use shooting_trends_incident_models::Borough;

    use super::*;

    fn record(y: i32, m: u32, d: u32, borough: Borough) -> IncidentRecord {
        IncidentRecord {
            occurred_on: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            borough,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> Period {
        Period::Day(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn counts_daily_in_order() {
        let records = vec![
            record(2020, 1, 2, Borough::Bronx),
            record(2020, 1, 1, Borough::Bronx),
            record(2020, 1, 2, Borough::Queens),
        ];
        let counts = count_by_period(&records, TimeGranularity::Daily, Scope::Citywide);

        assert_eq!(
            counts,
            vec![
                PeriodCount {
                    period: day(2020, 1, 1),
                    count: 1
                },
                PeriodCount {
                    period: day(2020, 1, 2),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn restricts_to_borough_scope() {
        let records = vec![
            record(2019, 5, 1, Borough::Bronx),
            record(2020, 5, 1, Borough::Queens),
            record(2020, 6, 1, Borough::Bronx),
        ];
        let counts = count_by_period(
            &records,
            TimeGranularity::Yearly,
            Scope::Borough(Borough::Bronx),
        );

        assert_eq!(
            counts,
            vec![
                PeriodCount {
                    period: Period::Year(2019),
                    count: 1
                },
                PeriodCount {
                    period: Period::Year(2020),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn shuffled_input_gives_identical_output() {
        let records = vec![
            record(2018, 3, 1, Borough::Brooklyn),
            record(2020, 1, 1, Borough::Manhattan),
            record(2018, 3, 1, Borough::Brooklyn),
            record(2019, 7, 9, Borough::StatenIsland),
            record(2020, 12, 31, Borough::Bronx),
        ];
        let mut reversed = records.clone();
        reversed.reverse();
        let mut rotated = records.clone();
        rotated.rotate_left(2);

        for granularity in [
            TimeGranularity::Daily,
            TimeGranularity::Monthly,
            TimeGranularity::Yearly,
        ] {
            let expected = count_by_period(&records, granularity, Scope::Citywide);
            assert_eq!(
                count_by_period(&reversed, granularity, Scope::Citywide),
                expected
            );
            assert_eq!(
                count_by_period(&rotated, granularity, Scope::Citywide),
                expected
            );
            assert_eq!(count_by_period(&records, granularity, Scope::Citywide), expected);
        }
    }

    #[test]
    fn empty_scope_yields_empty_series() {
        let records = vec![record(2020, 1, 1, Borough::Bronx)];
        assert!(
            count_by_period(
                &records,
                TimeGranularity::Daily,
                Scope::Borough(Borough::Queens)
            )
            .is_empty()
        );
    }

    #[test]
    fn rollup_matches_direct_yearly_aggregation() {
        let records = vec![
            record(2019, 1, 1, Borough::Bronx),
            record(2019, 12, 31, Borough::Bronx),
            record(2020, 6, 15, Borough::Queens),
        ];
        let daily = count_by_period(&records, TimeGranularity::Daily, Scope::Citywide);
        let yearly = count_by_period(&records, TimeGranularity::Yearly, Scope::Citywide);

        assert_eq!(rollup(&daily, TimeGranularity::Yearly), yearly);
    }

    #[test]
    fn rollup_drops_periods_that_cannot_be_refined() {
        let yearly = vec![PeriodCount {
            period: Period::Year(2020),
            count: 3,
        }];
        assert!(rollup(&yearly, TimeGranularity::Daily).is_empty());
    }

    #[test]
    fn fill_gaps_inserts_zero_years_between_observed_ones() {
        let sparse = vec![
            PeriodCount {
                period: Period::Year(2017),
                count: 4,
            },
            PeriodCount {
                period: Period::Year(2020),
                count: 2,
            },
        ];
        let dense: Vec<(Period, u64)> = fill_gaps(&sparse)
            .into_iter()
            .map(|c| (c.period, c.count))
            .collect();

        assert_eq!(
            dense,
            vec![
                (Period::Year(2017), 4),
                (Period::Year(2018), 0),
                (Period::Year(2019), 0),
                (Period::Year(2020), 2),
            ]
        );
    }

    #[test]
    fn fill_gaps_leaves_contiguous_and_empty_series_alone() {
        let records = vec![
            record(2019, 12, 31, Borough::Bronx),
            record(2020, 1, 1, Borough::Bronx),
        ];
        let daily = count_by_period(&records, TimeGranularity::Daily, Scope::Citywide);
        assert_eq!(fill_gaps(&daily), daily);
        assert!(fill_gaps(&[]).is_empty());
    }

    #[test]
    fn fill_gaps_crosses_month_boundaries() {
        let records = vec![
            record(2019, 11, 5, Borough::Bronx),
            record(2020, 2, 5, Borough::Bronx),
        ];
        let monthly = count_by_period(&records, TimeGranularity::Monthly, Scope::Citywide);
        let counts: Vec<u64> = fill_gaps(&monthly).iter().map(|c| c.count).collect();
        assert_eq!(counts, vec![1, 0, 0, 1]);
    }
}
