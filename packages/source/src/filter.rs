//! Record filter.
//!
//! Keeps rows whose statistical-murder flag is false and that carry both an
//! occurrence date and a recognised borough, projecting them to
//! [`PendingIncident`] values. Rows failing a check are dropped without a
//! per-row diagnostic; [`FilterStats`] records how many fell out and why.

use shooting_trends_incident_models::Borough;
use shooting_trends_source_models::{FilterStats, PendingIncident, RawIncidentRow};

use crate::SourceError;

/// Filters raw rows down to pending incidents.
///
/// The returned stats have `total_rows`, `excluded_by_flag`, `missing_date`,
/// `missing_region` and a provisional `retained` filled in; the date
/// normalizer adjusts `retained` and `unparseable_dates` afterwards.
///
/// # Errors
///
/// Returns [`SourceError::EmptyDataset`] if `rows` is empty.
pub fn filter_rows(
    dataset_id: &str,
    rows: &[RawIncidentRow],
) -> Result<(Vec<PendingIncident>, FilterStats), SourceError> {
    if rows.is_empty() {
        return Err(SourceError::EmptyDataset {
            dataset: dataset_id.to_owned(),
        });
    }

    let mut stats = FilterStats {
        total_rows: rows.len() as u64,
        ..FilterStats::default()
    };

    let pending: Vec<PendingIncident> = rows
        .iter()
        .filter_map(|row| {
            if row.statistical_murder_flag != Some(false) {
                stats.excluded_by_flag += 1;
                return None;
            }
            let Some(date_text) = row.occur_date.as_deref() else {
                stats.missing_date += 1;
                return None;
            };
            let Some(borough) = row.region.as_deref().and_then(Borough::from_raw) else {
                stats.missing_region += 1;
                return None;
            };
            Some(PendingIncident {
                date_text: date_text.to_owned(),
                borough,
            })
        })
        .collect();

    stats.retained = pending.len() as u64;

    Ok((pending, stats))
}
