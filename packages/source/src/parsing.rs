//! Date normalization.
//!
//! Occurrence dates arrive as locale-specific text (`MM/DD/YYYY` in the
//! NYPD exports). They are parsed into [`NaiveDate`] values; failures are
//! either fatal or skipped depending on the [`DateErrorPolicy`].

use chrono::NaiveDate;
use shooting_trends_incident_models::IncidentRecord;
use shooting_trends_source_models::{DateErrorPolicy, FilterStats, PendingIncident};

use crate::SourceError;

/// Parses an occurrence date using the given `chrono` format string.
///
/// Surrounding whitespace is ignored. Some exports append a midnight time
/// component (`"01/27/2006 12:00:00 AM"`); anything after the first space
/// is ignored when the full string does not parse.
///
/// # Errors
///
/// Returns [`SourceError::DateParse`] if the text is not a valid date in
/// `format`.
pub fn parse_occurrence_date(value: &str, format: &str) -> Result<NaiveDate, SourceError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, format)
        .or_else(|e| {
            trimmed
                .split_once(' ')
                .map_or(Err(e), |(date, _)| NaiveDate::parse_from_str(date, format))
        })
        .map_err(|_| SourceError::DateParse {
            value: value.to_owned(),
            format: format.to_owned(),
        })
}

/// Turns pending incidents into incident records by parsing their dates.
///
/// Under [`DateErrorPolicy::Fatal`] the first unparseable date aborts the
/// whole batch. Under [`DateErrorPolicy::Skip`] the row is dropped and
/// counted in `stats.unparseable_dates`. `stats.retained` is updated to the
/// number of records returned.
///
/// # Errors
///
/// Returns [`SourceError::DateParse`] under the fatal policy.
pub fn normalize_dates(
    pending: Vec<PendingIncident>,
    format: &str,
    policy: DateErrorPolicy,
    stats: &mut FilterStats,
) -> Result<Vec<IncidentRecord>, SourceError> {
    let mut records = Vec::with_capacity(pending.len());

    for incident in pending {
        match parse_occurrence_date(&incident.date_text, format) {
            Ok(occurred_on) => records.push(IncidentRecord {
                occurred_on,
                borough: incident.borough,
            }),
            Err(e) => match policy {
                DateErrorPolicy::Fatal => return Err(e),
                DateErrorPolicy::Skip => {
                    log::debug!("Skipping row with unparseable date '{}'", incident.date_text);
                    stats.unparseable_dates += 1;
                }
            },
        }
    }

    stats.retained = records.len() as u64;

    Ok(records)
}
