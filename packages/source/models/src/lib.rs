#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw dataset row types and the policies that govern cleaning them.
//!
//! A dataset file is read into [`RawIncidentRow`] values, narrowed to
//! [`PendingIncident`] values by the record filter, and finally turned into
//! [`shooting_trends_incident_models::IncidentRecord`] by the date
//! normalizer. [`FilterStats`] tallies every row that was dropped along the
//! way.

use serde::{Deserialize, Serialize};
use shooting_trends_incident_models::Borough;
use strum_macros::{AsRefStr, Display, EnumString};

/// A dataset row projected to the three columns the analysis needs.
///
/// Every field is optional: empty cells become `None`, and a flag value
/// that is neither true nor false is also `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIncidentRow {
    /// Occurrence date as written in the dataset (e.g. `"01/27/2006"`).
    pub occur_date: Option<String>,
    /// Region value as written in the dataset (e.g. `"BRONX"`).
    pub region: Option<String>,
    /// Whether the victim's injury was classified as a statistical murder.
    pub statistical_murder_flag: Option<bool>,
}

impl RawIncidentRow {
    /// Builds a row from raw cell values, mapping empty cells to `None`.
    #[must_use]
    pub fn from_cells(occur_date: &str, region: &str, flag: &str) -> Self {
        Self {
            occur_date: non_empty(occur_date),
            region: non_empty(region),
            statistical_murder_flag: parse_flag(flag),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Parses a boolean flag cell. Accepts `true`/`false`, `Y`/`N` and `1`/`0`
/// in any case.
#[must_use]
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "y" | "yes" | "1" => Some(true),
        "false" | "f" | "n" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// A row that passed the record filter but whose date has not been parsed
/// yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingIncident {
    /// Occurrence date text, guaranteed non-empty.
    pub date_text: String,
    /// Borough the row belongs to.
    pub borough: Borough,
}

/// What to do with a row whose occurrence date cannot be parsed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum DateErrorPolicy {
    /// Abort the whole run on the first unparseable date.
    #[default]
    Fatal,
    /// Drop the row and count it in [`FilterStats::unparseable_dates`].
    Skip,
}

/// Tally of rows read and dropped while cleaning a dataset.
///
/// Rows are dropped without per-row diagnostics; these counters are the
/// only record of how much data was discarded and why.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterStats {
    /// Rows read from the dataset.
    pub total_rows: u64,
    /// Rows dropped because the statistical-murder flag was true or unknown.
    pub excluded_by_flag: u64,
    /// Rows dropped because the date was missing.
    pub missing_date: u64,
    /// Rows dropped because the region was missing or not a known borough.
    pub missing_region: u64,
    /// Rows dropped because the date could not be parsed (skip policy only).
    pub unparseable_dates: u64,
    /// Rows that became incident records.
    pub retained: u64,
}

impl FilterStats {
    /// Total number of rows dropped for any reason.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.excluded_by_flag + self.missing_date + self.missing_region + self.unparseable_dates
    }
}
