#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Borough taxonomy and the cleaned incident record.
//!
//! Every raw dataset row that survives filtering and date normalization
//! becomes an [`IncidentRecord`] tagged with one of the five fixed
//! [`Borough`] categories. Records are immutable once built and only live
//! long enough to be aggregated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the five New York City boroughs used as the region category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Borough {
    /// The Bronx
    Bronx,
    /// Brooklyn (Kings County)
    Brooklyn,
    /// Manhattan (New York County)
    Manhattan,
    /// Queens
    Queens,
    /// Staten Island (Richmond County)
    #[strum(to_string = "STATEN_ISLAND", serialize = "STATEN ISLAND")]
    StatenIsland,
}

impl Borough {
    /// Returns all variants of this enum in report order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Bronx,
            Self::Brooklyn,
            Self::Manhattan,
            Self::Queens,
            Self::StatenIsland,
        ]
    }

    /// Human-readable name for narrative text and chart labels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bronx => "Bronx",
            Self::Brooklyn => "Brooklyn",
            Self::Manhattan => "Manhattan",
            Self::Queens => "Queens",
            Self::StatenIsland => "Staten Island",
        }
    }

    /// Lowercase identifier used in output file names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Bronx => "bronx",
            Self::Brooklyn => "brooklyn",
            Self::Manhattan => "manhattan",
            Self::Queens => "queens",
            Self::StatenIsland => "staten_island",
        }
    }

    /// Parses a raw region value as found in the dataset.
    ///
    /// Surrounding whitespace is ignored and matching is case-insensitive,
    /// so `"STATEN ISLAND"`, `"Staten Island"` and `"staten_island"` all map
    /// to [`Borough::StatenIsland`]. Returns `None` for empty or unknown
    /// values.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse().ok()
    }
}

/// A victim-level incident after filtering and date normalization.
///
/// Rows flagged as statistical murders, and rows missing a date or borough,
/// never become an `IncidentRecord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Calendar date the incident occurred on.
    pub occurred_on: NaiveDate,
    /// Borough the incident occurred in.
    pub borough: Borough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dataset_spellings() {
        assert_eq!(Borough::from_raw("BRONX"), Some(Borough::Bronx));
        assert_eq!(Borough::from_raw(" brooklyn "), Some(Borough::Brooklyn));
        assert_eq!(
            Borough::from_raw("STATEN ISLAND"),
            Some(Borough::StatenIsland)
        );
        assert_eq!(
            Borough::from_raw("Staten Island"),
            Some(Borough::StatenIsland)
        );
        assert_eq!(
            Borough::from_raw("STATEN_ISLAND"),
            Some(Borough::StatenIsland)
        );
    }

    #[test]
    fn rejects_empty_and_unknown_regions() {
        assert_eq!(Borough::from_raw(""), None);
        assert_eq!(Borough::from_raw("   "), None);
        assert_eq!(Borough::from_raw("NEW JERSEY"), None);
        assert_eq!(Borough::from_raw("(null)"), None);
    }

    #[test]
    fn all_boroughs_have_unique_slugs() {
        let mut slugs: Vec<&str> = Borough::all().iter().map(|b| b.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), Borough::all().len());
    }

    #[test]
    fn display_roundtrips_through_from_raw() {
        for borough in Borough::all() {
            assert_eq!(Borough::from_raw(&borough.to_string()), Some(*borough));
        }
    }
}
