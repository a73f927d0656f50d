//! Config-driven dataset definition.
//!
//! [`DatasetDefinition`] captures everything unique about a dataset in a
//! serializable config struct: where to fetch it, which columns carry the
//! occurrence date, region and statistical-murder flag, how dates are
//! written, and what to do with dates that fail to parse.

use std::path::PathBuf;

use serde::Deserialize;
use shooting_trends_source_models::DateErrorPolicy;

use crate::SourceError;

/// Date format used by the NYPD open-data exports (`MM/DD/YYYY`).
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

// ── Top-level dataset definition ─────────────────────────────────────────

/// A complete, config-driven dataset definition.
///
/// Loaded from TOML files embedded at compile time (see
/// [`crate::registry`]).
#[derive(Debug, Deserialize)]
pub struct DatasetDefinition {
    /// Unique identifier (e.g., `"nypd_shooting_historic"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional URL to the human-readable data portal page.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// Licensing and usage metadata for this dataset.
    pub license: LicenseInfo,
    /// How to obtain the raw CSV.
    pub fetcher: FetcherConfig,
    /// Column names for the fields the analysis needs.
    pub fields: FieldMapping,
    /// `chrono` format string for the occurrence date column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Default handling of unparseable dates; the CLI may override it.
    #[serde(default)]
    pub date_error_policy: DateErrorPolicy,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_owned()
}

// ── License metadata ─────────────────────────────────────────────────────

/// Licensing and attribution details for a dataset.
#[derive(Debug, Deserialize)]
pub struct LicenseInfo {
    /// License type identifier (e.g. `"public_domain"`, `"open_data"`).
    pub license_type: String,
    /// URL to the terms of use, if available.
    pub tos_url: Option<String>,
    /// Whether attribution is required when publishing derived reports.
    pub attribution_required: bool,
    /// Verbatim attribution text to include in reports.
    pub attribution_text: Option<String>,
}

// ── Fetcher config ───────────────────────────────────────────────────────

/// Where the raw CSV comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Download the CSV over HTTP.
    CsvDownload {
        /// URL of the CSV export.
        url: String,
    },
    /// Read the CSV from the local filesystem.
    LocalFile {
        /// Path to the CSV file.
        path: PathBuf,
    },
}

// ── Field mapping ────────────────────────────────────────────────────────

/// Maps dataset column headers to the fields of
/// [`shooting_trends_source_models::RawIncidentRow`].
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Column holding the occurrence date.
    pub date: String,
    /// Column holding the region (borough) name.
    pub region: String,
    /// Column holding the statistical-murder flag.
    pub flag: String,
}

impl DatasetDefinition {
    /// Returns the unique dataset identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable dataset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the licensing metadata for this dataset.
    #[must_use]
    pub const fn license(&self) -> &LicenseInfo {
        &self.license
    }

    /// Returns the portal URL, falling back to the download URL for
    /// remote datasets.
    #[must_use]
    pub fn portal_url(&self) -> Option<&str> {
        self.portal_url.as_deref().or(match &self.fetcher {
            FetcherConfig::CsvDownload { url } => Some(url.as_str()),
            FetcherConfig::LocalFile { .. } => None,
        })
    }
}

/// Parses a TOML string into a [`DatasetDefinition`].
///
/// # Errors
///
/// Returns [`SourceError::Definition`] if the TOML is invalid or does not
/// match the expected schema.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
id = "example"
name = "Example"

[license]
license_type = "open_data"
attribution_required = true
attribution_text = "Example City"

[fetcher]
type = "csv_download"
url = "https://example.com/rows.csv"

[fields]
date = "OCCUR_DATE"
region = "BORO"
flag = "STATISTICAL_MURDER_FLAG"
"#;

    #[test]
    fn applies_defaults() {
        let def = parse_dataset_toml(MINIMAL).unwrap();
        assert_eq!(def.id(), "example");
        assert_eq!(def.date_format, DEFAULT_DATE_FORMAT);
        assert_eq!(def.date_error_policy, DateErrorPolicy::Fatal);
        assert_eq!(def.portal_url(), Some("https://example.com/rows.csv"));
        assert!(def.license().attribution_required);
    }

    #[test]
    fn parses_explicit_policy_and_format() {
        let toml = MINIMAL.replace(
            "[license]",
            "date_format = \"%Y-%m-%d\"\ndate_error_policy = \"skip\"\n\n[license]",
        );
        let def = parse_dataset_toml(&toml).unwrap();
        assert_eq!(def.date_format, "%Y-%m-%d");
        assert_eq!(def.date_error_policy, DateErrorPolicy::Skip);
    }

    #[test]
    fn rejects_unknown_fetcher() {
        let toml = MINIMAL.replace("csv_download", "ftp_mirror");
        assert!(matches!(
            parse_dataset_toml(&toml),
            Err(SourceError::Definition(_))
        ));
    }
}
