#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dataset ingestion and cleaning.
//!
//! A [`dataset_def::DatasetDefinition`] describes where a shooting-incident
//! dataset lives and which columns matter. [`load_incidents`] fetches the
//! CSV, runs the record filter and the date normalizer, and hands back the
//! cleaned [`IncidentRecord`] values together with the [`FilterStats`]
//! describing what was discarded.

pub mod csv_download;
pub mod dataset_def;
pub mod filter;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod retry;

use std::path::PathBuf;
use std::sync::Arc;

use shooting_trends_incident_models::IncidentRecord;
use shooting_trends_source_models::{DateErrorPolicy, FilterStats};

use crate::dataset_def::{DatasetDefinition, FetcherConfig};
use crate::progress::ProgressCallback;

/// Errors that can occur while loading and cleaning a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// The response status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// CSV parsing failed.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset definition could not be parsed.
    #[error("Invalid dataset definition: {0}")]
    Definition(#[from] toml::de::Error),

    /// A configured column is absent from the CSV header row.
    #[error("Column '{column}' not found in CSV header")]
    MissingColumn {
        /// The configured column name.
        column: String,
    },

    /// The dataset contained no rows at all.
    #[error("Dataset '{dataset}' contains no rows")]
    EmptyDataset {
        /// Identifier of the offending dataset.
        dataset: String,
    },

    /// An occurrence date could not be parsed under the fatal policy.
    #[error("Unparseable occurrence date '{value}' (expected format {format})")]
    DateParse {
        /// The raw date text.
        value: String,
        /// The `chrono` format string the value was checked against.
        format: String,
    },

    /// No dataset with the requested identifier is registered.
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),
}

/// Options that override the dataset definition for a single run.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Read this local CSV instead of the configured fetcher.
    pub input_override: Option<PathBuf>,
    /// Maximum number of rows to read.
    pub limit: Option<u64>,
    /// Date error policy overriding the definition's default.
    pub date_error_policy: Option<DateErrorPolicy>,
}

/// Cleaned output of a dataset load.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// Identifier of the dataset definition that was loaded.
    pub dataset_id: String,
    /// Incident records that survived filtering and date normalization.
    pub records: Vec<IncidentRecord>,
    /// Counters for every row that was read or dropped.
    pub stats: FilterStats,
}

/// Fetches a dataset, filters its rows and normalizes their dates.
///
/// # Errors
///
/// Returns [`SourceError`] if the dataset cannot be read, is empty, lacks a
/// configured column, or contains an unparseable date under
/// [`DateErrorPolicy::Fatal`].
pub async fn load_incidents(
    definition: &DatasetDefinition,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<LoadedDataset, SourceError> {
    let rows = if let Some(path) = &options.input_override {
        log::info!("[{}] Reading local override {}", definition.id(), path.display());
        csv_download::read_csv_file(path, &definition.fields, options.limit, progress).await?
    } else {
        match &definition.fetcher {
            FetcherConfig::CsvDownload { url } => {
                csv_download::fetch_csv(url, &definition.fields, options.limit, progress).await?
            }
            FetcherConfig::LocalFile { path } => {
                csv_download::read_csv_file(path, &definition.fields, options.limit, progress)
                    .await?
            }
        }
    };

    let (pending, mut stats) = filter::filter_rows(definition.id(), &rows)?;

    let policy = options
        .date_error_policy
        .unwrap_or(definition.date_error_policy);
    let records = parsing::normalize_dates(pending, &definition.date_format, policy, &mut stats)?;

    if stats.dropped() > 0 {
        log::warn!(
            "[{}] Dropped {} of {} rows ({} flagged, {} missing date, {} missing region, {} unparseable date)",
            definition.id(),
            stats.dropped(),
            stats.total_rows,
            stats.excluded_by_flag,
            stats.missing_date,
            stats.missing_region,
            stats.unparseable_dates,
        );
    }
    log::info!(
        "[{}] {} incident records retained",
        definition.id(),
        stats.retained
    );

    Ok(LoadedDataset {
        dataset_id: definition.id().to_owned(),
        records,
        stats,
    })
}
