//! CSV download and parsing.
//!
//! Downloads a CSV export (or reads a local file), locates the configured
//! date, region and flag columns by header name, and returns every row as a
//! [`RawIncidentRow`].

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use shooting_trends_source_models::RawIncidentRow;

use crate::dataset_def::FieldMapping;
use crate::progress::ProgressCallback;
use crate::{SourceError, retry};

const USER_AGENT: &str = "shooting-trends/0.1";

/// Full historic exports run to tens of megabytes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Downloads a CSV file and parses it into raw rows.
///
/// # Errors
///
/// Returns [`SourceError`] if the download fails, returns a non-success
/// status, or the body is not valid CSV with the configured columns.
pub async fn fetch_csv(
    url: &str,
    fields: &FieldMapping,
    limit: Option<u64>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawIncidentRow>, SourceError> {
    log::info!("Downloading CSV: {url}");
    progress.set_message(format!("Downloading {url}"));

    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    let bytes = retry::get_bytes(&client, url).await?;

    log::debug!("Downloaded {} bytes from {url}", bytes.len());

    parse_csv(&bytes[..], fields, limit, progress)
}

/// Reads a local CSV file and parses it into raw rows.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read or is not valid CSV
/// with the configured columns.
pub async fn read_csv_file(
    path: &Path,
    fields: &FieldMapping,
    limit: Option<u64>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawIncidentRow>, SourceError> {
    progress.set_message(format!("Reading {}", path.display()));
    let bytes = tokio::fs::read(path).await?;

    log::debug!("Read {} bytes from {}", bytes.len(), path.display());

    parse_csv(bytes.as_slice(), fields, limit, progress)
}

/// Parses CSV data into raw rows, projecting to the configured columns.
///
/// Rows shorter than the header are tolerated; missing cells read as empty.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if a configured column is absent
/// from the header row, or [`SourceError::Csv`] on malformed input.
pub fn parse_csv<R: Read>(
    reader: R,
    fields: &FieldMapping,
    limit: Option<u64>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<RawIncidentRow>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_owned())
        .collect();

    let date_idx = column_index(&headers, &fields.date)?;
    let region_idx = column_index(&headers, &fields.region)?;
    let flag_idx = column_index(&headers, &fields.flag)?;

    let mut rows = Vec::new();

    for result in reader.records() {
        if let Some(max) = limit
            && rows.len() as u64 >= max
        {
            log::info!("Reached limit of {max} rows");
            break;
        }

        let record = result?;
        rows.push(RawIncidentRow::from_cells(
            record.get(date_idx).unwrap_or(""),
            record.get(region_idx).unwrap_or(""),
            record.get(flag_idx).unwrap_or(""),
        ));
        progress.inc(1);
    }

    progress.finish(format!("Parsed {} rows", rows.len()));

    Ok(rows)
}

fn column_index(headers: &[String], column: &str) -> Result<usize, SourceError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(column))
        .ok_or_else(|| SourceError::MissingColumn {
            column: column.to_owned(),
        })
}
