//! Full report as `analysis.json`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use shooting_trends_analytics_models::AnalysisReport;

use crate::{ReportContext, ReportError, ReportSink, write_atomic};

/// File name of the JSON report.
pub const FILE_NAME: &str = "analysis.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDocument<'a> {
    context: &'a ReportContext,
    report: &'a AnalysisReport,
}

/// Serializes the context and report with `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl ReportSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(
        &self,
        context: &ReportContext,
        report: &AnalysisReport,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ReportError> {
        let path = output_dir.join(FILE_NAME);
        let contents = serde_json::to_string_pretty(&JsonDocument { context, report })?;
        write_atomic(&path, contents.as_bytes())?;
        log::info!("Saved analysis to {}", path.display());
        Ok(vec![path])
    }
}
