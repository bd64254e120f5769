//! Machine-readable export of probe results

use crate::{
    error::{AppError, Result},
    models::metrics::MultiEndpointResult,
    quality::{ComparisonReport, QualityAnalyzer, QualityReport},
    types::ExportFormat,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serializes a finished run into one export format
pub trait ResultExporter {
    fn format(&self) -> ExportFormat;

    fn export(&self, results: &MultiEndpointResult) -> Result<String>;
}

/// Quality report for one endpoint, in result order
#[derive(Debug, Serialize)]
pub struct EndpointQuality<'a> {
    pub endpoint: &'a str,
    #[serde(flatten)]
    pub report: QualityReport,
}

/// Top-level exported document
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub tool: &'static str,
    pub version: &'static str,
    pub generated_at: DateTime<Utc>,
    pub partial: bool,
    pub results: &'a MultiEndpointResult,
    pub quality: Vec<EndpointQuality<'a>>,
    pub comparison: ComparisonReport,
}

impl<'a> ExportDocument<'a> {
    pub fn new(results: &'a MultiEndpointResult) -> Self {
        let quality = results
            .iter()
            .map(|result| EndpointQuality {
                endpoint: &result.endpoint,
                report: QualityAnalyzer::classify(&result.summary),
            })
            .collect();

        Self {
            tool: crate::PKG_NAME,
            version: crate::VERSION,
            generated_at: Utc::now(),
            partial: results.is_partial(),
            results,
            quality,
            comparison: QualityAnalyzer::compare(results),
        }
    }
}

/// Pretty-printed JSON exporter
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    compact: bool,
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output instead of pretty-printed
    pub fn compact() -> Self {
        Self { compact: true }
    }
}

impl ResultExporter for JsonExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }

    fn export(&self, results: &MultiEndpointResult) -> Result<String> {
        let document = ExportDocument::new(results);
        let json = if self.compact {
            serde_json::to_string(&document)
        } else {
            serde_json::to_string_pretty(&document)
        };
        json.map_err(|e| AppError::export(format!("Failed to serialize results as JSON: {}", e)))
    }
}

/// Exporter for a format
pub fn exporter_for(format: ExportFormat) -> Box<dyn ResultExporter> {
    match format {
        ExportFormat::Json => Box::new(JsonExporter::new()),
    }
}

/// Serialize results in the requested format
pub fn export_results(results: &MultiEndpointResult, format: ExportFormat) -> Result<String> {
    exporter_for(format).export(results)
}

/// Write exported content to a file, or stdout when no path is given
pub fn write_export(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| AppError::export(format!("Failed to write {}: {}", path.display(), e))),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", content)
                .and_then(|_| stdout.flush())
                .map_err(|e| AppError::export(format!("Failed to write export to stdout: {}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::{Sample, TestResult};
    use serde_json::Value;

    fn results() -> MultiEndpointResult {
        let mut good = TestResult::new("https://b.test".to_string(), 2);
        good.add_sample(Sample::success_ms(30.0, 1));
        good.add_sample(Sample::success_ms(30.0, 2));
        good.finalize(false);

        let mut down = TestResult::new("https://a.test".to_string(), 2);
        down.add_sample(Sample::failed("timed out", 4));
        down.add_sample(Sample::failed("timed out", 4));
        down.finalize(false);

        let mut multi = MultiEndpointResult::new();
        multi.insert(down).unwrap();
        multi.insert(good).unwrap();
        multi
    }

    #[test]
    fn test_json_document_shape() {
        let json = export_results(&results(), ExportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["tool"], crate::PKG_NAME);
        assert!(value["generated_at"].is_string());
        assert_eq!(value["partial"], false);

        let b = &value["results"]["https://b.test"];
        assert_eq!(b["summary"]["avg_ms"], 30.0);
        assert_eq!(b["summary"]["packet_loss"], 0.0);
        assert_eq!(b["samples"].as_array().unwrap().len(), 2);

        let a = &value["results"]["https://a.test"];
        assert_eq!(a["summary"]["packet_loss"], 100.0);
        assert!(a["summary"]["avg_ms"].is_null());
    }

    #[test]
    fn test_json_quality_and_comparison() {
        let json = export_results(&results(), ExportFormat::Json).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        let quality = value["quality"].as_array().unwrap();
        assert_eq!(quality[0]["endpoint"], "https://a.test");
        assert_eq!(quality[0]["tier"], "Unknown");
        assert_eq!(quality[1]["endpoint"], "https://b.test");
        assert_eq!(quality[1]["tier"], "Excellent");

        assert_eq!(value["comparison"]["best_endpoint"], "https://b.test");
        assert_eq!(value["comparison"]["ranking"][0]["rank"], 1);
        assert_eq!(value["comparison"]["unranked"][0], "https://a.test");
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let json = JsonExporter::compact().export(&results()).unwrap();
        let a = json.find("\"https://a.test\":").unwrap();
        let b = json.find("\"https://b.test\":").unwrap();
        assert!(a < b);
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_write_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        let json = export_results(&results(), ExportFormat::Json).unwrap();
        write_export(&json, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, json);
    }

    #[test]
    fn test_write_export_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("results.json");

        let err = write_export("{}", Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
    }

    #[test]
    fn test_exporter_for_format() {
        assert_eq!(exporter_for(ExportFormat::Json).format(), ExportFormat::Json);
    }
}
