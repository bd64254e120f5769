//! Output formatting and display system
//!
//! Console rendering goes through the `OutputFormatter` trait, with a plain
//! and a colored implementation sharing one table layout. Machine-readable
//! export lives in `export`.

mod colored;
mod export;
mod formatter;

pub use colored::{tier_color, ColorScheme, ColoredFormatter};
pub use export::{
    export_results, exporter_for, write_export, EndpointQuality, ExportDocument, JsonExporter, ResultExporter,
};
pub use formatter::{Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat};

use crate::{error::Result, models::MultiEndpointResult, quality::QualityAnalyzer};

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            show_individual_results: verbose,
            table_borders: true,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }
}

/// Main output coordinator that handles all result display
pub struct OutputCoordinator {
    formatter: Box<dyn OutputFormatter>,
}

impl OutputCoordinator {
    /// Create a new output coordinator with the specified formatter
    pub fn new(formatter: Box<dyn OutputFormatter>) -> Self {
        Self { formatter }
    }

    /// Render the full console report for a run
    pub fn display_results(&self, results: &MultiEndpointResult) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.formatter.format_header("Network Quality Test Results")?);
        output.push_str("\n\n");

        output.push_str(&self.formatter.format_results_table(results)?);
        output.push_str("\n\n");

        if results.is_empty() {
            return Ok(output);
        }

        output.push_str(&self.formatter.format_quality_section(results)?);
        output.push_str("\n\n");

        if results.len() > 1 {
            let comparison = QualityAnalyzer::compare(results);
            output.push_str(&self.formatter.format_comparison(&comparison)?);
            output.push('\n');
        }

        Ok(output)
    }

    /// Display a one-line summary
    pub fn display_quick_summary(&self, results: &MultiEndpointResult) -> String {
        let comparison = QualityAnalyzer::compare(results);
        let probes: usize = results.iter().map(|r| r.total_count()).sum();
        let successes: usize = results.iter().map(|r| r.success_count()).sum();

        format!(
            "Endpoints: {} | Probes: {}/{} answered | Best: {}",
            results.len(),
            successes,
            probes,
            comparison.best_endpoint.as_deref().unwrap_or("none")
        )
    }

    pub fn formatter(&self) -> &dyn OutputFormatter {
        self.formatter.as_ref()
    }
}
