//! Colored formatter implementation with terminal color support
//!
//! Wraps the plain formatter's table layout and applies ANSI colors to
//! already-padded cells, so column widths are identical in both modes.

use super::formatter::{
    format_percentage, results_row, results_table_format, FormattingOptions, OutputFormatter, PlainFormatter, RowData,
};
use crate::{
    error::Result,
    models::metrics::{format_ms, MultiEndpointResult, TestResult},
    quality::{ComparisonReport, QualityAnalyzer},
    types::QualityTier,
};
use colored::*;

/// Column holding the quality tier in the results table
const QUALITY_COLUMN: usize = 7;
/// Column holding packet loss in the results table
const LOSS_COLUMN: usize = 6;

/// Color used for a quality tier
pub fn tier_color(tier: QualityTier) -> Color {
    match tier {
        QualityTier::Excellent => Color::Green,
        QualityTier::Good => Color::Cyan,
        QualityTier::Fair => Color::Yellow,
        QualityTier::Poor => Color::Red,
        QualityTier::Unknown => Color::BrightBlack,
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            highlight: Color::Magenta,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    plain_formatter: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    /// Create a colored formatter with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain_formatter: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    /// Apply color to text if colors are enabled
    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    /// Bold and colored, or plain when colors are disabled
    fn strong(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color).bold()
        } else {
            text.normal()
        }
    }

    fn loss_color(&self, loss: Option<f64>) -> Color {
        match loss {
            Some(l) if l == 0.0 => self.color_scheme.success,
            Some(l) if l < 5.0 => self.color_scheme.warning,
            Some(_) => self.color_scheme.error,
            None => self.color_scheme.muted,
        }
    }

    fn section_title(&self, title: &str) -> String {
        self.strong(title, self.color_scheme.header).to_string()
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "═".repeat(title.chars().count() + 4);
        Ok(format!(
            "{}\n  {}  \n{}",
            self.colorize(&border, self.color_scheme.header),
            self.bold(title),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_results_table(&self, results: &MultiEndpointResult) -> Result<String> {
        if results.is_empty() {
            return Ok(self.colorize("No test results available.", self.color_scheme.muted).to_string());
        }

        let ordered: Vec<&TestResult> = results.iter().collect();
        let rows: Vec<RowData> = ordered.iter().map(|r| results_row(r)).collect();

        let style = |row: usize, col: usize, cell: &str| -> String {
            let stats = &ordered[row].summary;
            match col {
                QUALITY_COLUMN => self.colorize(cell, tier_color(QualityAnalyzer::tier(stats))).to_string(),
                LOSS_COLUMN => self.colorize(cell, self.loss_color(stats.packet_loss)).to_string(),
                _ => cell.to_string(),
            }
        };

        let mut output = self.plain_formatter.create_styled_table(
            &results_table_format(self.options.table_borders),
            &rows,
            &style,
        );

        if results.is_partial() {
            output.push('\n');
            output.push_str(
                &self
                    .colorize("* run was cancelled; statistics cover the completed probes only", self.color_scheme.warning)
                    .to_string(),
            );
        }

        if self.options.show_individual_results {
            for result in results.iter() {
                output.push_str("\n\n");
                output.push_str(&self.format_samples(result)?);
            }
        }

        Ok(output)
    }

    fn format_quality_section(&self, results: &MultiEndpointResult) -> Result<String> {
        let mut output = self.section_title("Quality Assessment");

        for result in results.iter() {
            let report = QualityAnalyzer::classify(&result.summary);
            let tier = self.strong(report.tier.as_str(), tier_color(report.tier));
            output.push_str(&format!("\n{} {}\n  {}", self.bold(&result.endpoint), tier, report.recommendation));

            if self.options.verbose_mode && report.tier.is_known() {
                let stats = &result.summary;
                let detail = format!(
                    "median {} | p95 {} | std dev {}",
                    format_ms(stats.median_ms),
                    format_ms(stats.p95_ms),
                    format_ms(stats.std_dev_ms)
                );
                output.push_str(&format!("\n  {}", self.colorize(&detail, self.color_scheme.muted)));
            }
        }

        Ok(output)
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        let mut output = self.section_title("Ranking");

        if report.is_no_data() {
            output.push_str(&format!(
                "\n{}",
                self.colorize("No endpoint answered; nothing to rank.", self.color_scheme.error)
            ));
            return Ok(output);
        }

        for entry in &report.ranking {
            output.push_str(&format!(
                "\n{:>2}. {} ({}, {} loss, {})",
                entry.rank,
                entry.endpoint,
                format_ms(Some(entry.avg_ms)),
                format_percentage(Some(entry.packet_loss)),
                self.colorize(entry.tier.as_str(), tier_color(entry.tier))
            ));
        }

        for endpoint in &report.unranked {
            output.push_str(&format!(
                "\n  - {}",
                self.colorize(&format!("{} (unreachable)", endpoint), self.color_scheme.muted)
            ));
        }

        if let Some(best) = &report.best_endpoint {
            output.push_str(&format!(
                "\n\nBest endpoint: {}",
                self.strong(best, self.color_scheme.highlight)
            ));
        }

        Ok(output)
    }

    fn format_samples(&self, result: &TestResult) -> Result<String> {
        let mut output = format!("{}:", self.bold(&result.endpoint));

        for (seq, sample) in result.samples.iter().enumerate() {
            let line = match sample.latency_ms() {
                Some(ms) => format!(
                    "  #{:<3} {:>10}  attempts={}",
                    seq + 1,
                    self.colorize(&format_ms(Some(ms)), self.color_scheme.success),
                    sample.attempts()
                ),
                None => format!(
                    "  #{:<3} {:>10}  attempts={}  {}",
                    seq + 1,
                    self.colorize("failed", self.color_scheme.error),
                    sample.attempts(),
                    self.colorize(sample.error().unwrap_or("unknown error"), self.color_scheme.muted)
                ),
            };
            output.push('\n');
            output.push_str(&line);
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("✗ ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("⚠ WARNING:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.strong("✓", self.color_scheme.success), message))
    }
}
