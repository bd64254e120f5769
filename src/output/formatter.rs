//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use crate::{
    error::{AppError, Result},
    models::metrics::{format_ms, MultiEndpointResult, TestResult},
    quality::{ComparisonReport, QualityAnalyzer},
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// Format one row per endpoint with its aggregate statistics
    fn format_results_table(&self, results: &MultiEndpointResult) -> Result<String>;

    /// Format the quality tier and recommendation for each endpoint
    fn format_quality_section(&self, results: &MultiEndpointResult) -> Result<String>;

    /// Format the endpoint ranking
    fn format_comparison(&self, report: &ComparisonReport) -> Result<String>;

    /// Format the individual samples of one batch
    fn format_samples(&self, result: &TestResult) -> Result<String>;

    /// Format error messages
    fn format_error(&self, error: &str) -> Result<String>;

    /// Format warning messages
    fn format_warning(&self, warning: &str) -> Result<String>;

    /// Format success messages
    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// List every sample under the results table
    pub show_individual_results: bool,
    /// Show table borders
    pub table_borders: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            show_individual_results: false,
            table_borders: true,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    /// Column definitions
    pub columns: Vec<Column>,
    /// Show borders around table
    pub show_borders: bool,
    /// Show header row
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    /// Column header
    pub header: String,
    /// Column alignment
    pub alignment: Alignment,
    /// Minimum width
    pub min_width: usize,
    /// Maximum width
    pub max_width: usize,
}

impl Column {
    pub fn new(header: &str, alignment: Alignment, min_width: usize, max_width: usize) -> Self {
        Self {
            header: header.to_string(),
            alignment,
            min_width,
            max_width,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
    Center,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

/// Style hook applied to a cell after padding: (row, column, padded text)
pub(crate) type CellStyle<'a> = &'a dyn Fn(usize, usize, &str) -> String;

/// Column layout of the per-endpoint results table
pub(crate) fn results_table_format(show_borders: bool) -> TableFormat {
    TableFormat {
        columns: vec![
            Column::new("Endpoint", Alignment::Left, 12, 48),
            Column::new("Probes", Alignment::Right, 6, 9),
            Column::new("Avg", Alignment::Right, 9, 12),
            Column::new("Min", Alignment::Right, 9, 12),
            Column::new("Max", Alignment::Right, 9, 12),
            Column::new("Jitter", Alignment::Right, 9, 12),
            Column::new("Loss", Alignment::Right, 6, 8),
            Column::new("Quality", Alignment::Center, 9, 9),
        ],
        show_borders,
        show_header: true,
    }
}

/// Plain cell values for one endpoint's row
pub(crate) fn results_row(result: &TestResult) -> RowData {
    let stats = &result.summary;
    let probes = if result.partial {
        format!("{}/{}*", stats.total_count, result.requested_count)
    } else {
        stats.total_count.to_string()
    };

    vec![
        result.endpoint.clone(),
        probes,
        format_ms(stats.avg_ms),
        format_ms(stats.min_ms),
        format_ms(stats.max_ms),
        format_ms(stats.jitter_ms),
        format_percentage(stats.packet_loss),
        QualityAnalyzer::tier(stats).as_str().to_string(),
    ]
}

/// Format a packet loss percentage, or "N/A" without samples
pub(crate) fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(p) => format!("{:.1}%", p),
        None => "N/A".to_string(),
    }
}

fn write_err(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Create a table with the given format and data
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        self.create_styled_table(format, rows, &|_, _, cell| cell.to_string())
    }

    /// Create a table, passing each padded data cell through `style`
    ///
    /// Styling happens after width calculation so escape codes never skew
    /// the column layout.
    pub(crate) fn create_styled_table(&self, format: &TableFormat, rows: &[RowData], style: CellStyle<'_>) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let column_widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &column_widths, format, None));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&column_widths));
                output.push('\n');
            }
        }

        for (row_idx, row) in rows.iter().enumerate() {
            output.push_str(&self.create_row(row, &column_widths, format, Some((row_idx, style))));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&column_widths));
        }

        output
    }

    /// Calculate column widths from headers, content and limits
    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format.columns.len().max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|col_idx| {
                let column = format.columns.get(col_idx);
                let mut width = column.map(|c| c.min_width.max(c.header.chars().count())).unwrap_or(0);

                for row in rows {
                    if let Some(cell) = row.get(col_idx) {
                        width = width.max(cell.chars().count());
                    }
                }

                match column {
                    Some(c) => width.min(c.max_width.max(c.header.chars().count())),
                    None => width,
                }
            })
            .collect()
    }

    /// Create a table row
    fn create_row(
        &self,
        data: &[String],
        widths: &[usize],
        format: &TableFormat,
        style: Option<(usize, CellStyle<'_>)>,
    ) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map(|c| c.alignment).unwrap_or(Alignment::Left);
            let padded = align_text(cell, width, alignment);
            let rendered = match style {
                Some((row_idx, style)) => style(row_idx, idx, &padded),
                None => padded,
            };

            if format.show_borders {
                row.push(' ');
                row.push_str(&rendered);
                row.push_str(" |");
            } else {
                row.push_str(&rendered);
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    /// Create horizontal border for table
    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::new();

        if !widths.is_empty() {
            border.push('+');
            for &width in widths {
                border.push_str(&"-".repeat(width + 2));
                border.push('+');
            }
        }

        border
    }
}

/// Align text within specified width, truncating when too long
pub(crate) fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }

    let padding = width - len;
    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);

        writeln!(output, "{}", border).map_err(write_err)?;
        writeln!(output, "  {}  ", title).map_err(write_err)?;
        write!(output, "{}", border).map_err(write_err)?;

        Ok(output)
    }

    fn format_results_table(&self, results: &MultiEndpointResult) -> Result<String> {
        if results.is_empty() {
            return Ok("No test results available.".to_string());
        }

        let rows: Vec<RowData> = results.iter().map(results_row).collect();
        let mut output = self.create_table(&results_table_format(self.options.table_borders), &rows);

        if results.is_partial() {
            output.push_str("\n* run was cancelled; statistics cover the completed probes only");
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
        let mut output = String::new();

        writeln!(output, "Quality Assessment:").map_err(write_err)?;
        write!(output, "-------------------").map_err(write_err)?;

        for result in results.iter() {
            let report = QualityAnalyzer::classify(&result.summary);
            write!(output, "\n{} [{}]\n  {}", result.endpoint, report.tier, report.recommendation)
                .map_err(write_err)?;

            if self.options.verbose_mode && report.tier.is_known() {
                let stats = &result.summary;
                write!(
                    output,
                    "\n  median {} | p95 {} | std dev {}",
                    format_ms(stats.median_ms),
                    format_ms(stats.p95_ms),
                    format_ms(stats.std_dev_ms)
                )
                .map_err(write_err)?;
            }
        }

        Ok(output)
    }

    fn format_comparison(&self, report: &ComparisonReport) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Ranking:").map_err(write_err)?;
        write!(output, "--------").map_err(write_err)?;

        if report.is_no_data() {
            write!(output, "\nNo endpoint answered; nothing to rank.").map_err(write_err)?;
            return Ok(output);
        }

        for entry in &report.ranking {
            write!(
                output,
                "\n{:>2}. {} ({}, {} loss, {})",
                entry.rank,
                entry.endpoint,
                format_ms(Some(entry.avg_ms)),
                format_percentage(Some(entry.packet_loss)),
                entry.tier
            )
            .map_err(write_err)?;
        }

        for endpoint in &report.unranked {
            write!(output, "\n  - {} (unreachable)", endpoint).map_err(write_err)?;
        }

        if let Some(best) = &report.best_endpoint {
            write!(output, "\n\nBest endpoint: {}", best).map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_samples(&self, result: &TestResult) -> Result<String> {
        let mut output = String::new();
        write!(output, "{}:", result.endpoint).map_err(write_err)?;

        for (seq, sample) in result.samples.iter().enumerate() {
            match sample.latency_ms() {
                Some(ms) => write!(output, "\n  #{:<3} {:>10}  attempts={}", seq + 1, format_ms(Some(ms)), sample.attempts()),
                None => write!(
                    output,
                    "\n  #{:<3} {:>10}  attempts={}  {}",
                    seq + 1,
                    "failed",
                    sample.attempts(),
                    sample.error().unwrap_or("unknown error")
                ),
            }
            .map_err(write_err)?;
        }

        Ok(output)
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
