//! Command-line interface

use crate::types::ExportFormat;
use clap::{ArgAction, Parser};

/// Network Quality Tester - measures latency, jitter and packet loss to endpoints
#[derive(Parser, Debug, Clone)]
#[command(name = "nqt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Endpoint URL to probe (can be used multiple times)
    #[arg(long = "url", action = ArgAction::Append)]
    pub urls: Vec<String>,

    /// Number of probes per endpoint
    #[arg(short, long)]
    pub count: Option<u32>,

    /// Per-attempt timeout in milliseconds
    #[arg(long, value_parser = parse_timeout_ms)]
    pub timeout_ms: Option<u64>,

    /// Retries after a failed attempt
    #[arg(long)]
    pub retries: Option<u32>,

    /// Delay between probes in milliseconds
    #[arg(long, value_parser = parse_interval_ms)]
    pub interval_ms: Option<u64>,

    /// Probe all endpoints at the same time
    #[arg(long)]
    pub concurrent: bool,

    /// Export results in the given format (json)
    #[arg(long, value_name = "FORMAT", value_parser = parse_export_format)]
    pub export: Option<ExportFormat>,

    /// Write the export to a file instead of stdout
    #[arg(short, long, value_name = "PATH", requires = "export")]
    pub output: Option<String>,

    /// Force colored output
    #[arg(long)]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if self.urls.iter().any(|url| url.trim().is_empty()) {
            return Err("--url cannot be empty".to_string());
        }

        if self.count == Some(0) {
            return Err("--count must be a positive integer".to_string());
        }

        Ok(())
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }

    /// Get configuration summary for display
    pub fn get_config_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Configuration Summary:\n");
        if let Some(count) = self.count {
            summary.push_str(&format!("  Probe count: {}\n", count));
        }
        if let Some(timeout) = self.timeout_ms {
            summary.push_str(&format!("  Timeout: {}ms\n", timeout));
        }
        if let Some(retries) = self.retries {
            summary.push_str(&format!("  Retries: {}\n", retries));
        }
        if let Some(interval) = self.interval_ms {
            summary.push_str(&format!("  Interval: {}ms\n", interval));
        }
        summary.push_str(&format!("  Concurrent: {}\n", self.concurrent));
        summary.push_str(&format!("  Colored output: {}\n", self.use_colors()));

        if !self.urls.is_empty() {
            summary.push_str(&format!("  URLs: {}\n", self.urls.join(", ")));
        }

        if let Some(format) = self.export {
            summary.push_str(&format!(
                "  Export: {} -> {}\n",
                format,
                self.output.as_deref().unwrap_or("stdout")
            ));
        }

        summary
    }
}

fn parse_bounded_ms(s: &str, min: u64, max: u64, name: &str) -> Result<u64, String> {
    if s.starts_with('+') || s.starts_with("0x") || s.starts_with("0X") {
        return Err(format!("Invalid {}: {}", name, s));
    }

    let value = s.parse::<u64>().map_err(|_| format!("Invalid {}: {}", name, s))?;
    if value < min {
        Err(format!("{} must be at least {}ms", name, min))
    } else if value > max {
        Err(format!("{} cannot exceed {}ms", name, max))
    } else {
        Ok(value)
    }
}

/// Parse a per-attempt timeout in milliseconds
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    parse_bounded_ms(s, 1, 300_000, "timeout")
}

/// Parse an inter-probe interval in milliseconds
fn parse_interval_ms(s: &str) -> Result<u64, String> {
    parse_bounded_ms(s, 0, 60_000, "interval")
}

fn parse_export_format(s: &str) -> Result<ExportFormat, String> {
    s.parse::<ExportFormat>().map_err(|e| e.to_string())
}

/// Check if the terminal supports color output
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    cfg!(unix)
}
