//! Network Quality Tester
//!
//! Measures round-trip latency to configurable endpoints by sending timed
//! probes in fixed-size batches, then derives average, jitter and packet
//! loss per endpoint and grades each one into a quality tier.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod models;
pub mod output;
pub mod quality;
pub mod stats;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use client::{HttpTransport, ProbeTransport, Prober};
pub use error::{AppError, Result};
pub use executor::{BatchRunner, CancelToken};
pub use models::{Config, MultiEndpointResult, ProbeConfig, Sample, Statistics, TestResult};
pub use output::{export_results, ColoredFormatter, OutputCoordinator, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use quality::{ComparisonReport, QualityAnalyzer, QualityReport};
pub use stats::StatisticsAggregator;
pub use types::{ExportFormat, QualityTier};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_TEST_COUNT: u32 = 10;
    pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
    pub const DEFAULT_RETRIES: u32 = 3;
    pub const DEFAULT_INTERVAL_MS: u64 = 1000;
    pub const DEFAULT_TARGET_URLS: &[&str] = &[
        "https://www.cloudflare.com",
        "https://www.google.com",
    ];
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
