//! Data models for probe results and configuration

pub mod config;
pub mod metrics;

pub use config::{Config, ProbeConfig};
pub use metrics::{format_ms, MultiEndpointResult, Sample, Statistics, TestResult};
