//! Configuration data model and validation

use crate::config::EnvManager;
use crate::types::{AppError, ExportFormat, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Endpoints to probe, in test order
    #[serde(default = "default_target_urls")]
    pub target_urls: Vec<String>,

    /// Number of probes per endpoint
    #[serde(default = "default_test_count")]
    pub test_count: u32,

    /// Per-attempt timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries after a failed attempt before the probe is recorded as failed
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay between consecutive probes in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Run endpoint batches concurrently
    #[serde(default)]
    pub concurrent: bool,

    /// Export format for the final results
    #[serde(default)]
    pub export_format: Option<ExportFormat>,

    /// Where to write exported results; stdout when absent
    #[serde(default)]
    pub export_path: Option<String>,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_urls: default_target_urls(),
            test_count: default_test_count(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            interval_ms: default_interval_ms(),
            concurrent: false,
            export_format: None,
            export_path: None,
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get probe interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.target_urls.is_empty() {
            return Err(AppError::config("At least one target URL is required"));
        }

        for (index, url) in self.target_urls.iter().enumerate() {
            if url.is_empty() {
                return Err(AppError::config("Target URL cannot be empty"));
            }

            if let Err(e) = url::Url::parse(url) {
                return Err(AppError::config(format!("Invalid target URL '{}': {}", url, e)));
            }

            if self.target_urls[..index].contains(url) {
                return Err(AppError::config(format!("Target URL listed twice: {}", url)));
            }
        }

        if self.test_count == 0 {
            return Err(AppError::config("Test count must be greater than 0"));
        }

        if self.test_count > 1000 {
            return Err(AppError::config("Test count cannot exceed 1000"));
        }

        if self.timeout_ms == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_ms > 300_000 {
            return Err(AppError::config("Timeout cannot exceed 300000 ms"));
        }

        if self.retries > 10 {
            return Err(AppError::config("Retries cannot exceed 10"));
        }

        if self.interval_ms > 60_000 {
            return Err(AppError::config("Interval cannot exceed 60000 ms"));
        }

        Ok(())
    }

    /// Probe settings derived from this configuration
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::from(self)
    }

    /// Merge environment variables into this configuration
    ///
    /// Each variable is range-checked before it is applied, so errors name
    /// the offending variable.
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Some(target_urls) = env_var("TARGET_URLS")? {
            self.target_urls = target_urls
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(test_count) = env_var("TEST_COUNT")? {
            self.test_count = test_count.parse()?;
        }

        if let Some(timeout) = env_var("TIMEOUT_MS")? {
            self.timeout_ms = timeout.parse()?;
        }

        if let Some(retries) = env_var("RETRIES")? {
            self.retries = retries.parse()?;
        }

        if let Some(interval) = env_var("INTERVAL_MS")? {
            self.interval_ms = interval.parse()?;
        }

        if let Some(enable_color) = env_var("ENABLE_COLOR")? {
            self.enable_color = enable_color.parse()?;
        }

        Ok(())
    }
}

/// A set environment variable, validated; unset or non-unicode values are skipped
fn env_var(key: &str) -> Result<Option<String>> {
    match std::env::var(key) {
        Ok(value) => {
            EnvManager::validate_env_var(key, &value)?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

/// Settings the prober and batch runner are constructed with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after a failed attempt
    pub retries: u32,
    /// Delay between consecutive probes
    pub interval: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(crate::defaults::DEFAULT_TIMEOUT_MS),
            retries: crate::defaults::DEFAULT_RETRIES,
            interval: Duration::from_millis(crate::defaults::DEFAULT_INTERVAL_MS),
        }
    }
}

impl ProbeConfig {
    /// Build settings from a loose options object such as
    /// `{"timeoutMs": 2000, "retries": 1, "intervalMs": 250}`.
    ///
    /// Unrecognized keys are ignored and missing keys keep their defaults.
    /// Negative or zero timeouts, negative intervals and non-integer retry
    /// counts are rejected.
    pub fn from_options(options: &Value) -> Result<Self> {
        let object = options
            .as_object()
            .ok_or_else(|| AppError::invalid_argument("Probe options must be a JSON object"))?;

        let mut config = Self::default();

        if let Some(value) = lookup(object, &["timeoutMs", "timeout_ms"]) {
            let timeout = millis_option(value, "timeoutMs")?;
            if timeout.is_zero() {
                return Err(AppError::invalid_argument("timeoutMs must be greater than 0"));
            }
            config.timeout = timeout;
        }

        if let Some(value) = lookup(object, &["retries"]) {
            let retries = value
                .as_u64()
                .and_then(|r| u32::try_from(r).ok())
                .ok_or_else(|| {
                    AppError::invalid_argument(format!("retries must be a non-negative integer, got {}", value))
                })?;
            config.retries = retries;
        }

        if let Some(value) = lookup(object, &["intervalMs", "interval_ms"]) {
            config.interval = millis_option(value, "intervalMs")?;
        }

        Ok(config)
    }

    /// Total transport attempts a single probe may use
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl From<&Config> for ProbeConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.timeout(),
            retries: config.retries,
            interval: config.interval(),
        }
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

/// Millisecond option as a `Duration`; negative or unrepresentable values are rejected
fn millis_option(value: &Value, name: &str) -> Result<Duration> {
    let ms = value
        .as_f64()
        .ok_or_else(|| AppError::invalid_argument(format!("{} must be a number, got {}", name, value)))?;
    if !ms.is_finite() || ms < 0.0 {
        return Err(AppError::invalid_argument(format!("{} cannot be negative, got {}", name, ms)));
    }
    Duration::try_from_secs_f64(ms / 1000.0)
        .map_err(|e| AppError::invalid_argument(format!("{} is out of range ({}): {}", name, ms, e)))
}

// Default value functions for serde
fn default_target_urls() -> Vec<String> {
    crate::defaults::DEFAULT_TARGET_URLS
        .iter()
        .map(|&s| s.to_string())
        .collect()
}

fn default_test_count() -> u32 {
    crate::defaults::DEFAULT_TEST_COUNT
}

fn default_timeout_ms() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT_MS
}

fn default_retries() -> u32 {
    crate::defaults::DEFAULT_RETRIES
}

fn default_interval_ms() -> u64 {
    crate::defaults::DEFAULT_INTERVAL_MS
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
