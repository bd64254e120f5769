//! Non-fatal configuration checks

use crate::{
    client::HttpUtils,
    error::Result,
    models::Config,
};
use colored::Colorize;
use std::time::Duration;

/// Timeouts below this are likely to fail on ordinary links
const SHORT_TIMEOUT: Duration = Duration::from_millis(100);

/// Worst-case run length above which a warning is raised
const LONG_RUN: Duration = Duration::from_secs(600);

/// Configuration validator producing warnings on top of `Config::validate`
pub struct ConfigValidator;

impl ConfigValidator {
    /// Hard-validate the configuration, then collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Self::validate_target_urls(&config.target_urls)?;
        warnings.extend(Self::validate_probe_settings(config));

        Ok(warnings)
    }

    fn validate_target_urls(urls: &[String]) -> Result<Vec<ValidationWarning>> {
        let mut warnings = Vec::new();

        for url in urls {
            HttpUtils::validate_url(url)?;

            if !HttpUtils::is_https(url) {
                warnings.push(ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("URL '{}' uses plain HTTP; intermediaries may skew latency", url),
                ));
            }

            if let Ok(parsed) = url::Url::parse(url) {
                if let Some(url::Host::Ipv4(ip)) = parsed.host() {
                    if ip.is_private() || ip.is_loopback() {
                        warnings.push(ValidationWarning::new(
                            ValidationLevel::Info,
                            format!("URL '{}' targets a private or local address", url),
                        ));
                    }
                }
            }
        }

        Ok(warnings)
    }

    fn validate_probe_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.timeout() < SHORT_TIMEOUT {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("Timeout of {}ms is very short; most probes may be recorded as lost", config.timeout_ms),
            ));
        }

        if config.interval_ms == 0 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                "Interval is 0ms; probes run back to back and jitter may be understated".to_string(),
            ));
        }

        if config.test_count < 2 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                "A single probe per endpoint cannot measure jitter".to_string(),
            ));
        }

        let worst_case = Self::worst_case_duration(config);
        if worst_case > LONG_RUN {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("A fully failing run could take up to {}s", worst_case.as_secs()),
            ));
        }

        warnings
    }

    /// Upper bound on run time when every attempt times out
    pub fn worst_case_duration(config: &Config) -> Duration {
        let attempts = u64::from(config.retries) + 1;
        let per_batch = config.timeout_ms * attempts * u64::from(config.test_count)
            + config.interval_ms * u64::from(config.test_count.saturating_sub(1));
        let batches = if config.concurrent { 1 } else { config.target_urls.len() as u64 };

        Duration::from_millis(per_batch.saturating_mul(batches))
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if !use_color {
            return format!("{} {}", tag, self.message);
        }

        let tag = match self.level {
            ValidationLevel::Info => tag.blue(),
            ValidationLevel::Warning => tag.yellow(),
        };
        format!("{} {}", tag, self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}
