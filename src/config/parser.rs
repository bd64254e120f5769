//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::Cli,
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Configuration parser that layers defaults, `.env`, environment and CLI
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        let loaded = EnvManager::load_env_file()?;
        if loaded && self.cli.debug {
            eprintln!("Loaded environment from .env");
        }

        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI argument overrides to configuration
    fn apply_cli_overrides(&self, config: &mut Config) {
        if !self.cli.urls.is_empty() {
            config.target_urls = self.cli.urls.clone();
        }

        if let Some(count) = self.cli.count {
            config.test_count = count;
        }

        if let Some(timeout_ms) = self.cli.timeout_ms {
            config.timeout_ms = timeout_ms;
        }

        if let Some(retries) = self.cli.retries {
            config.retries = retries;
        }

        if let Some(interval_ms) = self.cli.interval_ms {
            config.interval_ms = interval_ms;
        }

        if self.cli.no_color {
            config.enable_color = false;
        } else if self.cli.color {
            config.enable_color = true;
        }

        if self.cli.export.is_some() {
            config.export_format = self.cli.export;
            config.export_path = self.cli.output.clone();
        }

        // CLI-only flags
        config.concurrent = self.cli.concurrent;
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Target URLs: {}", config.target_urls.join(", ")));
    summary.push(format!("Probe Count: {}", config.test_count));
    summary.push(format!("Timeout: {}ms", config.timeout_ms));
    summary.push(format!("Retries: {}", config.retries));
    summary.push(format!("Interval: {}ms", config.interval_ms));
    summary.push(format!("Concurrent: {}", config.concurrent));
    if let Some(format) = config.export_format {
        summary.push(format!(
            "Export: {} -> {}",
            format,
            config.export_path.as_deref().unwrap_or("stdout")
        ));
    }
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
