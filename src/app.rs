//! Main application orchestration and execution

use crate::{
    cli::Cli,
    client::{HttpTransport, ProbeTransport},
    config::{display_config_summary, load_config, validate_config},
    error::Result,
    executor::{BatchRunner, CancelToken},
    log_debug, log_info, log_warn,
    logging::LoggerFactory,
    models::{Config, MultiEndpointResult},
    output::{export_results, write_export, OutputCoordinator, OutputFormatterFactory},
};
use std::path::Path;
use std::sync::Arc;

/// Exit code used when a run was interrupted with Ctrl-C
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// What a finished run produced
#[derive(Debug)]
pub struct RunReport {
    pub results: MultiEndpointResult,
    pub cancelled: bool,
}

impl RunReport {
    pub fn exit_code(&self) -> i32 {
        if self.cancelled {
            CANCELLED_EXIT_CODE
        } else {
            0
        }
    }
}

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Load configuration, probe every endpoint, then print and export
    pub async fn run(self) -> Result<RunReport> {
        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;

        if self.cli.color {
            colored::control::set_override(true);
        } else if !config.enable_color {
            colored::control::set_override(false);
        }

        let factory = LoggerFactory::new(config.clone());
        let logger = factory.create_logger("APP").await;

        log_debug!(logger, "Configuration:\n{}", display_config_summary(&config));
        for warning in &warnings {
            eprintln!("{}", warning.format(config.enable_color));
        }

        let transport: Arc<dyn ProbeTransport> = Arc::new(HttpTransport::new()?);
        let cancel = CancelToken::new();
        let ctrl_c = cancel.cancel_on_ctrl_c();

        let runner = BatchRunner::new(transport, config.probe_config())
            .with_logger(factory.create_probe_logger().await)
            .with_cancel_token(cancel.clone());

        log_info!(
            logger,
            "Probing {} endpoint(s), {} probes each{}",
            config.target_urls.len(),
            config.test_count,
            if config.concurrent { " (concurrently)" } else { "" }
        );

        let outcome = if config.concurrent {
            runner.run_many_concurrent(&config.target_urls, config.test_count).await
        } else {
            runner.run_many(&config.target_urls, config.test_count).await
        };
        ctrl_c.abort();
        let results = outcome?;

        let cancelled = cancel.is_cancelled();
        if cancelled {
            log_warn!(logger, "Run cancelled; reporting {} partial result(s)", results.len());
        }

        Self::present(&config, &results)?;

        Ok(RunReport { results, cancelled })
    }

    /// Print the console report and write the export, if any
    fn present(config: &Config, results: &MultiEndpointResult) -> Result<()> {
        let coordinator = OutputCoordinator::new(OutputFormatterFactory::create_formatter(
            config.enable_color,
            config.verbose,
        ));
        let report = coordinator.display_results(results)?;

        let Some(format) = config.export_format else {
            println!("{}", report);
            return Ok(());
        };

        let exported = export_results(results, format)?;
        match config.export_path.as_deref() {
            Some(path) => {
                println!("{}", report);
                write_export(&exported, Some(Path::new(path)))?;
                eprintln!("Results exported to {}", path);
            }
            None => {
                // Keep stdout machine-readable
                eprintln!("{}", report);
                write_export(&exported, None)?;
            }
        }

        Ok(())
    }
}
