//! Network Quality Tester - Main CLI Application
//!
//! Probes endpoints repeatedly and reports latency, jitter, packet loss and
//! a quality grade for each, plus a ranking when several are tested.

use clap::Parser;
use network_quality_tester::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
    PKG_NAME, VERSION,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(1);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(message) = cli.validate() {
        let error = AppError::invalid_argument(message);
        reporter.report_error(&error);
        process::exit(error.exit_code());
    }

    if cli.debug {
        print_build_info();
        eprintln!("{}", cli.get_config_summary());
    }

    match App::new(cli).run().await {
        Ok(report) => process::exit(report.exit_code()),
        Err(error) => {
            reporter.report_error(&error);
            process::exit(error.exit_code());
        }
    }
}

fn print_build_info() {
    eprintln!("{} v{}", PKG_NAME, VERSION);
    eprintln!("  Built:  {}", env!("BUILD_TIME"));
    eprintln!("  Commit: {}", option_env!("GIT_COMMIT").unwrap_or("unknown"));
    eprintln!("  Target: {}", env!("TARGET_TRIPLE"));
    eprintln!();
}
