//! depfusion - Dependency confusion scanner for package manifests.
//!
//! CLI entry point.

use clap::Parser;
use depfusion::notify::{ConsoleOutput, ReportWriter};
use depfusion::{Config, Scanner};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Set up logging
    let filter = if config.scan.verbose {
        EnvFilter::new("depfusion=debug,info")
    } else {
        EnvFilter::new("depfusion=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(code) = run_scan(&config).await {
        return code;
    }

    ExitCode::SUCCESS
}

async fn run_scan(config: &Config) -> Result<(), ExitCode> {
    let scanner = match Scanner::new(&config.scan) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to create scanner: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };

    let console = ConsoleOutput::new(config.scan.verbose, config.scan.quiet);
    let results = scanner.run(&config.targets()).await;

    // Display results
    let report = ReportWriter::new(true, config.vulnerable_only);
    print!("{}", report.render(&results));
    console.print_summary(results.len(), results.vulnerability_count());

    // Save results to output file; a failed write does not change the exit status
    if let Some(ref output_path) = config.output {
        match report.persist(&results, output_path) {
            Ok(()) => console.print_saved(output_path),
            Err(e) => error!("Error saving results: {}", e),
        }
    }

    if config.fail_on_findings && results.vulnerability_count() > 0 {
        return Err(ExitCode::FAILURE);
    }

    Ok(())
}
