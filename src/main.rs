//! benchprobe CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use benchprobe::{batch, BenchProbeError, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(summary) => {
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> benchprobe::Result<String> {
    if !cli.index.exists() {
        return Err(BenchProbeError::FileNotFound {
            path: cli.index.display().to_string(),
        });
    }

    let summary = batch::run(&cli.batch_config())?;

    Ok(format!(
        "Wrote {} records to {} ({} successful of {} attempted)",
        summary.written,
        cli.output.display(),
        summary.successful,
        summary.attempted
    ))
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "benchprobe=debug"
    } else {
        "benchprobe=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
