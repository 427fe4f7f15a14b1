//! Kittycheck CLI - Kitty graphics protocol detection via exit code.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use kittycheck::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kittycheck")]
#[command(author, version, about = "Exit 0 if the terminal supports the Kitty graphics protocol")]
struct Cli {
    /// Probe timeout in seconds (fractional allowed, default 0.5)
    #[arg(value_name = "TIMEOUT_SECONDS", allow_hyphen_values = true)]
    timeout: Option<String>,
}

/// Resolve the positional timeout argument.
///
/// Unparsable or non-finite values fall back to the default; negative
/// values clamp to a zero budget, which makes the probe report "not
/// supported" without a single scan iteration.
fn parse_timeout(arg: Option<&str>) -> Duration {
    match arg.and_then(|s| s.parse::<f64>().ok()) {
        Some(secs) if secs.is_finite() => {
            Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(DEFAULT_TIMEOUT)
        }
        _ => DEFAULT_TIMEOUT,
    }
}

fn main() -> ExitCode {
    // Diagnostics go to stderr; stdout carries only the probe bytes.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = parse_timeout(cli.timeout.as_deref());

    if Probe::new().timeout(timeout).run() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
