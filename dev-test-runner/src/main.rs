//! Runs resolution scenarios and reports mismatches.
use std::process::ExitCode;

use clap::Parser;
use dev_test_runner::{DEFAULT_PATTERN, run_all};
use tracing_subscriber::EnvFilter;

/// resolve every case of the given scenario files and compare with the expected outcome
#[derive(Parser, Debug)]
struct CommandLineInterface {
    /// scenario files or quoted glob patterns (bundled fixtures if omitted)
    input: Vec<String>,

    /// print passing cases too
    #[arg(long, short)]
    verbose: bool,

    /// print the whole report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = CommandLineInterface::parse();
    let patterns = if cli.input.is_empty() { vec![DEFAULT_PATTERN.to_string()] } else { cli.input.clone() };
    let report = run_all(&patterns)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for result in &report.results {
            if result.passed() && !cli.verbose {
                continue;
            }
            let status = if result.passed() { "ok  " } else { "FAIL" };
            println!(
                "{status} {}#{} {} => {} (expected {})",
                result.scenario.display(),
                result.index,
                result.subject,
                result.actual,
                result.expected
            );
        }
        let failed = report.failures().count();
        println!("{} passed, {failed} failed", report.results.len() - failed);
    }

    Ok(if report.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
