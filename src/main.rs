//! dirx - directory summary by file extension
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use dirx::config::{CensusConfig, CliArgs};
use dirx::progress::{print_header, print_summary, ProgressReporter};
use dirx::report::print_report;
use dirx::stats::{summarize, Canonicalizer};
use dirx::walker::{scan_paths, stdin_is_path_list, Census, CensusWalker};
use std::io;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    let config = CensusConfig::from_args(args).context("Invalid configuration")?;
    let canon = Canonicalizer::builtin().context("Invalid extension groups")?;

    // Piped or redirected input is a list of paths
    let census = if stdin_is_path_list() {
        info!("Reading paths from stdin");
        scan_paths(io::stdin().lock(), &config).context("Failed to read path list")?
    } else {
        walk(&config)?
    };

    let extensions = census.table.len();
    let rows = summarize(census.table.into_stats(), &canon, config.sort_order);

    print_report(&rows, &config.display).context("Failed to write report")?;

    if config.show_progress {
        print_summary(&census.summary, extensions);
    }

    Ok(())
}

fn walk(config: &CensusConfig) -> Result<Census> {
    let walker = CensusWalker::new(config.clone());

    if !config.show_progress {
        return walker
            .run()
            .with_context(|| format!("Cannot summarize {}", config.root.display()));
    }

    print_header(&config.root, config.thread_count);
    let reporter = ProgressReporter::new();
    reporter.set_status("Walking...");

    let result = {
        let reporter = reporter.clone();
        walker.run_with_progress(move |progress| reporter.update(&progress))
    };

    match &result {
        Ok(census) => reporter.finish(&format!("Walked {} directories", census.summary.dirs)),
        Err(_) => reporter.finish_and_clear(),
    }
    result.with_context(|| format!("Cannot summarize {}", config.root.display()))
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("dirx=debug,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dirx=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
