//! nr-slice - network slicing QoS simulator
//!
//! Loads a scenario YAML, activates one dedicated bearer per endpoint,
//! runs the simulated traffic window and prints the per-device report.
//!
//! # Usage
//!
//! ```bash
//! nr-slice -c config/slice.yaml
//! nr-slice -c config/slice.yaml --seed 42 -l debug
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use slicesim_common::{init_logging, load_scenario, LogLevel};
use slicesim_core::engine;

/// nr-slice - 5G Network Slicing QoS Simulator
#[derive(Parser, Debug)]
#[command(name = "nr-slice")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the scenario configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long = "log-level", default_value = "info")]
    log_level: LogLevel,

    /// Override the scenario's random seed
    #[arg(short = 's', long = "seed", value_name = "SEED")]
    seed: Option<u64>,

    /// Print only the results table, without the configuration summary
    #[arg(long = "no-summary")]
    no_summary: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let mut scenario = load_scenario(&args.config_file)
        .with_context(|| format!("failed to load scenario '{}'", args.config_file))?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    info!(
        endpoints = scenario.endpoints.len(),
        duration_ms = scenario.time.duration_ms,
        seed = scenario.seed,
        "scenario loaded"
    );

    let configured = engine::configure(scenario).context("scenario configuration rejected")?;
    let completed = configured.run();

    print!("{}", completed.render_report());
    if !args.no_summary {
        print!("{}", completed.render_config_summary());
    }

    Ok(())
}
