// Linux NetDev Probe - Main Entry Point
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Linux NetDev Probe - per-interface network error, drop and packet rates.
//!
//! Each invocation is one collection tick: counters are read from procfs,
//! compared with the snapshot saved by the previous invocation, and the
//! resulting per-second rates are printed for the monitoring agent.

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod error;
mod netdev;
mod probe;
mod sink;

use cli::Args;
use config::ProbeConfig;
use netdev::{ProcNetDev, StateStore};
use probe::Probe;
use sink::{MetricsSink, PluginOutput};

fn main() -> ExitCode {
    let program = env::args().next().unwrap_or_else(|| "linux-netdev-probe".to_string());

    // The version flag wins even when other arguments are malformed
    let args = match Args::try_parse() {
        Ok(args) if !args.version => args,
        Ok(_) => return print_version(&program),
        Err(_) if cli::wants_version(env::args().skip(1)) => return print_version(&program),
        Err(e) => e.exit(),
    };

    // Initialize logging; stdout belongs to the agent
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_version(program: &str) -> ExitCode {
    print!("{}", cli::version_text(program));
    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    // Pattern errors surface before any collection work
    let config = ProbeConfig::load(args).context("Invalid configuration")?;

    let mut output = PluginOutput::new(io::stdout().lock());
    if env::var_os(sink::META_ENV).is_some_and(|v| !v.is_empty()) {
        return output.write_meta().context("Failed to write graph definitions");
    }

    if let Some(pattern) = config.ignore_interfaces() {
        debug!("Ignoring interfaces matching {}", pattern);
    }

    let store = StateStore::for_current_user();
    debug!("State file: {}", store.path().display());

    let probe = Probe::new(ProcNetDev::new(), config.interface_filter(), store);
    let now = chrono::Utc::now().timestamp();
    let outcome = probe.run(now).context("Network device collection failed")?;

    let rates = outcome.rates();
    if rates.is_empty() {
        debug!("No rates to report this run");
    }
    output
        .emit(&rates, now)
        .context("Failed to write metrics")?;
    Ok(())
}
