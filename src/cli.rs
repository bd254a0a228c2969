// Linux NetDev Probe - Command Line
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Per-interface network error, drop and packet rates for monitoring agents.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "linux-netdev-probe", disable_version_flag = true)]
pub struct Args {
    /// Show version and build information
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Regexp for interface names to ignore
    #[arg(long, env = "NETDEV_IGNORE_INTERFACES", value_name = "REGEX")]
    pub ignore_interfaces: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    pub settings: Option<PathBuf>,
}

/// Scan raw arguments for `-v`/`--version` when full parsing failed.
pub fn wants_version<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| arg.as_ref().to_string())
        .take_while(|arg| arg != "--")
        .any(|arg| arg == "-v" || arg == "--version")
}

/// Version banner printed by `--version`.
pub fn version_text(program: &str) -> String {
    format!(
        "{} {}\nCompiler: {} ({})\n",
        program,
        env!("CARGO_PKG_VERSION"),
        env!("NETDEV_PROBE_RUSTC_VERSION"),
        env!("NETDEV_PROBE_TARGET"),
    )
}
