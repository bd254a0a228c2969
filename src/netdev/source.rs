// Linux NetDev Probe - Counter Source
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Interface counter source backed by procfs.
//!
//! `/proc/net/dev` has two header lines followed by one line per interface:
//!
//! ```text
//! Inter-|   Receive                                                |  Transmit
//!  face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
//!   eth0: 2776770   11307    0    0    0     0          0         0  2776770   11307    0    0    0     0       0          0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::models::{CounterSet, InterfaceCounters};
use crate::error::{ProbeError, Result};

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Number of counter columns after the interface name.
const FIELD_COUNT: usize = 16;

/// Anything that can list current per-interface counters.
pub trait SnapshotSource {
    fn list_interfaces(&self) -> Result<Vec<InterfaceCounters>>;
}

/// Reads counters from `/proc/net/dev`.
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcNetDev {
    pub fn new() -> Self {
        Self::with_path(PROC_NET_DEV)
    }

    /// Read from an alternate file with the same layout.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> ProbeError {
        ProbeError::SourceUnavailable {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl SnapshotSource for ProcNetDev {
    fn list_interfaces(&self) -> Result<Vec<InterfaceCounters>> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.unavailable(e.to_string()))?;

        let mut interfaces = Vec::new();
        for (index, line) in content.lines().enumerate().skip(2) {
            if line.trim().is_empty() {
                continue;
            }
            let parsed = parse_line(line)
                .ok_or_else(|| self.unavailable(format!("malformed line {}: {:?}", index + 1, line)))?;
            interfaces.push(parsed);
        }

        debug!("Read {} interfaces from {}", interfaces.len(), self.path.display());
        Ok(interfaces)
    }
}

/// Parse one data line of `/proc/net/dev`.
fn parse_line(line: &str) -> Option<InterfaceCounters> {
    // Names can be glued to the first counter ("eth0:123"), so split on the colon
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let fields: Vec<u64> = rest
        .split_whitespace()
        .map(|f| f.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if fields.len() < FIELD_COUNT {
        return None;
    }

    // Receive: bytes packets errs drop fifo frame compressed multicast
    // Transmit: bytes packets errs drop fifo colls carrier compressed
    let counters = CounterSet {
        rx_packets: fields[1],
        rx_errors: fields[2],
        rx_dropped: fields[3],
        tx_packets: fields[9],
        tx_errors: fields[10],
        tx_dropped: fields[11],
    };

    Some(InterfaceCounters::new(name, counters))
}
