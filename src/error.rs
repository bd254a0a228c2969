// Linux NetDev Probe - Errors
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Error taxonomy for a single probe run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the probe components.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid interface exclusion pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot read interface counters from {}: {reason}", .path.display())]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("cannot read previous state from {}: {reason}", .path.display())]
    StateRead { path: PathBuf, reason: String },

    #[error("cannot write state to {}: {reason}", .path.display())]
    StateWrite { path: PathBuf, reason: String },

    #[error("previous state has no capture time")]
    MissingPreviousTime,

    #[error("previous state is too old ({elapsed}s since last run)")]
    StaleState { elapsed: i64 },

    #[error("clock moved backwards or did not advance ({elapsed}s since last run)")]
    ClockSkew { elapsed: i64 },
}

pub type Result<T> = std::result::Result<T, ProbeError>;
