// Linux NetDev Probe - Collection Run
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! One collection tick: capture, load previous, compute, persist.
//!
//! ```text
//! capture → filter → load previous → compute rates → save current
//! ```
//!
//! The current snapshot is saved on every path once it has been captured,
//! including when rate computation fails, so the next run has a fresh
//! baseline. Only a failed save prevents that.

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::netdev::{rates, InterfaceFilter, RateRecord, SnapshotSource, StateStore, Timestamp};

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No previous state existed; the baseline was recorded.
    FirstRun,
    /// Rates against the previous observation.
    Rates(RateRecord),
}

impl RunOutcome {
    /// Rates to hand to the sink; empty on the first run.
    pub fn rates(&self) -> RateRecord {
        match self {
            Self::FirstRun => RateRecord::new(),
            Self::Rates(rates) => rates.clone(),
        }
    }
}

/// Wires a counter source, filter and state store together.
#[derive(Debug)]
pub struct Probe<S: SnapshotSource> {
    source: S,
    filter: InterfaceFilter,
    store: StateStore,
}

impl<S: SnapshotSource> Probe<S> {
    pub fn new(source: S, filter: InterfaceFilter, store: StateStore) -> Self {
        Self {
            source,
            filter,
            store,
        }
    }

    /// Run one collection tick at `now` (epoch seconds).
    pub fn run(&self, now: Timestamp) -> Result<RunOutcome> {
        // Nothing is written if the counters cannot be read
        let current = self.filter.apply(self.source.list_interfaces()?);
        if current.is_empty() {
            warn!("No interfaces left after filtering");
        }
        debug!("Captured interfaces: {:?}", current.names().collect::<Vec<_>>());

        let computed = self.store.load().and_then(|previous| {
            if previous.is_none() {
                info!("No previous state, recording baseline");
            }
            rates::compute(&current, previous.as_ref(), now)
        });

        if let Err(save_err) = self.store.save(&current, now) {
            if let Err(e) = &computed {
                error!("Rate computation also failed: {}", e);
            }
            return Err(save_err);
        }

        match computed? {
            None => Ok(RunOutcome::FirstRun),
            Some(rates) => {
                info!("Computed {} rates", rates.len());
                Ok(RunOutcome::Rates(rates))
            }
        }
    }
}
