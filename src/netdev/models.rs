// Linux NetDev Probe - Counter Models
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Data structures for per-interface network counters.

use std::collections::{btree_map, BTreeMap};

use serde::{Deserialize, Serialize};

/// Epoch seconds.
pub type Timestamp = i64;

/// Prefix shared by every emitted metric name.
pub const METRIC_PREFIX: &str = "linux-netdev";

/// Raw kernel counters for one interface at one instant.
///
/// Every field is a monotonically increasing counter that may restart from
/// zero when the driver is reloaded or the counter wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSet {
    pub tx_packets: u64,
    pub rx_packets: u64,
    pub tx_errors: u64,
    pub rx_errors: u64,
    pub tx_dropped: u64,
    pub rx_dropped: u64,
}

/// A counter set together with the interface it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub name: String,
    pub counters: CounterSet,
}

impl InterfaceCounters {
    pub fn new(name: &str, counters: CounterSet) -> Self {
        Self {
            name: name.to_string(),
            counters,
        }
    }
}

/// Point-in-time capture of counters keyed by interface name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    interfaces: BTreeMap<String, CounterSet>,
}

impl Snapshot {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert counters for an interface, replacing any earlier entry.
    #[cfg(test)]
    pub fn insert(&mut self, name: String, counters: CounterSet) {
        self.interfaces.insert(name, counters);
    }

    pub fn get(&self, name: &str) -> Option<&CounterSet> {
        self.interfaces.get(name)
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Iterate interfaces in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, CounterSet> {
        self.interfaces.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    pub(crate) fn into_inner(self) -> BTreeMap<String, CounterSet> {
        self.interfaces
    }
}

impl From<BTreeMap<String, CounterSet>> for Snapshot {
    fn from(interfaces: BTreeMap<String, CounterSet>) -> Self {
        Self { interfaces }
    }
}

impl FromIterator<(String, CounterSet)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, CounterSet)>>(iter: I) -> Self {
        Self {
            interfaces: iter.into_iter().collect(),
        }
    }
}

/// Metric family a counter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Errors,
    Dropped,
    Packets,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Errors => "errors",
            Self::Dropped => "dropped",
            Self::Packets => "pps",
        }
    }
}

/// Traffic direction of a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Tx,
    Rx,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tx => "tx",
            Self::Rx => "rx",
        }
    }
}

/// Build a fully qualified metric name such as `linux-netdev.pps.eth0.tx`.
pub fn metric_name(kind: MetricKind, interface: &str, direction: Direction) -> String {
    format!(
        "{}.{}.{}.{}",
        METRIC_PREFIX,
        kind.as_str(),
        interface,
        direction.as_str()
    )
}

/// Per-second rates produced by one run, keyed by metric name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RateRecord {
    values: BTreeMap<String, f64>,
}

impl RateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: f64) {
        self.values.insert(name, value);
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
