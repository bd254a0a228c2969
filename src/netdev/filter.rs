// Linux NetDev Probe - Interface Filter
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Removes loopback and excluded interfaces before anything is stored.

use regex::Regex;

use super::models::{InterfaceCounters, Snapshot};

/// Name of the loopback interface, which is always dropped.
pub const LOOPBACK: &str = "lo";

/// Interface filter built from the validated configuration.
#[derive(Debug, Clone, Default)]
pub struct InterfaceFilter {
    exclude: Option<Regex>,
}

impl InterfaceFilter {
    pub fn new(exclude: Option<Regex>) -> Self {
        Self { exclude }
    }

    /// Check whether an interface survives filtering.
    pub fn accepts(&self, name: &str) -> bool {
        if name == LOOPBACK {
            return false;
        }
        match &self.exclude {
            Some(pattern) => !pattern.is_match(name),
            None => true,
        }
    }

    /// Build a name-keyed snapshot from the raw interface list.
    pub fn apply(&self, interfaces: Vec<InterfaceCounters>) -> Snapshot {
        interfaces
            .into_iter()
            .filter(|iface| self.accepts(&iface.name))
            .map(|iface| (iface.name, iface.counters))
            .collect()
    }
}
