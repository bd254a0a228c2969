// Linux NetDev Probe - Metrics Sink
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Output in the monitoring agent's plugin text format.
//!
//! Metric lines are `name<TAB>value<TAB>epoch`. When the agent asks for
//! metadata the graph schema is printed instead, as JSON after a
//! `# mackerel-agent-plugin` marker line.
//!
//! Only names that fit one of the wildcard graphs are written; an interface
//! segment outside `[-a-zA-Z0-9_]+` (a VLAN like `eth0.100`) is skipped.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::netdev::{RateRecord, Timestamp};

/// Environment variable the agent sets when it wants graph metadata.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

const META_HEADER: &str = "# mackerel-agent-plugin";

/// Characters the agent accepts in the `#` segment of a graph key.
const WILDCARD_SEGMENT: &str = "[-a-zA-Z0-9_]+";

/// Matches every metric name covered by [`graph_definitions`].
static GRAPH_METRIC_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = graph_definitions()
        .iter()
        .map(|(key, graph)| {
            let names: Vec<String> = graph.metrics.iter().map(|m| regex::escape(m.name)).collect();
            format!(
                "{}{}\\.(?:{})",
                regex::escape(key.trim_end_matches('#')),
                WILDCARD_SEGMENT,
                names.join("|")
            )
        })
        .collect();
    Regex::new(&format!("^(?:{})$", alternatives.join("|")))
        .expect("graph keys form a valid pattern")
});

/// One line on a graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphMetric {
    pub name: &'static str,
    pub label: &'static str,
    pub stacked: bool,
}

/// A graph keyed by a wildcard interface segment.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    pub label: &'static str,
    pub unit: &'static str,
    pub metrics: Vec<GraphMetric>,
}

#[derive(Serialize)]
struct GraphMeta {
    graphs: BTreeMap<&'static str, Graph>,
}

fn graph(label: &'static str, tx_label: &'static str, rx_label: &'static str) -> Graph {
    Graph {
        label,
        unit: "integer",
        metrics: vec![
            GraphMetric { name: "tx", label: tx_label, stacked: false },
            GraphMetric { name: "rx", label: rx_label, stacked: false },
        ],
    }
}

/// Static graph schema for errors, drops and packets per second.
pub fn graph_definitions() -> BTreeMap<&'static str, Graph> {
    BTreeMap::from([
        (
            "linux-netdev.errors.#",
            graph(
                "Linux NetDev errors per sec",
                "transmit errors encountered",
                "receive errors encountered",
            ),
        ),
        (
            "linux-netdev.dropped.#",
            graph(
                "Linux NetDev dropped packets per sec",
                "packets dropped while transmitting",
                "packets dropped while receiving",
            ),
        ),
        (
            "linux-netdev.pps.#",
            graph(
                "Linux NetDev packets per sec",
                "packets transmitted",
                "packets received",
            ),
        ),
    ])
}

/// Check whether a metric name belongs to one of the declared graphs.
pub fn fits_graph(name: &str) -> bool {
    GRAPH_METRIC_NAME.is_match(name)
}

/// Consumer of a run's rates.
pub trait MetricsSink {
    fn emit(&mut self, rates: &RateRecord, now: Timestamp) -> io::Result<()>;
}

/// Writes plugin text lines to any writer, usually stdout.
#[derive(Debug)]
pub struct PluginOutput<W: Write> {
    writer: W,
}

impl<W: Write> PluginOutput<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Print the graph schema.
    pub fn write_meta(&mut self) -> io::Result<()> {
        let meta = GraphMeta {
            graphs: graph_definitions(),
        };
        writeln!(self.writer, "{}", META_HEADER)?;
        serde_json::to_writer(&mut self.writer, &meta)?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> MetricsSink for PluginOutput<W> {
    fn emit(&mut self, rates: &RateRecord, now: Timestamp) -> io::Result<()> {
        for (name, value) in rates.iter() {
            if !fits_graph(name) {
                debug!("Skipping {}: does not fit any graph", name);
                continue;
            }
            writeln!(self.writer, "{}\t{:.6}\t{}", name, value, now)?;
        }
        self.writer.flush()
    }
}
