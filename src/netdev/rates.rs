// Linux NetDev Probe - Rate Engine
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Turns two counter snapshots into per-second rates.

use tracing::debug;

use super::models::{metric_name, CounterSet, Direction, MetricKind, RateRecord, Snapshot, Timestamp};
use super::store::PreviousState;
use crate::error::{ProbeError, Result};

/// Longest gap between runs, in seconds, that still yields meaningful rates.
pub const MAX_ELAPSED_SECS: i64 = 600;

/// Interface segment used for the totals across all interfaces.
pub const AGGREGATE_INTERFACE: &str = "all";

/// One counter column and how it is reported.
struct CounterColumn {
    kind: MetricKind,
    direction: Direction,
    read: fn(&CounterSet) -> u64,
    /// Whether the counter also feeds an `all` total.
    aggregate: bool,
}

const COUNTERS: [CounterColumn; 6] = [
    CounterColumn { kind: MetricKind::Errors, direction: Direction::Tx, read: |c| c.tx_errors, aggregate: true },
    CounterColumn { kind: MetricKind::Dropped, direction: Direction::Tx, read: |c| c.tx_dropped, aggregate: true },
    CounterColumn { kind: MetricKind::Errors, direction: Direction::Rx, read: |c| c.rx_errors, aggregate: true },
    CounterColumn { kind: MetricKind::Dropped, direction: Direction::Rx, read: |c| c.rx_dropped, aggregate: true },
    CounterColumn { kind: MetricKind::Packets, direction: Direction::Tx, read: |c| c.tx_packets, aggregate: false },
    CounterColumn { kind: MetricKind::Packets, direction: Direction::Rx, read: |c| c.rx_packets, aggregate: false },
];

/// Difference between two readings of a counter.
///
/// A smaller current value means the counter was reset or wrapped; that
/// interval is reported as zero.
pub fn counter_delta(previous: u64, current: u64) -> u64 {
    current.saturating_sub(previous)
}

/// Compute rates for `current` against the stored previous observation.
///
/// Returns `Ok(None)` when there is no previous observation yet. Interfaces
/// present on only one side are skipped.
pub fn compute(
    current: &Snapshot,
    previous: Option<&PreviousState>,
    now: Timestamp,
) -> Result<Option<RateRecord>> {
    let Some(previous) = previous else {
        return Ok(None);
    };

    if previous.time == 0 {
        return Err(ProbeError::MissingPreviousTime);
    }

    let elapsed = now - previous.time;
    if elapsed > MAX_ELAPSED_SECS {
        return Err(ProbeError::StaleState { elapsed });
    }
    if elapsed <= 0 {
        return Err(ProbeError::ClockSkew { elapsed });
    }
    let seconds = elapsed as f64;

    let mut record = RateRecord::new();
    let mut totals = [0u64; COUNTERS.len()];

    for (name, cur) in current.iter() {
        let Some(prev) = previous.snapshot.get(name) else {
            debug!("Skipping {}: not in previous snapshot", name);
            continue;
        };

        for (column, total) in COUNTERS.iter().zip(totals.iter_mut()) {
            let delta = counter_delta((column.read)(prev), (column.read)(cur));
            record.insert(metric_name(column.kind, name, column.direction), delta as f64 / seconds);
            if column.aggregate {
                *total = total.saturating_add(delta);
            }
        }
    }

    for (column, total) in COUNTERS.iter().zip(totals) {
        if column.aggregate {
            record.insert(
                metric_name(column.kind, AGGREGATE_INTERFACE, column.direction),
                total as f64 / seconds,
            );
        }
    }

    debug!("Computed {} rates over {}s", record.len(), elapsed);
    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counters(tx_packets: u64, rx_packets: u64, tx_errors: u64) -> CounterSet {
        CounterSet {
            tx_packets,
            rx_packets,
            tx_errors,
            ..Default::default()
        }
    }

    fn snapshot(entries: &[(&str, CounterSet)]) -> Snapshot {
        entries.iter().map(|(n, c)| (n.to_string(), *c)).collect()
    }

    fn previous(time: Timestamp, entries: &[(&str, CounterSet)]) -> PreviousState {
        PreviousState {
            time,
            snapshot: snapshot(entries),
        }
    }

    #[test]
    fn test_counter_delta() {
        assert_eq!(counter_delta(100, 160), 60);
        assert_eq!(counter_delta(7, 7), 0);
        assert_eq!(counter_delta(50, 5), 0);
        assert_eq!(counter_delta(0, u64::MAX), u64::MAX);
        assert_eq!(counter_delta(u64::MAX, 0), 0);
    }

    #[test]
    fn test_first_run_has_no_rates() {
        let current = snapshot(&[("eth0", counters(1, 1, 1))]);
        assert_eq!(compute(&current, None, 1000).unwrap(), None);
    }

    #[test]
    fn test_packet_rates() {
        let prev = previous(1000, &[("eth0", counters(100, 200, 0))]);
        let current = snapshot(&[("eth0", counters(160, 260, 0))]);

        let rates = compute(&current, Some(&prev), 1010).unwrap().unwrap();
        assert_eq!(rates.get("linux-netdev.pps.eth0.tx"), Some(6.0));
        assert_eq!(rates.get("linux-netdev.pps.eth0.rx"), Some(6.0));
    }

    #[test]
    fn test_reset_counter_is_zero() {
        let prev = previous(1000, &[("eth0", counters(0, 0, 50))]);
        let current = snapshot(&[("eth0", counters(0, 0, 5))]);

        let rates = compute(&current, Some(&prev), 1010).unwrap().unwrap();
        assert_eq!(rates.get("linux-netdev.errors.eth0.tx"), Some(0.0));
        assert_eq!(rates.get("linux-netdev.errors.all.tx"), Some(0.0));
    }

    #[test]
    fn test_metric_set_per_interface() {
        let prev = previous(1000, &[("eth0", CounterSet::default())]);
        let current = snapshot(&[("eth0", CounterSet::default())]);

        let rates = compute(&current, Some(&prev), 1001).unwrap().unwrap();
        let names: Vec<&str> = rates.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "linux-netdev.dropped.all.rx",
                "linux-netdev.dropped.all.tx",
                "linux-netdev.dropped.eth0.rx",
                "linux-netdev.dropped.eth0.tx",
                "linux-netdev.errors.all.rx",
                "linux-netdev.errors.all.tx",
                "linux-netdev.errors.eth0.rx",
                "linux-netdev.errors.eth0.tx",
                "linux-netdev.pps.eth0.rx",
                "linux-netdev.pps.eth0.tx",
            ]
        );
    }

    #[test]
    fn test_aggregates_sum_before_dividing() {
        let eth0 = CounterSet { tx_dropped: 10, rx_errors: 3, ..Default::default() };
        let eth1 = CounterSet { tx_dropped: 20, rx_errors: 1, ..Default::default() };
        let prev = previous(1000, &[("eth0", CounterSet::default()), ("eth1", CounterSet::default())]);
        let current = snapshot(&[("eth0", eth0), ("eth1", eth1)]);

        let rates = compute(&current, Some(&prev), 1004).unwrap().unwrap();
        assert_eq!(rates.get("linux-netdev.dropped.all.tx"), Some(7.5));
        assert_eq!(rates.get("linux-netdev.errors.all.rx"), Some(1.0));
        assert_eq!(rates.get("linux-netdev.dropped.eth1.tx"), Some(5.0));
        // Packet counters have no totals
        assert_eq!(rates.get("linux-netdev.pps.all.tx"), None);
    }

    #[test]
    fn test_interfaces_on_one_side_are_skipped() {
        let prev = previous(1000, &[("eth0", counters(0, 0, 0)), ("eth9", counters(0, 0, 0))]);
        let current = snapshot(&[("eth0", counters(10, 10, 0)), ("eth1", counters(10, 10, 10))]);

        let rates = compute(&current, Some(&prev), 1010).unwrap().unwrap();
        assert_eq!(rates.get("linux-netdev.pps.eth0.tx"), Some(1.0));
        assert!(rates.iter().all(|(n, _)| !n.contains(".eth1.") && !n.contains(".eth9.")));
        assert_eq!(rates.get("linux-netdev.errors.all.tx"), Some(0.0));
    }

    #[test]
    fn test_no_common_interfaces_still_reports_totals() {
        let prev = previous(1000, &[("eth0", CounterSet::default())]);
        let current = snapshot(&[("eth1", CounterSet::default())]);

        let rates = compute(&current, Some(&prev), 1010).unwrap().unwrap();
        assert_eq!(rates.len(), 4);
    }

    #[test]
    fn test_missing_previous_time() {
        let prev = previous(0, &[("eth0", CounterSet::default())]);
        let current = snapshot(&[("eth0", CounterSet::default())]);

        assert!(matches!(
            compute(&current, Some(&prev), 1010),
            Err(ProbeError::MissingPreviousTime)
        ));
    }

    #[test]
    fn test_stale_state() {
        let prev = previous(1000, &[("eth0", counters(0, 0, 0))]);
        let current = snapshot(&[("eth0", counters(10, 10, 10))]);

        assert!(compute(&current, Some(&prev), 1600).is_ok());
        assert!(matches!(
            compute(&current, Some(&prev), 1601),
            Err(ProbeError::StaleState { elapsed: 601 })
        ));
    }

    #[test]
    fn test_clock_skew() {
        let prev = previous(1000, &[("eth0", CounterSet::default())]);
        let current = snapshot(&[("eth0", CounterSet::default())]);

        assert!(matches!(
            compute(&current, Some(&prev), 1000),
            Err(ProbeError::ClockSkew { elapsed: 0 })
        ));
        assert!(matches!(
            compute(&current, Some(&prev), 990),
            Err(ProbeError::ClockSkew { elapsed: -10 })
        ));
    }

    #[test]
    fn test_rates_never_negative() {
        let high = CounterSet {
            tx_packets: 900,
            rx_packets: 900,
            tx_errors: 900,
            rx_errors: 900,
            tx_dropped: 900,
            rx_dropped: 900,
        };
        let prev = previous(1000, &[("eth0", high)]);
        let current = snapshot(&[("eth0", CounterSet { rx_packets: 1000, ..Default::default() })]);

        let rates = compute(&current, Some(&prev), 1010).unwrap().unwrap();
        assert!(rates.iter().all(|(_, v)| v >= 0.0));
        assert_eq!(rates.get("linux-netdev.pps.eth0.rx"), Some(10.0));
    }
}
