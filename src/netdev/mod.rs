// Linux NetDev Probe - Network Device Counters
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Interface counter collection, persistence and rate computation.

mod filter;
pub mod models;
pub mod rates;
mod source;
mod store;

pub use filter::InterfaceFilter;
pub use models::{RateRecord, Timestamp};
pub use source::{ProcNetDev, SnapshotSource};
pub use store::StateStore;
