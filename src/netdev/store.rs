// Linux NetDev Probe - State Store
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Persistent storage for the previous counter snapshot.
//!
//! The probe is launched once per collection interval, so the last
//! observation lives in a small JSON file between runs:
//!
//! ```text
//! {"interfaces":{"eth0":{"tx_packets":160,"rx_packets":260,...}},"time":1010}
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::models::{CounterSet, Snapshot, Timestamp};
use crate::error::{ProbeError, Result};

/// Environment variable the monitoring agent uses to point plugins at a work directory.
pub const WORKDIR_ENV: &str = "MACKEREL_PLUGIN_WORKDIR";

const STATE_FILE_PREFIX: &str = "mackerel-plugin-linux-netdev";

/// On-disk form of one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedState {
    #[serde(default)]
    interfaces: BTreeMap<String, CounterSet>,
    /// Capture time in epoch seconds; zero means the record is incomplete.
    #[serde(default)]
    time: Timestamp,
}

/// Snapshot read back from the state file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousState {
    pub time: Timestamp,
    pub snapshot: Snapshot,
}

/// Single-slot store for the last snapshot.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store keyed to the invoking user inside the plugin work directory.
    pub fn for_current_user() -> Self {
        Self::at(default_state_path())
    }

    /// Store backed by an explicit file.
    pub fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the previous snapshot.
    ///
    /// Returns `Ok(None)` when no state file exists yet (first run).
    pub fn load(&self) -> Result<Option<PreviousState>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No previous state at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(self.read_error(e.to_string())),
        };

        let state: PersistedState =
            serde_json::from_slice(&content).map_err(|e| self.read_error(e.to_string()))?;

        Ok(Some(PreviousState {
            time: state.time,
            snapshot: Snapshot::from(state.interfaces),
        }))
    }

    /// Overwrite the stored record with `snapshot` captured at `time`.
    pub fn save(&self, snapshot: &Snapshot, time: Timestamp) -> Result<()> {
        #[cfg(unix)]
        use std::os::unix::fs::PermissionsExt;

        let state = PersistedState {
            interfaces: snapshot.clone().into_inner(),
            time,
        };
        let content = serde_json::to_vec(&state).map_err(|e| self.write_error(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.write_error(e.to_string()))?;
            }
        }

        let mut file = fs::File::create(&self.path).map_err(|e| self.write_error(e.to_string()))?;
        #[cfg(unix)]
        {
            if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
                warn!("Failed to set state file permissions: {}", e);
            }
        }
        file.write_all(&content)
            .and_then(|_| file.flush())
            .map_err(|e| self.write_error(e.to_string()))?;

        debug!("Saved {} interfaces to {}", snapshot.len(), self.path.display());
        Ok(())
    }

    fn read_error(&self, reason: String) -> ProbeError {
        ProbeError::StateRead {
            path: self.path.clone(),
            reason,
        }
    }

    fn write_error(&self, reason: String) -> ProbeError {
        ProbeError::StateWrite {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Directory plugins keep their state in.
fn plugin_work_dir() -> PathBuf {
    match env::var_os(WORKDIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => env::temp_dir(),
    }
}

/// Numeric uid of the invoking user, `0` if it cannot be determined.
fn current_uid() -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        // /proc/self is owned by the process's effective uid
        match fs::metadata("/proc/self") {
            Ok(meta) => return meta.uid().to_string(),
            Err(e) => warn!("Failed to determine current uid: {}", e),
        }
    }
    "0".to_string()
}

fn default_state_path() -> PathBuf {
    state_path_in(&plugin_work_dir(), &current_uid())
}

fn state_path_in(dir: &Path, uid: &str) -> PathBuf {
    dir.join(format!("{}-{}", STATE_FILE_PREFIX, uid))
}
