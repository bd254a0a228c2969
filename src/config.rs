// Linux NetDev Probe - Configuration
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Probe configuration from the command line and a local JSON settings file.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cli::Args;
use crate::error::{ProbeError, Result};
use crate::netdev::InterfaceFilter;

/// Settings read from disk. Command-line values take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeSettings {
    /// Regexp for interface names to ignore.
    #[serde(default)]
    pub ignore_interfaces: Option<String>,
}

impl ProbeSettings {
    /// Default settings file location.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linux-netdev-probe")
            .join("settings.json")
    }

    /// Load settings, falling back to defaults if the file is absent or unusable.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    debug!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings: {}", e);
                Self::default()
            }
        }
    }
}

/// Validated configuration, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct ProbeConfig {
    ignore_interfaces: Option<Regex>,
}

impl ProbeConfig {
    /// Merge arguments over settings and compile the exclusion pattern.
    pub fn from_sources(args: &Args, settings: &ProbeSettings) -> Result<Self> {
        let pattern = args
            .ignore_interfaces
            .as_deref()
            .or(settings.ignore_interfaces.as_deref())
            .filter(|p| !p.is_empty());

        let ignore_interfaces = pattern
            .map(|p| {
                Regex::new(p).map_err(|source| ProbeError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()?;

        Ok(Self { ignore_interfaces })
    }

    /// Load the settings file named in `args` (or the default one) and merge.
    pub fn load(args: &Args) -> Result<Self> {
        let path = args.settings.clone().unwrap_or_else(ProbeSettings::default_path);
        Self::from_sources(args, &ProbeSettings::load(&path))
    }

    pub fn ignore_interfaces(&self) -> Option<&Regex> {
        self.ignore_interfaces.as_ref()
    }

    /// Interface filter for this configuration.
    pub fn interface_filter(&self) -> InterfaceFilter {
        InterfaceFilter::new(self.ignore_interfaces.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pattern: Option<&str>) -> Args {
        Args {
            ignore_interfaces: pattern.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_pattern_is_fatal() {
        let err = ProbeConfig::from_sources(&args(Some("eth[")), &ProbeSettings::default()).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidPattern { ref pattern, .. } if pattern == "eth["));
    }

    #[test]
    fn test_cli_overrides_settings() {
        let settings = ProbeSettings {
            ignore_interfaces: Some("^veth".to_string()),
        };

        let config = ProbeConfig::from_sources(&args(Some("^docker")), &settings).unwrap();
        assert_eq!(config.ignore_interfaces().map(Regex::as_str), Some("^docker"));

        let config = ProbeConfig::from_sources(&args(None), &settings).unwrap();
        assert_eq!(config.ignore_interfaces().map(Regex::as_str), Some("^veth"));
    }

    #[test]
    fn test_empty_pattern_means_no_exclusion() {
        let config = ProbeConfig::from_sources(&args(Some("")), &ProbeSettings::default()).unwrap();
        assert!(config.ignore_interfaces().is_none());
    }

    #[test]
    fn test_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        assert_eq!(ProbeSettings::load(&path), ProbeSettings::default());

        fs::write(&path, r#"{"ignore_interfaces": "^br-"}"#).unwrap();
        assert_eq!(ProbeSettings::load(&path).ignore_interfaces.as_deref(), Some("^br-"));

        fs::write(&path, "garbage").unwrap();
        assert_eq!(ProbeSettings::load(&path), ProbeSettings::default());
    }

    #[test]
    fn test_load_uses_settings_path_from_args() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"ignore_interfaces": "^tun"}"#).unwrap();

        let args = Args {
            settings: Some(path),
            ..Default::default()
        };
        let config = ProbeConfig::load(&args).unwrap();
        assert!(!config.interface_filter().accepts("tun0"));
        assert!(config.interface_filter().accepts("eth0"));
    }
}
