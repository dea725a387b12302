/*============================================================
  Synavera Project: Syn-Meta
  Module: synmeta_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration for syn-meta: where metadata
    documents come from and where snapshots and logs go.

  Security / Safety Notes:
    Reads a single TOML file from an operator-controlled path;
    no credentials are stored in configuration.

  Dependencies:
    serde + toml for parsing, dirs for XDG locations.

  Operational Scope:
    Consumed by the binary entry point before any fetch.

  Revision History:
    2025-11-12 COD  Authored configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Missing file means defaults, malformed file means error
    - Every knob has a documented default
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MetaError, Result};

const APP_DIR: &str = "syn-meta";
pub const DEFAULT_BASE_URL: &str = "https://meta.prismlauncher.org/v1";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetaConfig {
    pub source: SourceConfig,
    pub paths: PathsConfig,
}

/// Where metadata documents are fetched from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub base_url: String,
    /// Local mirror; takes precedence over `base_url`.
    pub directory: Option<PathBuf>,
    /// Request timeout in seconds.
    pub timeout: u64,
    pub max_retries: usize,
    pub max_parallel_requests: usize,
    /// Download throttle; 0 disables throttling.
    pub max_kib_per_sec: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            directory: None,
            timeout: 30,
            max_retries: 3,
            max_parallel_requests: 4,
            max_kib_per_sec: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub snapshot_dir: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
}

impl MetaConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match default_config_path() {
                Some(default) if default.exists() => Self::load(&default),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            MetaError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml(&raw)
            .map_err(|err| MetaError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.paths
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("snapshot"))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.paths
            .log_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("logs"))
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}
