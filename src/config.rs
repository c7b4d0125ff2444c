//! Process-local configuration (spec.md §9 ambient stack): the one piece of
//! host-supplied policy the spec defines (`Features.redmod_autoconvert_archives`)
//! plus logging verbosity and an optional staging-directory override for the
//! CLI harness. Shaped like the teacher's `config/paths.rs` +
//! `config/mod.rs`, scoped down to this crate's single config domain.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{AutoconvertPolicy, Features};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to write config at {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config at {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("no valid config directory for this platform")]
    NoProjectDirs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogVerbosity {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogVerbosity {
    fn default() -> Self {
        LogVerbosity::Info
    }
}

impl LogVerbosity {
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogVerbosity::Debug => "debug",
            LogVerbosity::Info => "info",
            LogVerbosity::Warn => "warn",
            LogVerbosity::Error => "error",
        }
    }
}

/// On-disk config, mirroring the teacher's nested `DeploymentConfig`/
/// `TuiConfig` shape but scoped to this crate's one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeaturesConfig,
    #[serde(default)]
    pub log_verbosity: LogVerbosity,
    #[serde(default)]
    pub staging_dir_override: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default)]
    pub redmod_autoconvert_archives: bool,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self { redmod_autoconvert_archives: false }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { features: FeaturesConfig::default(), log_verbosity: LogVerbosity::default(), staging_dir_override: None }
    }
}

impl AppConfig {
    pub fn to_features(&self) -> Features {
        Features {
            redmod_autoconvert_archives: if self.features.redmod_autoconvert_archives {
                AutoconvertPolicy::Enabled
            } else {
                AutoconvertPolicy::Disabled
            },
        }
    }

    /// Load config from the platform config directory, falling back to
    /// defaults if no file exists yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read { path: path.clone(), source })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write { path: path.clone(), source })?;
        }
        let raw = toml::to_string_pretty(self)?;
        fs::write(&path, raw).map_err(|source| ConfigError::Write { path, source })
    }
}

fn project_dirs() -> Result<ProjectDirs, ConfigError> {
    ProjectDirs::from("rs", "redmodsanity", "redmodsanity").ok_or(ConfigError::NoProjectDirs)
}

fn config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Resolve the staging directory actually used for an install call: the
/// config override if present, otherwise the host-supplied `ModInfo`'s own
/// staging path.
pub fn resolve_staging_dir<'a>(config: &'a AppConfig, host_supplied: &'a Path) -> &'a Path {
    config.staging_dir_override.as_deref().unwrap_or(host_supplied)
}
