//! Host-supplied call context (spec.md §3 `ModInfo`/`Features`), threaded
//! through every `install()` call alongside the `HostApi` handle.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::host::HostApi;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModVersion {
    pub v: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallingDir {
    pub path_on_disk: PathBuf,
}

/// Host-supplied metadata about the mod being installed (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModInfo {
    pub name: String,
    pub version: ModVersion,
    pub installing_dir: InstallingDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoconvertPolicy {
    Enabled,
    Disabled,
}

/// Host-supplied feature flags (spec.md §3). Only one flag is specified;
/// more can be added without touching any installer signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub redmod_autoconvert_archives: AutoconvertPolicy,
}

impl Default for Features {
    fn default() -> Self {
        Self { redmod_autoconvert_archives: AutoconvertPolicy::Disabled }
    }
}

/// Everything an installer's `install` function can consult beyond the
/// `FileTree` itself. Built fresh by the pipeline for each `install()` call.
pub struct InstallContext<'a> {
    pub host: &'a dyn HostApi,
    /// The host's on-disk staging directory — the only path in this struct
    /// that isn't an archive-relative path. Used solely to resolve
    /// `HostApi::read_file` calls (REDmod's `info.json`, the INI detector's
    /// first `.ini`).
    pub staging_dir: &'a Path,
    pub mod_info: &'a ModInfo,
    pub features: &'a Features,
}

impl<'a> InstallContext<'a> {
    /// Resolve an archive-relative path (backslash-separated) to an on-disk
    /// path under the staging directory.
    pub fn on_disk(&self, archive_relative: &str) -> PathBuf {
        self.staging_dir.join(archive_relative.replace('\\', std::path::MAIN_SEPARATOR_STR))
    }
}
