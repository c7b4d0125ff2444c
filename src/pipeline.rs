//! The installer pipeline (spec.md §4.15): an ordered, process-static
//! registry of installers. `test_supported` returns the first installer
//! whose detector claims the tree; `install` reruns that same installer's
//! `layout`. The pipeline itself never retries or combines installers —
//! only MultiType does that, and it sits in the registry like any other
//! entry.

use serde::Serialize;

use crate::context::InstallContext;
use crate::detectors::{archive, cet, core, fallback, ini, json, multitype, red4ext, redscript, tweakxl};
use crate::error::InstallResult;
use crate::file_tree::FileTree;
use crate::instructions::Instructions;
use crate::redmod;

/// The only game this pipeline is built for (spec.md §6's `testSupported`
/// contract).
pub const CYBERPUNK_2077: &str = "cyberpunk2077";

const PRIORITY_START: i32 = 30;

type Detect = fn(&FileTree) -> bool;
type Layout = fn(&FileTree, &InstallContext) -> InstallResult<Instructions>;

/// One entry in the pipeline's static registry (spec.md §3's
/// `InstallerDescriptor`, in the teacher's descriptor-table style —
/// `CATEGORY_RULES` in `auto_categorize.rs` — rather than trait objects).
struct InstallerDescriptor {
    id: &'static str,
    priority: i32,
    detect: Detect,
    layout: Layout,
}

fn registry() -> Vec<InstallerDescriptor> {
    let entries: &[(&str, Detect, Layout)] = &[
        ("core", core::detect, core::layout),
        ("redmod", redmod::detect, redmod::layout),
        ("multitype", multitype::detect, multitype::layout),
        ("red4ext", red4ext::detect, red4ext::layout),
        ("redscript", redscript::detect, redscript::layout),
        ("cet", cet::detect, cet::layout),
        ("tweakxl", tweakxl::detect, tweakxl::layout),
        ("ini", ini::detect, ini::layout),
        ("archive", archive::detect, archive::layout),
        ("json", json::detect, json::layout),
        ("fallback", fallback::detect, fallback::layout),
    ];

    entries
        .iter()
        .enumerate()
        .map(|(i, (id, detect, layout))| InstallerDescriptor { id, priority: PRIORITY_START + i as i32, detect: *detect, layout: *layout })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct TestSupportedResult {
    pub supported: bool,
    #[serde(rename = "requiredFiles")]
    pub required_files: Vec<String>,
}

/// Runs the registry in priority order, returning the id and layout
/// function of the first installer whose detector matches.
fn active_installer(tree: &FileTree) -> Option<(&'static str, Layout)> {
    registry().into_iter().find(|d| (d.detect)(tree)).map(|d| (d.id, d.layout))
}

/// spec.md §6 `testSupported(files, gameId)`. `required_files` is always
/// empty — nothing in this domain needs the host to stage extra files
/// before `install` can run.
pub fn test_supported(files: &[String], game_id: &str) -> TestSupportedResult {
    let tree = FileTree::from_paths(files);
    let supported = game_id == CYBERPUNK_2077 && active_installer(&tree).is_some();
    TestSupportedResult { supported, required_files: Vec::new() }
}

/// spec.md §6 `install(files, destinationPath)`, generalized to take the
/// full `InstallContext` the host would otherwise thread through
/// `destinationPath`/`modInfo`/`features` separately.
pub fn install(files: &[String], ctx: &InstallContext) -> InstallResult<Instructions> {
    let tree = FileTree::from_paths(files);
    match active_installer(&tree) {
        Some((id, layout_fn)) => {
            ctx.host.log(crate::host::LogLevel::Debug, &format!("pipeline: installer \"{id}\" claimed the archive"));
            layout_fn(&tree, ctx)
        }
        None => Ok(Instructions::invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Features, InstallingDir, ModInfo, ModVersion};
    use crate::host::RecordingHost;
    use crate::instructions::{Instruction, LayoutKind};

    fn ctx<'a>(host: &'a RecordingHost, mod_info: &'a ModInfo, features: &'a Features, staging: &'a std::path::Path) -> InstallContext<'a> {
        InstallContext { host, staging_dir: staging, mod_info, features }
    }

    fn mod_info() -> ModInfo {
        ModInfo { name: "MyMod".into(), version: ModVersion { v: "1.0".into() }, installing_dir: InstallingDir { path_on_disk: "x".into() } }
    }

    #[test]
    fn wrong_game_id_is_not_supported() {
        let files = vec!["r6\\scripts\\Foo.reds".to_string()];
        let result = test_supported(&files, "skyrimspecialedition");
        assert!(!result.supported);
    }

    #[test]
    fn fallback_guarantees_every_cyberpunk_archive_is_supported() {
        let files = vec!["some\\unrecognized\\file.bin".to_string()];
        let result = test_supported(&files, CYBERPUNK_2077);
        assert!(result.supported);
    }

    #[test]
    fn redscript_basedir_is_installed_end_to_end() {
        let files = vec!["r6\\scripts\\Foo.reds".to_string()];
        assert!(test_supported(&files, CYBERPUNK_2077).supported);

        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("C:\\staging\\MyMod.installing");
        let result = install(&files, &ctx(&host, &info, &features, staging)).unwrap();
        assert_eq!(result.kind, LayoutKind::Redscript(crate::instructions::RedscriptLayout::Basedir));
        assert!(result.instructions.contains(&Instruction::copy("r6\\scripts\\Foo.reds", "r6\\scripts\\MyMod\\Foo.reds")));
    }

    #[test]
    fn core_framework_wins_over_redscript_like_shape() {
        // bin\x64\version.dll alone matches only the Core/CET signature.
        let files = vec!["bin\\x64\\version.dll".to_string()];
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("x");
        let result = install(&files, &ctx(&host, &info, &features, staging)).unwrap();
        assert_eq!(result.kind, LayoutKind::Core(crate::instructions::CoreFramework::Cet));
    }

    #[test]
    fn unrecognized_files_fall_through_to_fallback() {
        let files = vec!["some\\unrecognized\\file.bin".to_string()];
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("x");
        let result = install(&files, &ctx(&host, &info, &features, staging)).unwrap();
        assert_eq!(result.kind, LayoutKind::Fallback);
    }
}
