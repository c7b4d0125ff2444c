//! Core framework installers (spec.md §4.13). These recognize the game's
//! own mod-loading frameworks shipped as redistributables — not ordinary
//! mods — and must sit at the front of the pipeline so a framework's own
//! installer archive is never misread as a CET/Redscript/Red4Ext mod.

use crate::context::InstallContext;
use crate::error::InstallResult;
use crate::file_tree::FileTree;
use crate::instructions::{CoreFramework, Instruction, Instructions, LayoutKind};
use crate::layout::BIN_X64_PREFIX;
use crate::path_match::basename_eq;

struct FrameworkSignature {
    framework: CoreFramework,
    /// Directory the signature file must live directly in.
    prefix: &'static str,
    /// Any one of these basenames, present directly in `prefix`, identifies
    /// the framework's own redistributable.
    basenames: &'static [&'static str],
}

const FRAMEWORKS: &[FrameworkSignature] = &[
    FrameworkSignature { framework: CoreFramework::Cet, prefix: BIN_X64_PREFIX, basenames: &["version.dll"] },
    FrameworkSignature { framework: CoreFramework::Red4Ext, prefix: BIN_X64_PREFIX, basenames: &["winmm.dll"] },
    FrameworkSignature { framework: CoreFramework::Redscript, prefix: "engine\\tools", basenames: &["scc.exe"] },
    FrameworkSignature {
        framework: CoreFramework::TweakXl,
        prefix: "red4ext\\plugins\\TweakXL",
        basenames: &["TweakXL.dll"],
    },
    FrameworkSignature {
        framework: CoreFramework::CsvMerge,
        prefix: "red4ext\\plugins\\CSVMerge",
        basenames: &["CSVMerge.dll"],
    },
    FrameworkSignature { framework: CoreFramework::WolvenKitCli, prefix: "", basenames: &["WolvenKit.CLI.exe"] },
];

fn matching_signature(tree: &FileTree) -> Option<&'static FrameworkSignature> {
    FRAMEWORKS
        .iter()
        .find(|sig| tree.dir_with_some_in(sig.prefix, |p| sig.basenames.iter().any(|b| basename_eq(p, b))))
}

pub fn detect(tree: &FileTree) -> bool {
    matching_signature(tree).is_some()
}

pub fn layout(tree: &FileTree, _ctx: &InstallContext) -> InstallResult<Instructions> {
    let Some(sig) = matching_signature(tree) else {
        return Ok(Instructions::no_match());
    };

    let instructions = tree.source_paths().into_iter().map(|p| Instruction::copy(p.clone(), p)).collect();
    Ok(Instructions::new(LayoutKind::Core(sig.framework), instructions))
}
