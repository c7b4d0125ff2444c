//! Cyber Engine Tweaks detector (spec.md §4.4). Mixed CET+Redscript
//! archives are caught upstream by MultiType (which runs before this
//! detector in the pipeline), so this module only ever sees pure CET
//! archives once it gets a turn.

use crate::context::InstallContext;
use crate::error::InstallResult;
use crate::file_tree::FileTree;
use crate::instructions::{Instruction, Instructions, LayoutKind};
use crate::layout::{ARCHIVE_MOD_PREFIX, CET_INIT_FILE, CET_MODS_PREFIX};
use crate::path_match::basename_eq;

pub fn detect(tree: &FileTree) -> bool {
    !tree.find_direct_subdirs_with_some(CET_MODS_PREFIX, |p| basename_eq(p, CET_INIT_FILE)).is_empty()
}

pub fn layout(tree: &FileTree, _ctx: &InstallContext) -> InstallResult<Instructions> {
    if !detect(tree) {
        return Ok(Instructions::no_match());
    }

    let mut instructions: Vec<Instruction> =
        tree.files_under(CET_MODS_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)).collect();
    instructions.extend(tree.files_under(ARCHIVE_MOD_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)));

    Ok(Instructions::new(LayoutKind::Cet, instructions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Features, InstallingDir, ModInfo, ModVersion};
    use crate::host::RecordingHost;

    fn ctx<'a>(host: &'a RecordingHost, mod_info: &'a ModInfo, features: &'a Features) -> InstallContext<'a> {
        InstallContext { host, staging_dir: std::path::Path::new("staging"), mod_info, features }
    }

    #[test]
    fn canonical_cet_mod() {
        let tree = FileTree::from_paths([
            "bin\\x64\\plugins\\cyber_engine_tweaks\\mods\\MyMod\\init.lua",
            "bin\\x64\\plugins\\cyber_engine_tweaks\\mods\\MyMod\\data.lua",
        ]);
        assert!(detect(&tree));
        let host = RecordingHost::new();
        let mod_info =
            ModInfo { name: "X".into(), version: ModVersion { v: "1".into() }, installing_dir: InstallingDir { path_on_disk: "x".into() } };
        let features = Features::default();
        let result = layout(&tree, &ctx(&host, &mod_info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::Cet);
        assert_eq!(result.instructions.len(), 2);
        assert!(result.instructions.iter().all(|i| i.destination() == match i {
            Instruction::Copy { source, .. } => source.as_str(),
            _ => unreachable!(),
        }));
    }

    #[test]
    fn no_init_lua_is_no_match() {
        let tree = FileTree::from_paths(["bin\\x64\\plugins\\cyber_engine_tweaks\\mods\\MyMod\\data.lua"]);
        assert!(!detect(&tree));
    }
}
