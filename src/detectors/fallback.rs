//! Always-supported catch-all (spec.md §4.14). Must be last in the pipeline
//! order — every other detector gets first refusal.

use crate::context::InstallContext;
use crate::error::InstallResult;
use crate::file_tree::FileTree;
use crate::host::DialogSeverity;
use crate::instructions::{Instruction, Instructions, LayoutKind};

pub fn detect(_tree: &FileTree) -> bool {
    true
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    ctx.host.show_dialog(
        DialogSeverity::Warning,
        "Archive structure not recognized",
        "This archive did not match any known mod layout. Its files will be installed exactly as packaged.",
        &["Ok"],
    );

    let instructions = tree.source_paths().into_iter().map(|p| Instruction::copy(p.clone(), p)).collect();
    Ok(Instructions::new(LayoutKind::Fallback, instructions))
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
    fn always_supported() {
        assert!(detect(&FileTree::from_paths(Vec::<String>::new())));
    }

    #[test]
    fn installs_every_file_verbatim_and_warns() {
        let tree = FileTree::from_paths(["weird\\layout\\thing.bin"]);
        let host = RecordingHost::new();
        let mod_info =
            ModInfo { name: "X".into(), version: ModVersion { v: "1".into() }, installing_dir: InstallingDir { path_on_disk: "x".into() } };
        let features = Features::default();
        let result = layout(&tree, &ctx(&host, &mod_info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::Fallback);
        assert_eq!(result.instructions, vec![Instruction::copy("weird\\layout\\thing.bin", "weird\\layout\\thing.bin")]);
        assert_eq!(host.dialogs.borrow().len(), 1);
    }
}
