//! Redscript detector (spec.md §4.5): Canon (already under a named
//! subdirectory), Basedir (loose under `r6\scripts\`), and Toplevel (loose
//! at archive root) layouts, with the exactly-one disambiguation rule.

use super::{offer_fallback_or_abort, synthesized_mod_name};
use crate::context::InstallContext;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::instructions::{Instruction, Instructions, LayoutKind, RedscriptLayout};
use crate::layout::{ARCHIVE_MOD_PREFIX, REDSCRIPT_PREFIX, REDS_EXT};
use crate::path_match::{self, ext_eq};

fn canon_dirs(tree: &FileTree) -> Vec<String> {
    tree.subdirs_in(REDSCRIPT_PREFIX).into_iter().filter(|d| tree.dir_with_some_under(d, |p| ext_eq(p, REDS_EXT))).collect()
}

fn basedir_files(tree: &FileTree) -> Vec<String> {
    tree.files_in(REDSCRIPT_PREFIX, |p| ext_eq(p, REDS_EXT))
}

fn toplevel_files(tree: &FileTree) -> Vec<String> {
    tree.files_in("", |p| ext_eq(p, REDS_EXT))
}

pub fn detect(tree: &FileTree) -> bool {
    !canon_dirs(tree).is_empty() || !basedir_files(tree).is_empty() || !toplevel_files(tree).is_empty()
}

fn with_archives(mut instructions: Vec<Instruction>, tree: &FileTree) -> Vec<Instruction> {
    instructions.extend(tree.files_under(ARCHIVE_MOD_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)));
    instructions
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    let canon = canon_dirs(tree);
    let basedir = basedir_files(tree);
    let toplevel = toplevel_files(tree);
    let present = [!canon.is_empty(), !basedir.is_empty(), !toplevel.is_empty()];
    let count = present.iter().filter(|p| **p).count();

    if count == 0 {
        return Ok(Instructions::no_match());
    }

    if count > 1 {
        if offer_fallback_or_abort(
            ctx,
            "Multiple Redscript layouts detected",
            "This archive matches more than one Redscript layout. Install using the Fallback installer instead, or cancel?",
        ) {
            return super::fallback::layout(tree, ctx);
        }
        return Err(InstallError::Conflict("multiple mutually-exclusive Redscript layouts present".into()));
    }

    let (kind, instructions) = if !canon.is_empty() {
        (
            RedscriptLayout::Canon,
            tree.files_under(REDSCRIPT_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)).collect(),
        )
    } else if !basedir.is_empty() {
        let name = synthesized_mod_name(ctx);
        let dest_dir = path_match::join(REDSCRIPT_PREFIX, &name);
        (
            RedscriptLayout::Basedir,
            basedir
                .iter()
                .filter_map(|f| path_match::strip_prefix(REDSCRIPT_PREFIX, f).map(|rel| Instruction::copy(f.clone(), path_match::join(&dest_dir, rel))))
                .collect(),
        )
    } else {
        let name = synthesized_mod_name(ctx);
        let dest_dir = path_match::join(REDSCRIPT_PREFIX, &name);
        (
            RedscriptLayout::Toplevel,
            toplevel.iter().map(|f| Instruction::copy(f.clone(), path_match::join(&dest_dir, f))).collect(),
        )
    };

    Ok(Instructions::new(LayoutKind::Redscript(kind), with_archives(instructions, tree)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Features, InstallingDir, ModInfo, ModVersion};
    use crate::host::RecordingHost;

    fn ctx<'a>(host: &'a RecordingHost, mod_info: &'a ModInfo, features: &'a Features, staging: &'a std::path::Path) -> InstallContext<'a> {
        InstallContext { host, staging_dir: staging, mod_info, features }
    }

    fn mod_info() -> ModInfo {
        ModInfo { name: "MyMod".into(), version: ModVersion { v: "1.0".into() }, installing_dir: InstallingDir { path_on_disk: "x".into() } }
    }

    #[test]
    fn basedir_with_archive_relocates_and_copies_archive() {
        let tree = FileTree::from_paths(["r6\\scripts\\Foo.reds", "archive\\pc\\mod\\Foo.archive"]);
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("C:\\staging\\MyMod.installing");
        let result = layout(&tree, &ctx(&host, &info, &features, staging)).unwrap();
        assert_eq!(result.kind, LayoutKind::Redscript(RedscriptLayout::Basedir));
        assert!(result.instructions.contains(&Instruction::copy("r6\\scripts\\Foo.reds", "r6\\scripts\\MyMod\\Foo.reds")));
        assert!(result
            .instructions
            .contains(&Instruction::copy("archive\\pc\\mod\\Foo.archive", "archive\\pc\\mod\\Foo.archive")));
    }

    #[test]
    fn canon_layout_preserves_existing_structure() {
        let tree = FileTree::from_paths(["r6\\scripts\\MyMod\\a.reds", "r6\\scripts\\MyMod\\sub\\b.reds"]);
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("x");
        let result = layout(&tree, &ctx(&host, &info, &features, staging)).unwrap();
        assert_eq!(result.kind, LayoutKind::Redscript(RedscriptLayout::Canon));
        assert_eq!(result.instructions.len(), 2);
    }

    #[test]
    fn conflicting_layouts_reject_by_default() {
        let tree = FileTree::from_paths(["r6\\scripts\\Loose.reds", "Toplevel.reds"]);
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("x");
        let err = layout(&tree, &ctx(&host, &info, &features, staging)).unwrap_err();
        assert!(matches!(err, InstallError::Conflict(_)));
    }

    #[test]
    fn conflicting_layouts_prompt_the_expected_dialog_and_honor_fallback() {
        use crate::host::{DialogSeverity, MockHostApi};
        use mockall::predicate::eq;

        let tree = FileTree::from_paths(["r6\\scripts\\Loose.reds", "Toplevel.reds"]);
        let mut host = MockHostApi::new();
        host.expect_show_dialog()
            .with(eq(DialogSeverity::Warning), eq("Multiple Redscript layouts detected"), mockall::predicate::always(), eq(["Fallback", "Abort"].as_slice()))
            .times(1)
            .returning(|_, _, _, _| "Fallback".to_string());
        // The Fallback installer itself always raises its own "not recognized" dialog.
        host.expect_show_dialog().returning(|_, _, _, _| "Ok".to_string());

        let (info, features) = (mod_info(), Features::default());
        let staging = std::path::Path::new("x");
        let ctx = InstallContext { host: &host, staging_dir: staging, mod_info: &info, features: &features };
        let result = layout(&tree, &ctx).unwrap();
        assert_eq!(result.kind, LayoutKind::Fallback);
    }
}
