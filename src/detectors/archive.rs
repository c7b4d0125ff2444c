//! Archive-only detector (spec.md §4.7): `Canon`, `Heritage`, and `Other`
//! layouts, the ArchiveXL `Xl` subflavor, and the REDmod autoconversion
//! hook (spec.md §4.11) triggered from here once a canonical, non-XL
//! archive mod has been classified.

use crate::context::InstallContext;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::host::Notification;
use crate::instructions::{ArchiveLayout, Instruction, Instructions, LayoutKind};
use crate::layout::{ARCHIVE_EXT, ARCHIVE_MOD_PREFIX, ARCHIVE_PATCH_PREFIX, XL_EXT};
use crate::path_match::{self, basename, ext_eq, ext_in};
use crate::{context::AutoconvertPolicy, redmod};

fn canon_layout(tree: &FileTree) -> Option<(ArchiveLayout, Vec<Instruction>)> {
    if !tree.dir_with_some_under(ARCHIVE_MOD_PREFIX, |p| ext_eq(p, ARCHIVE_EXT)) {
        return None;
    }
    let instructions = tree.files_under(ARCHIVE_MOD_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)).collect();
    Some((ArchiveLayout::Canon, instructions))
}

fn heritage_layout(tree: &FileTree) -> Option<(ArchiveLayout, Vec<Instruction>)> {
    if !tree.dir_with_some_under(ARCHIVE_PATCH_PREFIX, |p| ext_eq(p, ARCHIVE_EXT)) {
        return None;
    }
    let instructions = tree
        .files_under(ARCHIVE_PATCH_PREFIX, |_| true)
        .into_iter()
        .filter_map(|f| {
            let rel = path_match::strip_prefix(ARCHIVE_PATCH_PREFIX, &f)?;
            Some(Instruction::copy(f.clone(), path_match::join(ARCHIVE_MOD_PREFIX, rel)))
        })
        .collect();
    Some((ArchiveLayout::Heritage, instructions))
}

/// Any `.archive`/`.xl` file anywhere in the tree, flattened directly under
/// the canonical archive prefix by its own basename. Returns whether the
/// files were consolidated from more than one source directory, alongside
/// the layout — spec.md §4.7's "surface a warning but still install" case.
fn other_layout(tree: &FileTree) -> Option<(ArchiveLayout, Vec<Instruction>, bool)> {
    let files = tree.files_under("", |p| ext_in(p, &[ARCHIVE_EXT, XL_EXT]));
    if files.is_empty() {
        return None;
    }

    let source_dirs: std::collections::BTreeSet<&str> = files.iter().map(|f| path_match::dirname(f)).collect();
    let consolidated = source_dirs.len() > 1;

    let instructions =
        files.into_iter().map(|f| { let dest = path_match::join(ARCHIVE_MOD_PREFIX, basename(&f)); Instruction::copy(f, dest) }).collect();
    Some((ArchiveLayout::Other, instructions, consolidated))
}

fn has_xl_companion(tree: &FileTree) -> bool {
    tree.dir_with_some_under("", |p| ext_eq(p, XL_EXT))
}

pub fn detect(tree: &FileTree) -> bool {
    canon_layout(tree).is_some() || heritage_layout(tree).is_some() || other_layout(tree).is_some()
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    let chosen = canon_layout(tree)
        .map(|(k, i)| (k, i, false))
        .or_else(|| heritage_layout(tree).map(|(k, i)| (k, i, false)))
        .or_else(|| other_layout(tree));
    let Some((mut kind, instructions, consolidated)) = chosen else {
        return Ok(Instructions::no_match());
    };

    let archive_like_total = tree.files_under("", |p| ext_in(p, &[ARCHIVE_EXT, XL_EXT])).len();
    if instructions.len() < archive_like_total {
        return Err(InstallError::Structure(format!(
            "only {} of {archive_like_total} archive files could be placed under a canonical destination",
            instructions.len()
        )));
    }

    if kind == ArchiveLayout::Canon && has_xl_companion(tree) {
        kind = ArchiveLayout::Xl;
    }

    if consolidated {
        ctx.host.send_notification(Notification::warning(
            "Archive layout consolidated",
            "Archive files were relocated from more than one source directory into archive\\pc\\mod\\.",
        ));
    }

    match (kind, ctx.features.redmod_autoconvert_archives) {
        (ArchiveLayout::Canon, AutoconvertPolicy::Enabled) => {
            let base = Instructions::new(LayoutKind::Archive(ArchiveLayout::Canon), instructions);
            Ok(redmod::autoconvert(ctx.host, &base, &ctx.mod_info.name, &ctx.mod_info.version.v))
        }
        (ArchiveLayout::Xl, AutoconvertPolicy::Enabled) => {
            ctx.host.send_notification(Notification::info(
                "REDmod autoconversion skipped",
                "This mod ships an ArchiveXL companion file; autoconversion to REDmod is not supported for XL archives.",
            ));
            Ok(Instructions::new(LayoutKind::Archive(kind), instructions))
        }
        _ => Ok(Instructions::new(LayoutKind::Archive(kind), instructions)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Features, InstallingDir, ModInfo, ModVersion};
    use crate::host::RecordingHost;

    fn ctx<'a>(host: &'a RecordingHost, mod_info: &'a ModInfo, features: &'a Features) -> InstallContext<'a> {
        InstallContext { host, staging_dir: std::path::Path::new("staging"), mod_info, features }
    }

    fn mod_info() -> ModInfo {
        ModInfo { name: "X".into(), version: ModVersion { v: "1.0".into() }, installing_dir: InstallingDir { path_on_disk: "x".into() } }
    }

    #[test]
    fn other_layout_flattens_stray_archive() {
        let tree = FileTree::from_paths(["something\\Foo.archive", "readme.txt"]);
        let host = RecordingHost::new();
        let (info, features) = (mod_info(), Features::default());
        let result = layout(&tree, &ctx(&host, &info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::Archive(ArchiveLayout::Other));
        assert_eq!(result.instructions, vec![Instruction::copy("something\\Foo.archive", "archive\\pc\\mod\\Foo.archive")]);
    }

    #[test]
    fn autoconversion_rewrites_canonical_archive() {
        let tree = FileTree::from_paths(["archive\\pc\\mod\\X.archive"]);
        let host = RecordingHost::new();
        let info = mod_info();
        let features = Features { redmod_autoconvert_archives: AutoconvertPolicy::Enabled };
        let result = layout(&tree, &ctx(&host, &info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::RedModTransformedArchive);
        assert!(result.instructions.iter().any(|i| i.destination() == "mods\\X_autoconverted\\archives\\X.archive"));
    }

    #[test]
    fn xl_companion_skips_autoconversion() {
        let tree = FileTree::from_paths(["archive\\pc\\mod\\X.archive", "archive\\pc\\mod\\X.xl"]);
        let host = RecordingHost::new();
        let info = mod_info();
        let features = Features { redmod_autoconvert_archives: AutoconvertPolicy::Enabled };
        let result = layout(&tree, &ctx(&host, &info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::Archive(ArchiveLayout::Xl));
        assert_eq!(host.notifications.borrow().len(), 1);
    }
}
