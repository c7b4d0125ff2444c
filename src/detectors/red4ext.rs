//! Red4Ext detector (spec.md §4.6): Canon, Basedir, Modnamed, and Toplevel
//! layouts, plus the hard reject for forbidden/engine-reserved DLLs. Per
//! spec.md §8 scenario 5, the forbidden-DLL condition must make `detect`
//! itself report `false` (not a claimed-then-rejected install) so the
//! pipeline can fall through to a later installer instead of getting stuck.

use super::{offer_fallback_or_abort, synthesized_mod_name};
use crate::context::InstallContext;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::instructions::{Instruction, Instructions, LayoutKind, Red4ExtLayout};
use crate::layout::{BIN_X64_PREFIX, DLL_EXT, RED4EXT_FORBIDDEN_DLLS, RED4EXT_PREFIX};
use crate::path_match::{self, basename_eq, ext_eq, prefix_of};

fn has_forbidden_dll(tree: &FileTree) -> bool {
    tree.files_under("", |p| ext_eq(p, DLL_EXT))
        .iter()
        .any(|p| RED4EXT_FORBIDDEN_DLLS.iter().any(|forbidden| basename_eq(p, forbidden)) || prefix_of(BIN_X64_PREFIX, p))
}

fn canon_dirs(tree: &FileTree) -> Vec<String> {
    tree.subdirs_in(RED4EXT_PREFIX).into_iter().filter(|d| tree.dir_with_some_under(d, |p| ext_eq(p, DLL_EXT))).collect()
}

fn basedir_files(tree: &FileTree) -> Vec<String> {
    tree.files_in(RED4EXT_PREFIX, |p| ext_eq(p, DLL_EXT))
}

fn modnamed_dirs(tree: &FileTree) -> Vec<String> {
    tree.find_direct_subdirs_with_some("", |p| ext_eq(p, DLL_EXT))
        .into_iter()
        .filter(|d| !prefix_of(RED4EXT_PREFIX, d) && !d.eq_ignore_ascii_case(RED4EXT_PREFIX))
        .collect()
}

fn toplevel_files(tree: &FileTree) -> Vec<String> {
    tree.files_in("", |p| ext_eq(p, DLL_EXT))
}

pub fn detect(tree: &FileTree) -> bool {
    if has_forbidden_dll(tree) {
        return false;
    }
    !canon_dirs(tree).is_empty() || !basedir_files(tree).is_empty() || !modnamed_dirs(tree).is_empty() || !toplevel_files(tree).is_empty()
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    if has_forbidden_dll(tree) {
        return Ok(Instructions::no_match());
    }

    let canon = canon_dirs(tree);
    let basedir = basedir_files(tree);
    let modnamed = modnamed_dirs(tree);
    let toplevel = toplevel_files(tree);
    let present = [!canon.is_empty(), !basedir.is_empty(), !modnamed.is_empty(), !toplevel.is_empty()];
    let count = present.iter().filter(|p| **p).count();

    if count == 0 {
        return Ok(Instructions::no_match());
    }

    if count > 1 {
        if offer_fallback_or_abort(
            ctx,
            "Multiple Red4Ext layouts detected",
            "This archive matches more than one Red4Ext layout. Install using the Fallback installer instead, or cancel?",
        ) {
            return super::fallback::layout(tree, ctx);
        }
        return Err(InstallError::Conflict("multiple mutually-exclusive Red4Ext layouts present".into()));
    }

    let (kind, instructions) = if !canon.is_empty() {
        (
            Red4ExtLayout::Canon,
            tree.files_under(RED4EXT_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)).collect(),
        )
    } else if !basedir.is_empty() {
        let name = synthesized_mod_name(ctx);
        let dest_dir = path_match::join(RED4EXT_PREFIX, &name);
        (
            Red4ExtLayout::Basedir,
            basedir
                .iter()
                .filter_map(|f| path_match::strip_prefix(RED4EXT_PREFIX, f).map(|rel| Instruction::copy(f.clone(), path_match::join(&dest_dir, rel))))
                .collect(),
        )
    } else if let Some(dir) = modnamed.first() {
        let name = path_match::basename(dir).to_string();
        let dest_dir = path_match::join(RED4EXT_PREFIX, &name);
        (
            Red4ExtLayout::Modnamed,
            tree.files_under(dir, |_| true)
                .into_iter()
                .filter_map(|f| path_match::strip_prefix(dir, &f).map(|rel| Instruction::copy(f.clone(), path_match::join(&dest_dir, rel))))
                .collect(),
        )
    } else {
        let name = synthesized_mod_name(ctx);
        let dest_dir = path_match::join(RED4EXT_PREFIX, &name);
        (
            Red4ExtLayout::Toplevel,
            toplevel.iter().map(|f| Instruction::copy(f.clone(), path_match::join(&dest_dir, f))).collect(),
        )
    };

    Ok(Instructions::new(LayoutKind::Red4Ext(kind), instructions))
}
