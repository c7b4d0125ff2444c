//! TweakXL detector: Canon and Basedir layouts, synthesized analogously to
//! Redscript's (spec.md §3 names `TweakXL.{Canon, Basedir}`; §4.5's
//! synthesis rule is the explicitly cited template for this detector).
//! TweakXL tweak definitions (`.yaml`/`.yml`) live under
//! `r6\tweaks\<modName>\` on disk; loose files directly under `r6\tweaks\`
//! are relocated the same way loose Redscript files are.

use super::{offer_fallback_or_abort, synthesized_mod_name};
use crate::context::InstallContext;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::instructions::{Instruction, Instructions, LayoutKind, TweakXlLayout};
use crate::layout::TWEAK_EXTS;
use crate::path_match::{self, ext_in};

const TWEAKXL_PREFIX: &str = "r6\\tweaks";

fn canon_dirs(tree: &FileTree) -> Vec<String> {
    tree.subdirs_in(TWEAKXL_PREFIX).into_iter().filter(|d| tree.dir_with_some_under(d, |p| ext_in(p, TWEAK_EXTS))).collect()
}

fn basedir_files(tree: &FileTree) -> Vec<String> {
    tree.files_in(TWEAKXL_PREFIX, |p| ext_in(p, TWEAK_EXTS))
}

pub fn detect(tree: &FileTree) -> bool {
    !canon_dirs(tree).is_empty() || !basedir_files(tree).is_empty()
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    let canon = canon_dirs(tree);
    let basedir = basedir_files(tree);
    let present = [!canon.is_empty(), !basedir.is_empty()];
    let count = present.iter().filter(|p| **p).count();

    if count == 0 {
        return Ok(Instructions::no_match());
    }

    if count > 1 {
        if offer_fallback_or_abort(
            ctx,
            "Multiple TweakXL layouts detected",
            "This archive matches more than one TweakXL layout. Install using the Fallback installer instead, or cancel?",
        ) {
            return super::fallback::layout(tree, ctx);
        }
        return Err(InstallError::Conflict("multiple mutually-exclusive TweakXL layouts present".into()));
    }

    let (kind, instructions) = if !canon.is_empty() {
        (
            TweakXlLayout::Canon,
            tree.files_under(TWEAKXL_PREFIX, |_| true).into_iter().map(|p| Instruction::copy(p.clone(), p)).collect(),
        )
    } else {
        let name = synthesized_mod_name(ctx);
        let dest_dir = path_match::join(TWEAKXL_PREFIX, &name);
        (
            TweakXlLayout::Basedir,
            basedir
                .iter()
                .filter_map(|f| path_match::strip_prefix(TWEAKXL_PREFIX, f).map(|rel| Instruction::copy(f.clone(), path_match::join(&dest_dir, rel))))
                .collect(),
        )
    };

    Ok(Instructions::new(LayoutKind::TweakXl(kind), instructions))
}
