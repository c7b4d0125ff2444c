//! INI / Reshade detector (spec.md §4.8). Classification needs to read one
//! file's bytes off disk, so — unlike every other detector — `detect` and
//! `layout` are not equivalent up to I/O: `detect` only inspects tree shape;
//! the disk read happens solely inside `layout` (spec.md §9's "known source
//! quirk" fix — the original only did this correctly sometimes).

use regex_lite::Regex;

use crate::context::InstallContext;
use crate::error::InstallResult;
use crate::file_tree::FileTree;
use crate::instructions::{IniLayout, Instruction, Instructions, LayoutKind};
use crate::layout::{BIN_X64_PREFIX, CET_GLOBAL_INI, CET_INIT_FILE, INI_CONFIG_PREFIX, INI_EXT, REDS_EXT, RESHADE_SHADERS_DIR};
use crate::path_match::{self, basename, basename_eq, ext_eq, join};

fn has_blocking_markers(tree: &FileTree) -> bool {
    tree.dir_with_some_under("", |p| basename_eq(p, CET_INIT_FILE))
        || tree.dir_with_some_under("", |p| ext_eq(p, REDS_EXT))
        || tree.dir_with_some_in(BIN_X64_PREFIX, |p| basename_eq(p, CET_GLOBAL_INI))
}

fn ini_files(tree: &FileTree) -> Vec<String> {
    tree.files_under("", |p| ext_eq(p, INI_EXT))
}

pub fn detect(tree: &FileTree) -> bool {
    !has_blocking_markers(tree) && !ini_files(tree).is_empty()
}

fn looks_like_reshade(bytes: &[u8]) -> bool {
    let text = String::from_utf8_lossy(bytes);
    let re = Regex::new(r"^[\[#].+").expect("static regex is valid");
    text.lines().find(|l| !l.trim().is_empty()).is_some_and(|line| re.is_match(line))
}

pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    if !detect(tree) {
        return Ok(Instructions::no_match());
    }

    let files = ini_files(tree);
    let first = &files[0];
    let bytes = ctx.host.read_file(&ctx.on_disk(first))?;

    if looks_like_reshade(&bytes) {
        let mut instructions: Vec<Instruction> =
            files.iter().map(|f| Instruction::copy(f.clone(), join(BIN_X64_PREFIX, basename(f)))).collect();
        instructions.extend(tree.files_under(RESHADE_SHADERS_DIR, |_| true).into_iter().filter_map(|f| {
            let rel = path_match::strip_prefix(RESHADE_SHADERS_DIR, &f)?;
            Some(Instruction::copy(f.clone(), join(&join(BIN_X64_PREFIX, RESHADE_SHADERS_DIR), rel)))
        }));
        Ok(Instructions::new(LayoutKind::Ini(IniLayout::Reshade), instructions))
    } else {
        let instructions =
            files.iter().map(|f| Instruction::copy(f.clone(), join(INI_CONFIG_PREFIX, basename(f)))).collect();
        Ok(Instructions::new(LayoutKind::Ini(IniLayout::Ini), instructions))
    }
}
