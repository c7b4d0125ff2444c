//! JSON config-file detector (spec.md §4.9). Relocates files in a small
//! known-basename table and passes `options.json` / sidecar `.txt`/`.md`
//! files through in place, rejecting anything it doesn't recognize.

use crate::context::InstallContext;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::instructions::{Instruction, Instructions, LayoutKind};
use crate::layout::{CET_INIT_FILE, JSON_EXT, JSON_SIDECAR_EXTS, KNOWN_JSON_FILES, OPTIONS_JSON, R6_SETTINGS_PREFIX};
use crate::path_match::{self, basename_eq, ext_eq, ext_in, prefix_of};

pub fn detect(tree: &FileTree) -> bool {
    !tree.dir_with_some_under("", |p| basename_eq(p, CET_INIT_FILE)) && tree.dir_with_some_under("", |p| ext_eq(p, JSON_EXT))
}

pub fn layout(tree: &FileTree, _ctx: &InstallContext) -> InstallResult<Instructions> {
    if !detect(tree) {
        return Ok(Instructions::no_match());
    }

    let options_files = tree.files_under("", |p| basename_eq(p, OPTIONS_JSON));
    for f in &options_files {
        if !prefix_of(R6_SETTINGS_PREFIX, f) {
            return Err(InstallError::Validation(format!(
                "options.json must reside under {R6_SETTINGS_PREFIX}\\, found at {f}"
            )));
        }
    }

    let mut instructions: Vec<Instruction> = options_files.iter().map(|f| Instruction::copy(f.clone(), f.clone())).collect();

    for f in tree.files_under("", |p| ext_eq(p, JSON_EXT) && !basename_eq(p, OPTIONS_JSON)) {
        let base = path_match::basename(&f);
        match KNOWN_JSON_FILES.iter().find(|(name, _)| base.eq_ignore_ascii_case(name)) {
            Some((_, dest)) => instructions.push(Instruction::copy(f.clone(), (*dest).to_string())),
            None => return Err(InstallError::Validation(format!("unrecognized JSON file: {f}"))),
        }
    }

    instructions.extend(tree.files_under("", |p| ext_in(p, JSON_SIDECAR_EXTS)).into_iter().map(|p| Instruction::copy(p.clone(), p)));

    Ok(Instructions::new(LayoutKind::Json, instructions))
}
