//! Turns an on-disk directory into the flat, backslash-normalized path list
//! `pipeline::test_supported`/`pipeline::install` expect — the one place a
//! real host (or this crate's CLI harness) touches the filesystem directly.

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Walk `root` and collect every file's path relative to it, backslash-
/// normalized the way the pipeline expects regardless of host OS.
pub fn scan_tree(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).with_context(|| format!("stripping {} from walked entry", root.display()))?;
        let normalized = rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "\\");
        files.push(normalized);
    }
    Ok(files)
}
