//! Read-only view over an archive's file list.
//!
//! `FileTree` answers the handful of shape queries every detector needs —
//! "does this directory exist", "what's directly inside it", "what's
//! anywhere under it" — without ever touching disk. It is built once per
//! `testSupported`/`install` call from the flat path list the host hands in.

use std::collections::{BTreeMap, BTreeSet};

use crate::path_match::{self, normalize};

/// The root directory path. Always present in a constructed [`FileTree`].
pub const FILETREE_ROOT: &str = "";

#[derive(Debug, Default, Clone)]
struct DirNode {
    /// Basenames of files directly in this directory.
    files: BTreeSet<String>,
    /// Names (not full paths) of direct child directories.
    subdirs: BTreeSet<String>,
}

/// An immutable, read-only view over a set of relative file paths.
#[derive(Debug, Clone)]
pub struct FileTree {
    dirs: BTreeMap<String, DirNode>,
    /// Every file's full normalized path, flattened.
    files: BTreeSet<String>,
}

impl FileTree {
    /// Build a tree from an arbitrary iterable of paths (forward or
    /// backslash separated — both are normalized).
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dirs: BTreeMap<String, DirNode> = BTreeMap::new();
        dirs.entry(FILETREE_ROOT.to_string()).or_default();

        let mut files = BTreeSet::new();

        for raw in paths {
            let path = normalize(raw.as_ref());
            if path.is_empty() {
                continue;
            }
            files.insert(path.clone());

            let dir = path_match::dirname(&path);
            let name = path_match::basename(&path);
            ensure_dir(&mut dirs, dir);
            dirs.entry(dir.to_string()).or_default().files.insert(name.to_string());
        }

        Self { dirs, files }
    }

    /// `true` if `dir` exists as a directory node (even if it has no files
    /// of its own — only subdirectories).
    pub fn dir_in_tree(&self, dir: &str) -> bool {
        self.dirs.contains_key(&normalize(dir))
    }

    /// Files directly in `dir` (one level) matching `filter`, as full paths.
    pub fn files_in(&self, dir: &str, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let dir = normalize(dir);
        match self.dirs.get(&dir) {
            Some(node) => node
                .files
                .iter()
                .map(|name| path_match::join(&dir, name))
                .filter(|full| filter(full))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Files anywhere under `dir` (transitively) matching `filter`, as full
    /// paths. Directory marker entries (paths ending in a separator) never
    /// appear in the input set so there is nothing to exclude explicitly.
    pub fn files_under(&self, dir: &str, filter: impl Fn(&str) -> bool) -> Vec<String> {
        let dir = normalize(dir);
        self.files
            .iter()
            .filter(|full| path_match::prefix_of(&dir, full))
            .filter(|full| filter(full))
            .cloned()
            .collect()
    }

    /// Direct child directories of `dir`, as full paths.
    pub fn subdirs_in(&self, dir: &str) -> Vec<String> {
        let dir = normalize(dir);
        match self.dirs.get(&dir) {
            Some(node) => node.subdirs.iter().map(|name| path_match::join(&dir, name)).collect(),
            None => Vec::new(),
        }
    }

    /// Direct child directory names (not full paths) of `dir`.
    pub fn subdir_names_in(&self, dir: &str) -> Vec<String> {
        let dir = normalize(dir);
        match self.dirs.get(&dir) {
            Some(node) => node.subdirs.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Immediate children of `dir` that themselves directly contain at
    /// least one file matching `pred`.
    pub fn find_direct_subdirs_with_some(&self, dir: &str, pred: impl Fn(&str) -> bool + Copy) -> Vec<String> {
        self.subdirs_in(dir)
            .into_iter()
            .filter(|child| !self.files_in(child, pred).is_empty())
            .collect()
    }

    /// Any descendant directory of `root` (at any depth, including `root`
    /// itself) that directly contains a file matching `pred`.
    pub fn find_all_subdirs_with_some(&self, root: &str, pred: impl Fn(&str) -> bool + Copy) -> Vec<String> {
        let root = normalize(root);
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(dir) = stack.pop() {
            if !self.files_in(&dir, pred).is_empty() {
                found.push(dir.clone());
            }
            stack.extend(self.subdirs_in(&dir));
        }
        found.sort();
        found
    }

    /// Existence-only form of [`Self::files_in`].
    pub fn dir_with_some_in(&self, dir: &str, pred: impl Fn(&str) -> bool) -> bool {
        !self.files_in(dir, pred).is_empty()
    }

    /// Existence-only form of [`Self::files_under`].
    pub fn dir_with_some_under(&self, dir: &str, pred: impl Fn(&str) -> bool) -> bool {
        !self.files_under(dir, pred).is_empty()
    }

    /// All file paths in the tree, flattened, sorted.
    pub fn source_paths(&self) -> Vec<String> {
        self.files.iter().cloned().collect()
    }

    /// Number of files in the tree.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

fn ensure_dir(dirs: &mut BTreeMap<String, DirNode>, dir: &str) {
    if dirs.contains_key(dir) {
        return;
    }
    let parent = path_match::dirname(dir);
    let name = path_match::basename(dir);
    ensure_dir(dirs, parent);
    dirs.entry(parent.to_string()).or_default().subdirs.insert(name.to_string());
    dirs.entry(dir.to_string()).or_default();
}
