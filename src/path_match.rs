//! Pure path predicates and normalization.
//!
//! Every path the pipeline deals with is a relative path inside an unpacked
//! archive, normalized to backslash separators regardless of host OS —
//! that's the convention the destination game root expects.

pub const SEP: char = '\\';

/// Normalize a path to backslash separators. Forward slashes (as produced by
/// archive tools on Linux) are converted; backslashes pass through untouched.
pub fn normalize(path: &str) -> String {
    path.replace('/', "\\")
}

/// Join two path segments with the canonical separator. An empty `base`
/// denotes the tree root, so `join("", "foo")` is just `"foo"`.
pub fn join(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        base.to_string()
    } else {
        format!("{base}{SEP}{child}")
    }
}

/// The final path segment (file or directory name).
pub fn basename(path: &str) -> &str {
    match path.rsplit_once(SEP) {
        Some((_, name)) => name,
        None => path,
    }
}

/// The path with its final segment removed, or `""` at the root.
pub fn dirname(path: &str) -> &str {
    match path.rsplit_once(SEP) {
        Some((dir, _)) => dir,
        None => "",
    }
}

/// Case-insensitive extension match. `ext` is given without a leading dot.
pub fn ext_eq(path: &str, ext: &str) -> bool {
    match path.rsplit_once('.') {
        Some((_, found)) => found.eq_ignore_ascii_case(ext),
        None => ext.is_empty(),
    }
}

/// Case-insensitive extension-set match.
pub fn ext_in(path: &str, exts: &[&str]) -> bool {
    exts.iter().any(|e| ext_eq(path, e))
}

/// Case-insensitive basename match.
pub fn basename_eq(path: &str, name: &str) -> bool {
    basename(path).eq_ignore_ascii_case(name)
}

/// True if `path` begins with `prefix` as a whole path segment — either
/// `path == prefix` or `path` starts with `prefix + SEP`. `prefix` is
/// matched case-insensitively, matching Windows' own path semantics.
pub fn prefix_of(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if path.eq_ignore_ascii_case(prefix) {
        return true;
    }
    let needle_len = prefix.len();
    path.len() > needle_len
        && path.as_bytes()[needle_len] == SEP as u8
        && path[..needle_len].eq_ignore_ascii_case(prefix)
}

/// Strip a matched prefix (as defined by [`prefix_of`]) from `path`, leaving
/// the remainder without a leading separator. Returns `None` if `path` is
/// not under `prefix`.
pub fn strip_prefix<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    if !prefix_of(prefix, path) {
        return None;
    }
    if prefix.is_empty() {
        return Some(path);
    }
    Some(path[prefix.len()..].trim_start_matches(SEP))
}
