//! Request path resolution
//!
//! Turns the path component of a request URI into a location under the
//! serving root. `.` and `..` segments are dropped rather than interpreted,
//! and the canonical result must still lie under the root, which also stops
//! symlinks from leading out of it.

use crate::logger;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What a request path points at
#[derive(Debug)]
pub enum Target {
    File(PathBuf),
    Directory(PathBuf),
    NotFound,
}

/// Resolve `uri_path` against the canonical `root`
pub async fn resolve(root: &Path, uri_path: &str) -> Target {
    let Some(joined) = join_request_path(root, uri_path) else {
        return Target::NotFound;
    };
    let Some(canonical) = confine(root, &joined).await else {
        return Target::NotFound;
    };

    match fs::metadata(&canonical).await {
        Ok(metadata) if metadata.is_dir() => Target::Directory(joined),
        Ok(_) => Target::File(joined),
        Err(_) => Target::NotFound,
    }
}

/// Map a URI path onto `root` without touching the filesystem.
///
/// Returns `None` for paths that cannot name a file: invalid UTF-8 after
/// percent-decoding, embedded NUL, or (on Windows) drive and backslash
/// tricks.
pub fn join_request_path(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;

    let mut target = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." | ".." => {}
            s if s.contains('\0') => return None,
            s if cfg!(windows) && s.contains(|c| c == '\\' || c == ':') => return None,
            s => target.push(s),
        }
    }
    Some(target)
}

/// Whether the decoded request path ends in `/`, naming a directory
pub fn names_directory(uri_path: &str) -> bool {
    percent_decode_str(uri_path)
        .decode_utf8_lossy()
        .ends_with('/')
}

/// Canonicalize `path` and check it is `root` or below it.
///
/// `root` must already be canonical.
pub async fn confine(root: &Path, path: &Path) -> Option<PathBuf> {
    // Missing files are the common case, not worth logging
    let canonical = fs::canonicalize(path).await.ok()?;
    if canonical.starts_with(root) {
        Some(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            path.display(),
            canonical.display()
        ));
        None
    }
}
