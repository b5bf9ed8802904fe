//! Nearest-ancestor project discovery.

use std::path::{Path, PathBuf};

use crate::config::TSCONFIG_FILENAME;

/// Walk from `start_dir` up through its ancestors (inclusive) and return
/// the first directory containing a `tsconfig.json`. Nearest ancestor wins;
/// `None` once the filesystem root is passed without a match.
pub fn find_nearest_tsconfig(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(TSCONFIG_FILENAME);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
