//! Partitioning of input files by their governing configuration.
//!
//! Each file resolves independently: locate the nearest `tsconfig.json`,
//! then let the first declared project reference that claims the file
//! govern it, falling back to the nearest config itself. Because files
//! never depend on each other, the per-file work runs on the rayon pool
//! and is folded back into input order afterwards.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::cache::ConfigCache;
use crate::config::{ResolvedConfig, normalize_path};
use crate::error::{CheckError, Result};
use crate::locate::find_nearest_tsconfig;

/// One governing configuration plus the input files assigned to it, in
/// input order.
#[derive(Debug, Clone)]
pub struct ClassificationGroup {
    pub config: Arc<ResolvedConfig>,
    pub files: Vec<PathBuf>,
}

/// The full partition, groups ordered by first appearance in the input.
#[derive(Debug, Default)]
pub struct ClassifiedFiles {
    groups: Vec<ClassificationGroup>,
}

impl ClassifiedFiles {
    pub fn groups(&self) -> &[ClassificationGroup] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<ClassificationGroup> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Whether `file` is a declared member of the configuration at
/// `config_path`. Both relative and absolute forms of `file` normalize to
/// the same answer.
pub fn is_member(cache: &ConfigCache, file: &Path, config_path: &Path) -> Result<bool> {
    let cwd = current_dir()?;
    let file = normalize_path(file, &cwd);
    Ok(cache.resolve(config_path)?.contains(&file))
}

/// Partition `files` by governing configuration.
///
/// Files with no locatable configuration are skipped; an entirely empty
/// result is reported as [`CheckError::NoConfigurationFound`] so callers
/// cannot mistake "nothing was checked" for success. An empty input list
/// is rejected up front with [`CheckError::NoFilesSpecified`].
///
/// Tie-break: when a file is a member of more than one referenced project,
/// the first reference in declaration order wins.
pub fn classify_files(cache: &ConfigCache, files: &[PathBuf]) -> Result<ClassifiedFiles> {
    if files.is_empty() {
        return Err(CheckError::NoFilesSpecified);
    }

    let cwd = current_dir()?;
    let normalized: Vec<PathBuf> = files
        .iter()
        .map(|file| normalize_path(file, &cwd))
        .collect();

    // Independent per-file lookups; config parses are deduplicated by the
    // cache even when every file races toward the same tsconfig.
    let assignments: Vec<Option<Arc<ResolvedConfig>>> = normalized
        .par_iter()
        .map(|file| classify_one(cache, file))
        .collect::<Result<_>>()?;

    let mut result = ClassifiedFiles::default();
    let mut index_by_path: FxHashMap<PathBuf, usize> = FxHashMap::default();
    for (file, assignment) in normalized.into_iter().zip(assignments) {
        let Some(config) = assignment else {
            tracing::warn!(file = %file.display(), "no tsconfig.json found; file skipped");
            continue;
        };
        let index = *index_by_path
            .entry(config.path.clone())
            .or_insert_with(|| {
                result.groups.push(ClassificationGroup {
                    config: Arc::clone(&config),
                    files: Vec::new(),
                });
                result.groups.len() - 1
            });
        result.groups[index].files.push(file);
    }

    if result.is_empty() {
        return Err(CheckError::NoConfigurationFound);
    }

    tracing::debug!(
        groups = result.len(),
        configs_parsed = cache.parse_count(),
        "classification complete"
    );
    Ok(result)
}

fn classify_one(cache: &ConfigCache, file: &Path) -> Result<Option<Arc<ResolvedConfig>>> {
    let dir = file.parent().unwrap_or_else(|| Path::new("/"));
    let Some(nearest_path) = find_nearest_tsconfig(dir) else {
        return Ok(None);
    };

    let nearest = cache.resolve(&nearest_path)?;
    for reference in &nearest.references {
        let referenced = cache.resolve(reference)?;
        if referenced.contains(file) {
            tracing::trace!(
                file = %file.display(),
                config = %referenced.path.display(),
                "claimed by referenced project"
            );
            return Ok(Some(referenced));
        }
    }

    Ok(Some(nearest))
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map_err(|err| CheckError::io("failed to resolve current directory", err))
}
