//! Shared, injected cache of resolved configurations.
//!
//! A single run treats configuration files as immutable, so entries are
//! parsed once and never evicted. Callers construct one cache per run and
//! pass it into the classifier, which keeps tests hermetic (no process
//! globals) while still amortizing disk reads across every file that maps
//! to the same project.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use crate::config::{ResolvedConfig, normalize_path, resolve_config};
use crate::error::Result;

#[derive(Debug, Default)]
pub struct ConfigCache {
    entries: DashMap<PathBuf, Arc<ResolvedConfig>>,
    parses: AtomicUsize,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `config_path`, parsing it on first request.
    ///
    /// Concurrent callers asking for the same path serialize on the map
    /// entry, so the underlying file is read and parsed exactly once no
    /// matter how many files classify against it at the same time. The
    /// returned `Arc` is identity-stable for the lifetime of the cache.
    pub fn resolve(&self, config_path: &Path) -> Result<Arc<ResolvedConfig>> {
        let key = normalize_path(config_path, Path::new("/"));
        if let Some(entry) = self.entries.get(&key) {
            return Ok(Arc::clone(entry.value()));
        }

        // The entry lock covers the parse, so a racing resolver for the
        // same key blocks here instead of parsing a second time.
        let entry = self.entries.entry(key).or_try_insert_with(|| {
            self.parses.fetch_add(1, Ordering::Relaxed);
            resolve_config(config_path).map(Arc::new)
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Number of parses performed so far (diagnostics only).
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }

    /// Number of distinct configurations resolved so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
