//! Ephemeral narrowed-configuration synthesis.
//!
//! An ephemeral config is a syntactically complete tsconfig written next to
//! its base, checking exactly one group's files: the base's raw document is
//! copied through (including any `extends`, which keeps resolving because
//! the file is co-located), `skipLibCheck` is forced on, `composite` is
//! forced off, `files` is pinned to the explicit list, and `include` /
//! `references` are emptied so no glob or reference expansion can pull in
//! anything beyond the list.
//!
//! Filenames carry the process id plus a process-wide counter; concurrent
//! invocations against the same base config therefore never collide or
//! delete each other's in-flight file. `tsBuildInfoFile` is pinned to one
//! stable path per base config: left to its default, tsc would derive the
//! build-info name from the unique ephemeral filename, leaking one stray
//! artifact per run and starting every run with a cold incremental cache.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value, json};

use crate::config::ResolvedConfig;
use crate::error::{CheckError, Result};

static NEXT_EPHEMERAL_ID: AtomicU64 = AtomicU64::new(0);

/// Fixed build-info filename shared by every check against one base config.
const BUILD_INFO_FILENAME: &str = "tsconfig.tscheck.tsbuildinfo";

/// Handle owning an ephemeral config on disk.
///
/// Dropping the handle deletes the file on every exit path (success,
/// checker failure, cancellation) unless `keep` was requested; a failed
/// delete is logged and otherwise ignored so cleanup can never override a
/// check result.
#[derive(Debug)]
pub struct EphemeralConfig {
    path: PathBuf,
    keep: bool,
}

impl EphemeralConfig {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for EphemeralConfig {
    fn drop(&mut self) {
        if self.keep {
            tracing::debug!(path = %self.path.display(), "keeping ephemeral tsconfig");
            return;
        }
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove ephemeral tsconfig"
            );
        }
    }
}

/// Write a narrowed copy of `base` that checks exactly `files`.
pub fn synthesize(base: &ResolvedConfig, files: &[PathBuf], keep: bool) -> Result<EphemeralConfig> {
    let mut doc = match &base.raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let mut options = match doc.remove("compilerOptions") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    options.insert("skipLibCheck".to_string(), Value::Bool(true));
    options.insert("composite".to_string(), Value::Bool(false));
    options.insert(
        "tsBuildInfoFile".to_string(),
        Value::String(base.dir.join(BUILD_INFO_FILENAME).display().to_string()),
    );

    doc.insert("compilerOptions".to_string(), Value::Object(options));
    doc.insert(
        "files".to_string(),
        json!(
            files
                .iter()
                .map(|file| file.display().to_string())
                .collect::<Vec<_>>()
        ),
    );
    doc.insert("include".to_string(), json!([]));
    doc.insert("references".to_string(), json!([]));

    let name = format!(
        "tsconfig.tscheck-{}-{}.json",
        std::process::id(),
        NEXT_EPHEMERAL_ID.fetch_add(1, Ordering::Relaxed)
    );
    let path = base.dir.join(name);

    let text = serde_json::to_string_pretty(&Value::Object(doc)).map_err(|err| {
        CheckError::ConfigParse {
            path: base.path.clone(),
            message: err.to_string(),
        }
    })?;
    std::fs::write(&path, text)
        .map_err(|err| CheckError::io(format!("failed to write {}", path.display()), err))?;

    tracing::debug!(
        base = %base.path.display(),
        ephemeral = %path.display(),
        files = files.len(),
        "wrote ephemeral tsconfig"
    );
    Ok(EphemeralConfig { path, keep })
}
