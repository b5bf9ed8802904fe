//! Incremental type-check orchestration for staged TypeScript files.
//!
//! Given a set of changed files, this crate figures out which
//! `tsconfig.json` governs each one, groups files by governing project, and
//! produces one narrow checker invocation per group against an ephemeral
//! configuration that lists exactly the changed files. The actual type
//! checking is delegated to an external `tsc`-compatible binary; nothing
//! here interprets diagnostics beyond pass/fail.

pub mod cache;
pub mod classify;
pub mod config;
pub mod ephemeral;
pub mod error;
pub mod invoke;
pub mod locate;
pub mod runner;

use std::path::PathBuf;

use rayon::prelude::*;

pub use cache::ConfigCache;
pub use classify::{ClassificationGroup, ClassifiedFiles, classify_files, is_member};
pub use config::{ResolvedConfig, TSCONFIG_FILENAME, normalize_path, parse_tsconfig};
pub use error::{CheckError, Result};
pub use invoke::{CheckOptions, InvocationDescriptor, build_invocations};
pub use runner::{CheckOutcome, run_invocation};

/// What a check run produced, depending on mode.
#[derive(Debug)]
pub enum CheckReport {
    /// Lint-staged mode: ready-to-run command strings, one per group.
    Commands(Vec<String>),
    /// Direct mode: one entry per group. `Err` means the invocation could
    /// not run at all (spawn failure); a checker that ran and reported
    /// type errors is an `Ok` outcome with a non-zero status.
    Outcomes(Vec<Result<CheckOutcome>>),
}

impl CheckReport {
    /// Whether every group passed. Commands count as passing; they were
    /// never executed here.
    pub fn all_passed(&self) -> bool {
        match self {
            CheckReport::Commands(_) => true,
            CheckReport::Outcomes(outcomes) => outcomes
                .iter()
                .all(|outcome| matches!(outcome, Ok(result) if result.success())),
        }
    }
}

/// Classify `files`, build one invocation per governing configuration, and
/// either render the invocations as commands (lint-staged mode) or execute
/// them concurrently.
///
/// Classification-level failures (empty input, no configuration anywhere,
/// unparsable configs) abort the whole batch; checker failures stay
/// isolated to their group's entry in the report.
pub fn perform_check(files: &[PathBuf], options: &CheckOptions) -> Result<CheckReport> {
    let cache = ConfigCache::new();
    let classified = classify_files(&cache, files)?;
    let invocations = build_invocations(&classified, options);

    if options.lint_staged {
        let commands = invocations
            .iter()
            .map(InvocationDescriptor::to_command_string)
            .collect();
        return Ok(CheckReport::Commands(commands));
    }

    // Groups address disjoint ephemeral configs and file sets, so they can
    // run concurrently; each worker blocks on its own child process.
    let checker = options.checker.as_deref();
    let cancel = options.cancel.as_deref();
    let outcomes = invocations
        .par_iter()
        .map(|invocation| run_invocation(invocation, checker, cancel))
        .collect();

    Ok(CheckReport::Outcomes(outcomes))
}
