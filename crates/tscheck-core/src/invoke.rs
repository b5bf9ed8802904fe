//! Invocation descriptors: one external checker run per classification
//! group, as pure data. Callers either execute them through the runner or
//! render them as command strings for a pre-commit tool to schedule.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::classify::ClassifiedFiles;
use crate::config::ResolvedConfig;

/// Caller-facing knobs for a whole check run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Return ready-to-run command strings instead of executing (the
    /// lint-staged integration mode).
    pub lint_staged: bool,
    /// Verbose diagnostics, and forwarded on generated commands.
    pub debug: bool,
    /// Forwarded hint, not interpreted here.
    pub monorepo: bool,
    /// Ask the checker for module-resolution tracing (`--traceResolution`).
    pub trace: bool,
    /// Retain ephemeral tsconfig files after the run.
    pub keep_tmp: bool,
    /// Extra include patterns forwarded on generated commands.
    pub include: Vec<String>,
    /// Explicit checker binary, overriding discovery.
    pub checker: Option<PathBuf>,
    /// Cooperative cancellation flag checked while a checker runs.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// One pending checker run against one governing configuration.
#[derive(Debug, Clone)]
pub struct InvocationDescriptor {
    pub config: Arc<ResolvedConfig>,
    pub files: Vec<PathBuf>,
    pub debug: bool,
    pub monorepo: bool,
    pub trace: bool,
    pub keep_tmp: bool,
    pub include: Vec<String>,
}

impl InvocationDescriptor {
    /// Render as an executable `tscheck` command line, the shape emitted to
    /// lint-staged. Paths are absolute, so the command is independent of
    /// the working directory it eventually runs in.
    pub fn to_command_string(&self) -> String {
        let mut parts = vec![
            "tscheck".to_string(),
            format!("--project {}", self.config.path.display()),
            format!("--files {}", join_paths(&self.files)),
        ];
        if !self.include.is_empty() {
            parts.push(format!("--include {}", self.include.join(",")));
        }
        if self.trace {
            parts.push("--trace".to_string());
        }
        if self.monorepo {
            parts.push("--monorepo".to_string());
        }
        if self.keep_tmp {
            parts.push("--keepTmp".to_string());
        }
        if self.debug {
            parts.push("--debug".to_string());
        }
        parts.join(" ")
    }
}

/// One descriptor per group with a non-empty file list; no side effects.
pub fn build_invocations(
    classified: &ClassifiedFiles,
    options: &CheckOptions,
) -> Vec<InvocationDescriptor> {
    classified
        .groups()
        .iter()
        .filter(|group| !group.files.is_empty())
        .map(|group| InvocationDescriptor {
            config: Arc::clone(&group.config),
            files: group.files.clone(),
            debug: options.debug,
            monorepo: options.monorepo,
            trace: options.trace,
            keep_tmp: options.keep_tmp,
            include: options.include.clone(),
        })
        .collect()
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
