use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the classification and invocation pipeline.
///
/// A checker process that runs to completion and reports type errors is not
/// an error at this level; that outcome is carried in
/// [`CheckOutcome`](crate::runner::CheckOutcome) for the caller to interpret.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The input file list was empty. Checking zero files is not a
    /// meaningful success, so it is rejected before any work happens.
    #[error("no files specified")]
    NoFilesSpecified,

    /// No ancestor directory of any input file contained a `tsconfig.json`,
    /// so the whole batch was skipped.
    #[error("no tsconfig.json found for any of the input files")]
    NoConfigurationFound,

    /// A configuration path named by a project reference (or passed by the
    /// caller) does not exist on disk.
    #[error("tsconfig not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but is not valid after JSONC
    /// normalization (comment stripping, trailing-comma removal).
    #[error("failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// An `extends` chain loops back on itself.
    #[error("tsconfig extends cycle detected at {path}")]
    ExtendsCycle { path: PathBuf },

    /// An `include` or `exclude` entry is not a valid glob pattern.
    #[error("invalid glob pattern '{pattern}' in {path}: {message}")]
    InvalidGlob {
        path: PathBuf,
        pattern: String,
        message: String,
    },

    /// Reading a configuration, or writing an ephemeral one, failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The external checker binary could not be spawned at all (missing,
    /// not executable). Distinct from the checker reporting type errors.
    #[error("failed to spawn checker '{program}': {source}")]
    CheckerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = CheckError> = std::result::Result<T, E>;
