use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for the tscheck binary.
#[derive(Parser, Debug)]
#[command(
    name = "tscheck",
    version,
    about = "Run tsc against just the changed files of each project"
)]
pub struct CliArgs {
    /// Files to check. Relative paths resolve against the current directory.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Comma-separated file list, the form emitted on generated commands.
    #[arg(short = 'f', long = "files", value_name = "LIST", value_delimiter = ',')]
    pub file_list: Vec<PathBuf>,

    /// Check against this tsconfig directly instead of classifying files.
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,

    /// Print the per-project commands instead of running them, for
    /// integration with lint-staged.
    #[arg(long = "lintStaged", aliases = ["lint-staged", "quiet"])]
    pub lint_staged: bool,

    /// Verbose diagnostic output.
    #[arg(long)]
    pub debug: bool,

    /// Monorepo hint, forwarded on generated commands.
    #[arg(long)]
    pub monorepo: bool,

    /// Enable the checker's module-resolution tracing (--traceResolution).
    #[arg(long)]
    pub trace: bool,

    /// Keep the ephemeral tsconfig files after the run (for debugging a
    /// failing invocation).
    #[arg(long = "keepTmp", alias = "keep-tmp")]
    pub keep_tmp: bool,

    /// Include patterns forwarded on generated commands.
    #[arg(short = 'i', long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Checker binary to invoke (default: nearest node_modules/.bin/tsc,
    /// then tsc from PATH).
    #[arg(long)]
    pub checker: Option<PathBuf>,
}

impl CliArgs {
    /// Positional files plus any `--files` list, in that order.
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut files = self.files.clone();
        files.extend(self.file_list.iter().cloned());
        files
    }
}
