#![allow(clippy::print_stderr, clippy::print_stdout)]

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use tscheck_cli::args::CliArgs;
use tscheck_core::{
    CheckError, CheckOptions, CheckOutcome, CheckReport, ConfigCache, InvocationDescriptor,
    normalize_path, perform_check, run_invocation,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_CHECK_FAILED: i32 = 1;

fn main() {
    // Initialize tracing if TSCHECK_LOG or RUST_LOG is set (zero cost
    // otherwise). Supports TSCHECK_LOG_FORMAT=tree|json|text.
    tscheck_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let code = match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "tscheck:".red());
            EXIT_CHECK_FAILED
        }
    };
    std::process::exit(code);
}

fn run(args: &CliArgs) -> Result<i32> {
    let files = args.all_files();
    tracing::debug!(files = files.len(), project = ?args.project, "tscheck starting");
    if args.debug {
        eprintln!("tscheck files: {files:?}");
    }

    // Generated commands carry -p; that path skips classification and
    // checks one explicit file list against one explicit project.
    if let Some(project) = &args.project {
        return run_single_project(args, project, &files);
    }

    let options = check_options(args);
    let report = perform_check(&files, &options)?;
    match report {
        CheckReport::Commands(commands) => {
            for command in &commands {
                println!("{command}");
            }
            Ok(EXIT_SUCCESS)
        }
        CheckReport::Outcomes(outcomes) => Ok(report_outcomes(&outcomes, args.debug)),
    }
}

fn run_single_project(args: &CliArgs, project: &PathBuf, files: &[PathBuf]) -> Result<i32> {
    if files.is_empty() {
        bail!("no files specified");
    }
    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    let project = normalize_path(project, &cwd);
    let files: Vec<PathBuf> = files
        .iter()
        .map(|file| normalize_path(file, &cwd))
        .collect();

    let cache = ConfigCache::new();
    let config = cache.resolve(&project)?;
    let descriptor = InvocationDescriptor {
        config,
        files,
        debug: args.debug,
        monorepo: args.monorepo,
        trace: args.trace,
        keep_tmp: args.keep_tmp,
        include: args.include.clone(),
    };

    let outcome = run_invocation(&descriptor, args.checker.as_deref(), None)?;
    Ok(report_outcomes(&[Ok(outcome)], args.debug))
}

fn check_options(args: &CliArgs) -> CheckOptions {
    CheckOptions {
        lint_staged: args.lint_staged,
        debug: args.debug,
        monorepo: args.monorepo,
        trace: args.trace,
        keep_tmp: args.keep_tmp,
        include: args.include.clone(),
        checker: args.checker.clone(),
        cancel: Some(Arc::default()),
    }
}

/// Print per-group results, checker text passed through verbatim, and fold
/// them into a process exit code.
fn report_outcomes(outcomes: &[Result<CheckOutcome, CheckError>], debug: bool) -> i32 {
    let mut failed = false;

    for outcome in outcomes {
        match outcome {
            Ok(result) if result.success() => {
                if debug && !result.stdout.is_empty() {
                    println!("{}", result.stdout);
                }
            }
            Ok(result) => {
                failed = true;
                eprintln!(
                    "{} {}",
                    "tsc check failed for".red(),
                    result.config_path.display()
                );
                if !result.stderr.is_empty() {
                    eprintln!("{}", "tscheck stderr:".red());
                    eprintln!("{}", result.stderr);
                }
                if !result.stdout.is_empty() {
                    println!("{}", "tscheck stdout:".red());
                    println!("{}", result.stdout);
                }
            }
            Err(err) => {
                failed = true;
                eprintln!("{} {err}", "tscheck:".red());
            }
        }
    }

    if failed {
        EXIT_CHECK_FAILED
    } else {
        println!("{}", "tsc check success!".green());
        EXIT_SUCCESS
    }
}
