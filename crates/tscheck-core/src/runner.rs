//! External checker execution.
//!
//! Each invocation synthesizes its ephemeral config, spawns the checker in
//! project mode against it (`-p <ephemeral> --noEmit --incremental`), and
//! captures both output streams. A non-zero checker exit is an ordinary
//! [`CheckOutcome`], not a runner error; only failure to spawn the binary
//! or to write the ephemeral file is. The ephemeral guard drops on every
//! path out of this module, including cancellation.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::ephemeral::synthesize;
use crate::error::{CheckError, Result};
use crate::invoke::InvocationDescriptor;

/// How often the wait loop polls the child and the cancellation flag.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Result of one checker invocation that actually ran.
#[derive(Debug)]
pub struct CheckOutcome {
    /// The real (base) configuration this group was checked against.
    pub config_path: PathBuf,
    /// Files covered by the invocation.
    pub files: Vec<PathBuf>,
    /// Checker exit code; `None` when the process died to a signal
    /// (including a cancellation kill).
    pub status: Option<i32>,
    /// Captured standard output, passed through verbatim.
    pub stdout: String,
    /// Captured standard error, passed through verbatim.
    pub stderr: String,
}

impl CheckOutcome {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Find the checker binary for a project rooted at `config_dir`.
///
/// Order: explicit override, nearest `node_modules/.bin/tsc` walking up
/// from the config directory, then bare `tsc` from `PATH`.
pub fn resolve_checker(config_dir: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let binary = if cfg!(windows) { "tsc.cmd" } else { "tsc" };
    for dir in config_dir.ancestors() {
        let candidate = dir.join("node_modules").join(".bin").join(binary);
        if candidate.is_file() {
            return candidate;
        }
    }
    PathBuf::from(binary)
}

/// Run one invocation to completion.
///
/// `cancel` is polled while the child runs; once set, the child is killed
/// and the call returns the partial outcome. Cleanup of the ephemeral file
/// happens on every path via its drop guard.
pub fn run_invocation(
    descriptor: &InvocationDescriptor,
    checker: Option<&Path>,
    cancel: Option<&AtomicBool>,
) -> Result<CheckOutcome> {
    let ephemeral = synthesize(&descriptor.config, &descriptor.files, descriptor.keep_tmp)?;
    let program = resolve_checker(&descriptor.config.dir, checker);

    tracing::info!(
        checker = %program.display(),
        config = %descriptor.config.path.display(),
        files = descriptor.files.len(),
        "running type check"
    );

    let mut command = Command::new(&program);
    command
        .arg("-p")
        .arg(ephemeral.path())
        .arg("--noEmit")
        .arg("--incremental");
    if descriptor.trace {
        command.arg("--traceResolution");
    }
    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| CheckError::CheckerSpawn {
            program: program.display().to_string(),
            source: err,
        })?;

    // Drain both pipes on reader threads so a chatty checker can never
    // fill a pipe buffer and deadlock against the wait loop below.
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = loop {
        if let Some(flag) = cancel {
            if flag.load(Ordering::Relaxed) {
                tracing::debug!("cancellation requested; killing checker");
                let _ = child.kill();
            }
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(err) => {
                let _ = child.kill();
                return Err(CheckError::io("failed to wait for checker", err));
            }
        }
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);

    tracing::debug!(
        config = %descriptor.config.path.display(),
        code = ?status.code(),
        "checker exited"
    );

    Ok(CheckOutcome {
        config_path: descriptor.config.path.clone(),
        files: descriptor.files.clone(),
        status: status.code(),
        stdout,
        stderr,
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = String::new();
        let _ = stream.read_to_string(&mut buf);
        buf
    })
}

fn join_reader(handle: Option<std::thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
