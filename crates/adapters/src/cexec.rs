// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `cexec`: the synchronous "spawn a child process, capture stdout/stderr,
//! propagate signals" collaborator used by every backend — the local
//! worker pool executing member scripts, and the cluster backends' submit/
//! info/kill commands.

use crate::signal::ActiveChild;
use crate::which::which;
use pyjob_core::PyJobError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Where a child's stdout (with stderr merged in) should go.
#[derive(Debug, Clone)]
pub enum Stdout {
    /// Capture combined stdout+stderr as a `String`, trimmed of trailing
    /// whitespace — the shape every cluster submit/info/kill command uses.
    Capture,
    /// Redirect combined stdout+stderr into the named file (created or
    /// truncated), the shape the local worker pool uses for a script's
    /// `.log` sibling.
    File(PathBuf),
}

impl Default for Stdout {
    fn default() -> Self {
        Stdout::Capture
    }
}

/// Options accepted by [`cexec`], mirroring the keyword arguments the
/// original `cexec` function forwarded to `subprocess.Popen`.
#[derive(Debug, Clone, Default)]
pub struct CexecOptions {
    pub cwd: Option<PathBuf>,
    pub stdin: Option<String>,
    pub stdout: Stdout,
    pub permit_nonzero: bool,
}

/// The outcome of a successful (or `permit_nonzero`-tolerated) invocation.
#[derive(Debug, Clone)]
pub struct CexecResult {
    /// Captured, trimmed stdout+stderr. Empty when `stdout` was
    /// [`Stdout::File`].
    pub stdout: String,
    pub code: i32,
}

/// Spawn `command` synchronously, waiting for it to exit.
///
/// `command[0]` is resolved against `PATH` first via a `which()`-style
/// pre-check; a failed resolution raises
/// [`PyJobError::ExecutableNotFound`] before any process is spawned.
///
/// While the child runs, SIGINT/SIGTERM delivered to this process are
/// forwarded to it (see [`crate::signal`]).
///
/// # Errors
///
/// - [`PyJobError::ExecutableNotFound`] if `command[0]` cannot be resolved.
/// - [`PyJobError::ExecutionFailed`] if the child exits non-zero and
///   `options.permit_nonzero` is `false`.
/// - [`PyJobError::Io`] for any other spawn/IO failure.
pub fn cexec(command: &[String], options: CexecOptions) -> Result<CexecResult, PyJobError> {
    let Some(program) = command.first() else {
        return Err(PyJobError::ExecutableNotFound(String::new()));
    };
    let resolved = which(program).ok_or_else(|| PyJobError::ExecutableNotFound(program.clone()))?;

    let mut cmd = Command::new(&resolved);
    cmd.args(&command[1..]);
    cmd.current_dir(options.cwd.clone().unwrap_or(std::env::current_dir()?));
    cmd.stdin(if options.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let log_file = match &options.stdout {
        Stdout::Capture => {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
            None
        }
        Stdout::File(path) => {
            let file = std::fs::File::create(path)?;
            cmd.stdout(Stdio::from(file.try_clone()?));
            cmd.stderr(Stdio::from(file));
            Some(path.clone())
        }
    };

    let mut child = cmd.spawn()?;
    let _active = ActiveChild::register(child.id());

    if let Some(input) = &options.stdin {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(input.as_bytes())?;
        }
    }

    let output = child.wait_with_output()?;
    let code = output.status.code().unwrap_or(-1);

    let stdout = match log_file {
        Some(_) => String::new(),
        None => {
            let mut combined = output.stdout;
            combined.extend_from_slice(&output.stderr);
            String::from_utf8_lossy(&combined).trim().to_string()
        }
    };

    if output.status.success() || options.permit_nonzero {
        Ok(CexecResult { stdout, code })
    } else {
        Err(PyJobError::ExecutionFailed {
            command: command.to_vec(),
            code,
        })
    }
}

/// Convenience overload for the common case of a single script path with no
/// other options: runs `script`, capturing combined stdout+stderr to `log`,
/// in `cwd`. Used by the local worker pool.
pub fn run_script_to_log(
    script: &Path,
    log: &Path,
    cwd: &Path,
    permit_nonzero: bool,
) -> Result<CexecResult, PyJobError> {
    cexec(
        &[script.to_string_lossy().into_owned()],
        CexecOptions {
            cwd: Some(cwd.to_path_buf()),
            stdin: None,
            stdout: Stdout::File(log.to_path_buf()),
            permit_nonzero,
        },
    )
}

#[cfg(test)]
#[path = "cexec_tests.rs"]
mod tests;
