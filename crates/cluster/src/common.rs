// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fields and composition logic shared by every `ClusterTask` backend:
//! the runscript/jobs-file generation pipeline and the array bash
//! extension.

use pyjob_adapters::which;
use pyjob_core::script::Script;
use pyjob_core::task::TaskCore;
use pyjob_core::{PyJobError, ScriptInput};
use std::path::{Path, PathBuf};

/// Options unique to `ClusterTask`, layered on top of [`TaskCore`]'s
/// shared fields.
#[derive(Debug, Clone)]
pub struct ClusterOptions {
    pub dependency: Vec<u64>,
    pub max_array_size: Option<usize>,
    pub priority: Option<i64>,
    pub queue: Option<String>,
    pub environment: String,
    pub runtime: Option<i64>,
    pub shell: Option<PathBuf>,
    pub name: String,
    pub extra: Vec<String>,
    pub cleanup: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            dependency: Vec::new(),
            max_array_size: None,
            priority: None,
            queue: None,
            environment: "mpi".to_string(),
            runtime: None,
            shell: None,
            name: "pyjob".to_string(),
            extra: Vec::new(),
            cleanup: false,
        }
    }
}

/// Fields and generated artifacts shared by every cluster backend.
pub struct ClusterCore {
    pub core: TaskCore,
    pub options: ClusterOptions,
    pub runscript: Option<Script>,
    pub jobsfile: Option<PathBuf>,
    closed: bool,
}

impl ClusterCore {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<PathBuf>,
        nprocesses: Option<usize>,
        mut options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        let core = TaskCore::new(script, directory, nprocesses)?;
        if options.max_array_size.is_none() {
            options.max_array_size = Some(core.scripts().len().max(1));
        }
        Ok(Self {
            core,
            options,
            runscript: None,
            jobsfile: None,
            closed: false,
        })
    }

    /// The effective array concurrency cap: the configured
    /// `max_array_size`, or the number of member scripts if unset.
    pub fn max_array_size(&self) -> usize {
        self.options
            .max_array_size
            .unwrap_or_else(|| self.core.scripts().len().max(1))
    }
}

/// Verify that `command` (a backend's primary status command, e.g. `bjobs`,
/// `qstat`, `squeue`) is discoverable on `PATH`; construction fails fast with
/// a *requirements-not-met* error otherwise.
pub fn ensure_exec_available(command: &str) -> Result<(), PyJobError> {
    if which(command).is_some() {
        Ok(())
    } else {
        Err(PyJobError::RequirementsNotMet(format!(
            "required executable '{command}' not found on PATH"
        )))
    }
}

/// Idempotent teardown shared by every backend's `close()`: removes the
/// generated runscript/jobs file when `options.cleanup` is set.
pub fn close_cluster(cluster: &mut ClusterCore) -> Result<(), PyJobError> {
    if cluster.closed {
        return Ok(());
    }
    cluster.closed = true;
    if cluster.options.cleanup {
        if let Some(runscript) = &cluster.runscript {
            let _ = std::fs::remove_file(runscript.path());
        }
        if let Some(jobsfile) = &cluster.jobsfile {
            let _ = std::fs::remove_file(jobsfile);
        }
    }
    Ok(())
}

/// Parse the leading run of ASCII digits from `token` as a [`Pid`]. Used to
/// normalize the submit-response parsing of every backend down to the
/// positive integer pid the shared [`Task`](pyjob_core::Task) contract
/// expects.
pub fn parse_leading_number(token: &str) -> Result<pyjob_core::task::Pid, PyJobError> {
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().map_err(|_| {
        PyJobError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("could not parse a job id out of submission output token {token:?}"),
        ))
    })
}

/// Allocate a fresh, uniquely-named runscript identity:
/// `<directory>/<prefix>_<unique-id>.script`, with its sibling `.log` and
/// `.jobs` paths.
pub fn new_runscript(directory: &Path, prefix: &str) -> Result<Script, PyJobError> {
    let stem = pyjob_core::id::unique_stem();
    Script::new(directory, format!("{prefix}_"), stem, ".script")
}

pub fn log_path(runscript: &Script) -> PathBuf {
    runscript.path().with_extension("log")
}

pub fn jobs_path(runscript: &Script) -> PathBuf {
    runscript.path().with_extension("jobs")
}

/// Write the `.jobs` file sibling of a runscript: one member script path
/// per line, in collector order, final line LF-terminated.
pub fn write_jobs_file(path: &Path, scripts: &[PathBuf]) -> Result<(), PyJobError> {
    let mut content = String::new();
    for script in scripts {
        content.push_str(&script.to_string_lossy());
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// The three-line array bash extension that maps an array index to its
/// member script and log.
///
/// `index_var` is the backend's array-index environment variable (e.g.
/// `$SGE_TASK_ID`); `offset` is added to it when positive (LSF's
/// zero-based array indices need `offset = 1`; every other backend here
/// uses `offset = 0`).
pub fn array_bash_extension(
    index_var: &str,
    jobsfile: &Path,
    offset: i64,
) -> Result<Vec<String>, PyJobError> {
    if offset < 0 {
        return Err(PyJobError::InvalidOffset(offset));
    }
    let is_nonempty_file = std::fs::metadata(jobsfile).map(|m| m.is_file() && m.len() > 0).unwrap_or(false);
    if !is_nonempty_file {
        return Err(PyJobError::InvalidJobsFile(jobsfile.to_path_buf()));
    }
    let index_expr = if offset > 0 {
        format!("$(({index_var} + {offset}))")
    } else {
        index_var.to_string()
    };
    Ok(vec![
        format!("script=$(awk \"NR=={index_expr}\" {})", jobsfile.display()),
        "log=$(echo $script | sed \"s/\\.${script##*.}/\\.log/\")".to_string(),
        "$script > $log 2>&1".to_string(),
    ])
}

/// Format a backend directive line: `<directive-prefix> <body>`.
pub fn directive(prefix: &str, body: impl std::fmt::Display) -> String {
    format!("{prefix} {body}")
}

#[cfg(test)]
#[path = "common_tests.rs"]
mod tests;
