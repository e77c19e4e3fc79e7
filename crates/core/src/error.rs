// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by every crate in the workspace.
//!
//! Variant names follow the error *kinds* named in the design's error
//! handling section rather than any particular backend's wording, so a
//! caller can match on `PyJobError::TaskLocked` regardless of whether the
//! task in question is a [`LocalTask`](https://docs.rs/pyjob-local) or an
//! LSF array job.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the task lifecycle, script handling, and backend
/// submission machinery.
#[derive(Debug, Error)]
pub enum PyJobError {
    /// A required backend command (e.g. `bjobs`, `qstat`) is absent from `PATH`.
    #[error("executable not found: {0}")]
    ExecutableNotFound(String),

    /// A child process exited non-zero and `permit_nonzero` was false.
    #[error("command {command:?} exited with code {code}")]
    ExecutionFailed { command: Vec<String>, code: i32 },

    /// Attempt to mutate a [`ScriptCollector`](crate::ScriptCollector) after it has been locked.
    #[error("collector is locked")]
    Locked,

    /// Attempt to run an already-started task, or add scripts to a locked task.
    #[error("task is locked")]
    TaskLocked,

    /// [`TaskFactory`] invoked with an unregistered platform tag.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    /// `ScriptCollector` was given an input shape it doesn't recognise.
    #[error("unrecognised executable input")]
    UnrecognisedExecutableInput,

    /// `run()` was called on a task with no scripts in its collector.
    #[error("one or more executable scripts required prior to execution")]
    EmptyCollection,

    /// A cluster task's prerequisite check failed (unknown queue/environment,
    /// or a required command missing from `PATH`).
    #[error("requirements not met: {0}")]
    RequirementsNotMet(String),

    /// The backend refused to terminate a submission for a reason other than
    /// the recognized benign responses.
    #[error("cannot delete task: {0}")]
    CannotDelete(String),

    /// A non-positive or non-integer runtime was passed to a `ClusterTask`.
    #[error("invalid runtime: {0}")]
    InvalidRuntime(String),

    /// A negative offset was passed to the array bash extension generator.
    #[error("invalid offset: {0}")]
    InvalidOffset(i64),

    /// The jobs file required for an array bash extension is missing or empty.
    #[error("invalid jobs file: {0}")]
    InvalidJobsFile(PathBuf),

    /// Two scripts were concatenated despite disagreeing shebang or suffix.
    #[error("scripts are not compatible for concatenation")]
    IncompatibleScripts,

    /// A script's suffix was empty or did not contain a dot.
    #[error("invalid script suffix: {0:?}")]
    InvalidSuffix(String),

    /// Attempted write on a locked configuration store.
    #[error("configuration store is locked")]
    ConfigLocked,

    /// Wraps any I/O failure surfaced from filesystem or process operations.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
