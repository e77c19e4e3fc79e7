// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `pyjob`: the facade crate. Re-exports the `Task` lifecycle contract and
//! every concrete backend, and provides [`TaskFactory`] — a name-to-
//! constructor registry selecting a `Task` implementation by platform tag.

pub use pyjob_cluster::{ClusterOptions, LsfTask, PbsTask, SgeTask, SlurmTask, TorqueTask};
pub use pyjob_config::{fallback, ConfigFields, ConfigStore};
pub use pyjob_core::{get_time, Pid, PyJobError, Script, ScriptCollector, ScriptInput, Task, TaskInfo};
pub use pyjob_local::LocalTask;

use std::path::PathBuf;

/// Options unique to [`LocalTask`], layered the same way
/// [`ClusterOptions`] layers onto the cluster backends.
#[derive(Debug, Clone, Default)]
pub struct LocalOptions {
    pub chdir: bool,
    pub permit_nonzero: bool,
}

/// The platform tags [`TaskFactory::create`] recognizes, paired with the
/// backend type each one constructs. Kept as a static registry so
/// [`TaskFactory::recognized_platforms`] and the CLI's help text stay in
/// sync with what `create` actually dispatches on.
pub const TASK_PLATFORMS: &[(&str, &str)] = &[
    ("local", "LocalTask"),
    ("lsf", "LsfTask"),
    ("pbs", "PbsTask"),
    ("slurm", "SlurmTask"),
    ("sge", "SgeTask"),
    ("torque", "TorqueTask"),
];

/// A name-to-constructor registry selecting a [`Task`] implementation by a
/// lowercased platform tag. A zero-sized type whose associated function
/// does the dispatch, rather than a callable value, since Rust has no
/// dynamic module-import equivalent to key off of.
pub struct TaskFactory;

impl TaskFactory {
    /// The platform tags this factory recognizes (case-insensitive).
    pub fn recognized_platforms() -> impl Iterator<Item = &'static str> {
        TASK_PLATFORMS.iter().map(|(tag, _)| *tag)
    }

    /// Construct a [`Task`] for the given platform tag.
    ///
    /// `local` is matched against [`LocalOptions`]; every cluster tag is
    /// matched against the shared [`ClusterOptions`]. Unknown tags fail
    /// with [`PyJobError::UnknownPlatform`].
    pub fn create(
        platform: &str,
        script: impl Into<ScriptInput>,
        directory: Option<PathBuf>,
        nprocesses: Option<usize>,
        local: LocalOptions,
        cluster: ClusterOptions,
    ) -> Result<Box<dyn Task>, PyJobError> {
        let tag = platform.to_lowercase();
        let task: Box<dyn Task> = match tag.as_str() {
            "local" => Box::new(LocalTask::new(
                script,
                directory,
                nprocesses,
                local.chdir,
                local.permit_nonzero,
            )?),
            "lsf" => Box::new(LsfTask::new(script, directory, nprocesses, cluster)?),
            "pbs" => Box::new(PbsTask::new(script, directory, nprocesses, cluster)?),
            "slurm" => Box::new(SlurmTask::new(script, directory, nprocesses, cluster)?),
            "sge" => Box::new(SgeTask::new(script, directory, nprocesses, cluster)?),
            "torque" => Box::new(TorqueTask::new(script, directory, nprocesses, cluster)?),
            other => return Err(PyJobError::UnknownPlatform(other.to_string())),
        };
        tracing::debug!(platform = tag.as_str(), "constructed task via factory");
        Ok(task)
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
