// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The uniform [`Task`] lifecycle contract shared by every execution
//! backend: `run` → `wait`/`info` → `kill`/natural finish → `close`.

use crate::script::{ScriptCollector, ScriptInput};
use crate::wait::WaitEngine;
use crate::PyJobError;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// An opaque task identifier. For cluster backends this is the batch
/// system's own job number; for the local backend it carries no OS meaning
/// and only needs to be unique within the process.
pub type Pid = u64;

/// A task's info mapping. Always carries `"job_number"` and `"status"` when
/// non-empty; backends may add further keys.
pub type TaskInfo = BTreeMap<String, String>;

/// Fields shared by every [`Task`] implementation: identity, lock state,
/// the owned script collection, and the directory/concurrency knobs common
/// to every backend.
#[derive(Debug)]
pub struct TaskCore {
    pid: Option<Pid>,
    locked: bool,
    script_collector: ScriptCollector,
    pub directory: PathBuf,
    pub nprocesses: usize,
}

impl TaskCore {
    /// Construct a new, unlocked `TaskCore`.
    ///
    /// `directory` defaults to the process's current working directory if
    /// `None`; `nprocesses` defaults to `1`. Both mirror the
    /// `kwarg → config-store → default` fallback chain performed by
    /// higher-level constructors (this struct itself applies no fallback).
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<PathBuf>,
        nprocesses: Option<usize>,
    ) -> Result<Self, PyJobError> {
        let script_collector = ScriptCollector::from_input(script)?;
        let directory = directory
            .map(|d| {
                if d.is_absolute() {
                    d
                } else {
                    std::env::current_dir()
                        .unwrap_or_else(|_| PathBuf::from("."))
                        .join(d)
                }
            })
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        Ok(Self {
            pid: None,
            locked: false,
            script_collector,
            directory,
            nprocesses: nprocesses.unwrap_or(1),
        })
    }

    pub fn pid(&self) -> Option<Pid> {
        self.pid
    }

    pub fn set_pid(&mut self, pid: Pid) {
        self.pid = Some(pid);
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn script_collector(&self) -> &ScriptCollector {
        &self.script_collector
    }

    pub fn scripts(&self) -> Vec<PathBuf> {
        self.script_collector.script_paths()
    }

    pub fn logs(&self) -> Vec<PathBuf> {
        self.script_collector.log_paths()
    }

    /// Add further scripts, provided the task is not yet locked.
    pub fn add_script(&mut self, script: impl Into<ScriptInput>) -> Result<(), PyJobError> {
        if self.locked {
            return Err(PyJobError::TaskLocked);
        }
        self.script_collector.add(script)
    }
}

/// The lifecycle contract every execution backend implements:
/// `New → (run) → Running → (kill | natural finish) → Finished → (close) → Closed`.
///
/// `run`, `completed`, `wait`, and `add_script` are provided in terms of the
/// four backend-specific hooks (`core`/`core_mut`, `submit`, `info`, `kill`,
/// `close`), so each backend only needs to implement how it starts a
/// submission, polls it, and tears it down.
pub trait Task {
    /// A short name for logging (`"LocalTask"`, `"LsfTask"`, ...).
    fn kind(&self) -> &'static str;

    fn core(&self) -> &TaskCore;
    fn core_mut(&mut self) -> &mut TaskCore;

    /// Backend-specific submission. Called once by [`Task::run`] after the
    /// collector has been dumped to disk; returns the backend's pid.
    fn submit(&mut self) -> Result<Pid, PyJobError>;

    /// Backend-specific poll. Must return an empty map when the task is not
    /// running or the backend reports no active record.
    fn info(&self) -> TaskInfo;

    /// Backend-specific termination. Idempotent; safe to call from any
    /// thread/at any lifecycle stage.
    fn kill(&mut self) -> Result<(), PyJobError>;

    /// Backend-specific teardown, invoked after natural completion or a
    /// kill. Idempotent.
    fn close(&mut self) -> Result<(), PyJobError>;

    /// Start execution. Fails with [`PyJobError::EmptyCollection`] if the
    /// collector has no scripts, or [`PyJobError::TaskLocked`] if already
    /// locked. Exactly-once: a second call is always a `TaskLocked` error.
    fn run(&mut self) -> Result<(), PyJobError> {
        if self.core().locked() {
            return Err(PyJobError::TaskLocked);
        }
        if self.core().script_collector().is_empty() {
            return Err(PyJobError::EmptyCollection);
        }
        self.core().script_collector().dump()?;
        let pid = self.submit()?;
        self.core_mut().set_pid(pid);
        self.core_mut().lock();
        tracing::debug!(kind = self.kind(), pid, "started execution");
        Ok(())
    }

    /// `locked ∧ info is empty`.
    fn completed(&self) -> bool {
        self.core().locked() && self.info().is_empty()
    }

    fn scripts(&self) -> Vec<PathBuf> {
        self.core().scripts()
    }

    fn logs(&self) -> Vec<PathBuf> {
        self.core().logs()
    }

    /// Add further scripts, permitted only while not locked.
    fn add_script(&mut self, script: impl Into<ScriptInput>) -> Result<(), PyJobError>
    where
        Self: Sized,
    {
        self.core_mut().add_script(script)
    }

    /// Block until [`Task::completed`], polling via [`WaitEngine`].
    fn wait(
        &mut self,
        interval: Duration,
        monitor_f: Option<&mut dyn FnMut()>,
        success_f: Option<&mut dyn FnMut(&std::path::Path) -> bool>,
    ) -> Result<(), PyJobError> {
        WaitEngine::wait(self, interval, monitor_f, success_f)
    }

    /// Waits for natural completion, then releases backend resources.
    /// Idempotent.
    fn close_after_wait(&mut self) -> Result<(), PyJobError> {
        WaitEngine::wait(self, crate::wait::DEFAULT_INTERVAL, None, None)?;
        self.close()
    }
}
