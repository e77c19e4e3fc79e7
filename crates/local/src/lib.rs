// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `pyjob-local`: [`LocalTask`], the bounded worker-pool backend.
//!
//! Executes every script in the task's collector on the local host, at
//! most `nprocesses` concurrently, capturing each script's combined
//! stdout+stderr into its sibling `.log` file.

use pyjob_adapters::cexec::run_script_to_log;
use pyjob_core::task::{Pid, Task, TaskCore, TaskInfo};
use pyjob_core::{PyJobError, ScriptInput};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

/// A unit of work handed down the local work queue: either a script path
/// to execute, or the sentinel telling the receiving worker to exit.
type QueueItem = Option<PathBuf>;

/// A bounded local worker pool.
///
/// Data structures: a single FIFO work queue (`std::sync::mpsc`, shared by
/// every worker behind an `Arc<Mutex<_>>` since `mpsc::Receiver` is
/// single-consumer by default) and a broadcast cancellation flag
/// (`Arc<AtomicBool>`, monotonic false→true) observed by every worker
/// before each dequeue — never modeled as a channel close.
pub struct LocalTask {
    core: TaskCore,
    chdir: bool,
    permit_nonzero: bool,
    kill_switch: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    killed: bool,
}

impl LocalTask {
    /// Construct a new `LocalTask`.
    ///
    /// `chdir`, when true, runs each script with its own directory as its
    /// cwd instead of the task's shared `directory`. `permit_nonzero` is
    /// forwarded to every invocation of the member scripts.
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<PathBuf>,
        nprocesses: Option<usize>,
        chdir: bool,
        permit_nonzero: bool,
    ) -> Result<Self, PyJobError> {
        Ok(Self {
            core: TaskCore::new(script, directory, nprocesses)?,
            chdir,
            permit_nonzero,
            kill_switch: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
            killed: false,
        })
    }
}

fn worker_loop(
    rx: Arc<Mutex<mpsc::Receiver<QueueItem>>>,
    kill_switch: Arc<AtomicBool>,
    directory: PathBuf,
    chdir: bool,
    permit_nonzero: bool,
) {
    loop {
        let item = {
            let guard = rx.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            guard.recv()
        };
        let script = match item {
            Ok(Some(script)) => script,
            Ok(None) | Err(_) => break,
        };
        // Pending work is dequeued and dropped once the kill switch fires;
        // already-dequeued scripts (this branch, past this check) still
        // run to completion.
        if kill_switch.load(Ordering::SeqCst) {
            continue;
        }
        let cwd = if chdir {
            script
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| directory.clone())
        } else {
            directory.clone()
        };
        let log = script.with_extension("log");
        if let Err(err) = run_script_to_log(&script, &log, &cwd, permit_nonzero) {
            tracing::warn!(script = %script.display(), error = %err, "local script execution failed");
        }
    }
}

impl Task for LocalTask {
    fn kind(&self) -> &'static str {
        "LocalTask"
    }

    fn core(&self) -> &TaskCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TaskCore {
        &mut self.core
    }

    fn submit(&mut self) -> Result<Pid, PyJobError> {
        if self.killed {
            return Ok(pyjob_core::id::next_local_pid());
        }

        let n = self.core.nprocesses.max(1);
        if let Ok(available) = std::thread::available_parallelism() {
            if n > available.get() {
                tracing::warn!(
                    requested = n,
                    available = available.get(),
                    "more processes requested than available CPUs"
                );
            }
        }

        let (tx, rx) = mpsc::channel::<QueueItem>();
        let rx = Arc::new(Mutex::new(rx));

        for _ in 0..n {
            let rx = Arc::clone(&rx);
            let kill_switch = Arc::clone(&self.kill_switch);
            let directory = self.core.directory.clone();
            let chdir = self.chdir;
            let permit_nonzero = self.permit_nonzero;
            self.workers.push(std::thread::spawn(move || {
                worker_loop(rx, kill_switch, directory, chdir, permit_nonzero)
            }));
        }

        for path in self.core.scripts() {
            let _ = tx.send(Some(path));
        }
        for _ in 0..n {
            let _ = tx.send(None);
        }
        drop(tx);

        // Give every worker a moment to start before a caller can observe
        // `info()`/call `kill()`, so a kill immediately after `run()` sees
        // every worker alive rather than racing their startup.
        std::thread::sleep(Duration::from_millis(100));

        Ok(pyjob_core::id::next_local_pid())
    }

    fn info(&self) -> TaskInfo {
        let Some(pid) = self.core.pid() else {
            return TaskInfo::new();
        };
        if self.workers.iter().any(|w| !w.is_finished()) {
            TaskInfo::from([
                ("job_number".to_string(), pid.to_string()),
                ("status".to_string(), "Running".to_string()),
            ])
        } else {
            TaskInfo::new()
        }
    }

    fn kill(&mut self) -> Result<(), PyJobError> {
        if self.killed {
            return Ok(());
        }
        self.kill_switch.store(true, Ordering::SeqCst);
        // Join every worker: already-running children finish on their own
        // (the flag only blocks future dequeues), pending ones drain fast.
        // A thread pool has no `Process::terminate()` equivalent to force-stop
        // a still-running worker; by the time join() returns every worker has
        // already exited, so there is nothing left to force-terminate.
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!(kind = self.kind(), "terminated local task");
        self.killed = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PyJobError> {
        if self.killed {
            return Ok(());
        }
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        self.kill()
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
