// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The polling loop shared by every [`Task`](crate::Task): sleep, invoke a
//! monitor callback, evaluate a success predicate against each log file,
//! and cancel the task early when the predicate fires.

use crate::task::Task;
use crate::PyJobError;
use std::path::Path;
use std::time::Duration;

/// The default poll interval used when a caller invokes
/// [`Task::close_after_wait`](crate::Task::close_after_wait).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Stateless holder for the shared `wait()` loop. Every backend reaches it
/// through [`Task::wait`](crate::Task::wait) rather than calling this
/// directly.
pub struct WaitEngine;

impl WaitEngine {
    /// Loop until `task.completed()`. Each cycle: evaluate `success_f`
    /// against every log path that currently exists on disk (killing the
    /// task and continuing to the next cycle if any invocation returns
    /// `true`), invoke `monitor_f`, then sleep for `interval`.
    ///
    /// Callbacks are invoked from the caller's thread; an error raised by
    /// `kill()` propagates immediately, but the callbacks themselves
    /// return no `Result` and so cannot fail this loop directly.
    pub fn wait<T: Task + ?Sized>(
        task: &mut T,
        interval: Duration,
        mut monitor_f: Option<&mut dyn FnMut()>,
        mut success_f: Option<&mut dyn FnMut(&Path) -> bool>,
    ) -> Result<(), PyJobError> {
        while !task.completed() {
            if let Some(success) = success_f.as_deref_mut() {
                let mut should_kill = false;
                for log in task.logs() {
                    if log.exists() && success(&log) {
                        should_kill = true;
                        break;
                    }
                }
                if should_kill {
                    task.kill()?;
                    continue;
                }
            }
            if let Some(monitor) = monitor_f.as_deref_mut() {
                monitor();
            }
            std::thread::sleep(interval);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
