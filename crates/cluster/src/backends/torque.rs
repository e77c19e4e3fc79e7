// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Torque cluster backend. Textually identical to PBS in every directive,
//! submission, kill, and info detail; implemented as a thin wrapper so the
//! two never drift apart.

use super::pbs::PbsTask;
use pyjob_core::task::{Pid, TaskInfo};
use pyjob_core::{PyJobError, ScriptInput, Task};

/// A task submitted to a Torque cluster via `qsub`.
pub struct TorqueTask(PbsTask);

impl TorqueTask {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: crate::common::ClusterOptions,
    ) -> Result<Self, PyJobError> {
        crate::common::ensure_exec_available("qstat")?;
        Ok(Self(PbsTask::new_with_prefix(script, directory, nprocesses, options, "torque")?))
    }

    pub(crate) fn new_unchecked(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: crate::common::ClusterOptions,
    ) -> Result<Self, PyJobError> {
        Ok(Self(PbsTask::new_with_prefix(script, directory, nprocesses, options, "torque")?))
    }

    pub(crate) fn runscript_preview(&self) -> Result<pyjob_core::Script, PyJobError> {
        self.0.runscript_preview()
    }
}

impl Task for TorqueTask {
    fn kind(&self) -> &'static str {
        "TorqueTask"
    }

    fn core(&self) -> &pyjob_core::TaskCore {
        self.0.core()
    }

    fn core_mut(&mut self) -> &mut pyjob_core::TaskCore {
        self.0.core_mut()
    }

    fn submit(&mut self) -> Result<Pid, PyJobError> {
        self.0.submit()
    }

    fn info(&self) -> TaskInfo {
        self.0.info()
    }

    fn kill(&mut self) -> Result<(), PyJobError> {
        self.0.kill()
    }

    fn close(&mut self) -> Result<(), PyJobError> {
        self.0.close()
    }
}

#[cfg(test)]
#[path = "torque_tests.rs"]
mod tests;
