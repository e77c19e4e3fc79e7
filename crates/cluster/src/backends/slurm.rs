// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slurm cluster backend.

use crate::common::{self, ClusterCore, ClusterOptions};
use pyjob_adapters::{cexec, CexecOptions};
use pyjob_core::task::{Pid, TaskInfo};
use pyjob_core::{PyJobError, ScriptInput, Task};

const DIRECTIVE: &str = "#SBATCH";
const ARRAY_INDEX_VAR: &str = "$SLURM_ARRAY_TASK_ID";
const ARRAY_OFFSET: i64 = 0;

/// A task submitted to a Slurm cluster via `sbatch`.
pub struct SlurmTask {
    cluster: ClusterCore,
}

impl SlurmTask {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        common::ensure_exec_available("squeue")?;
        Self::new_unchecked(script, directory, nprocesses, options)
    }

    pub(crate) fn new_unchecked(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        Ok(Self {
            cluster: ClusterCore::new(script, directory, nprocesses, options)?,
        })
    }

    pub(crate) fn runscript_preview(&self) -> Result<pyjob_core::Script, PyJobError> {
        self.build_runscript()
    }

    fn build_runscript(&self) -> Result<pyjob_core::Script, PyJobError> {
        let mut runscript = common::new_runscript(&self.cluster.core.directory, "slurm")?;
        let opt = &self.cluster.options;

        runscript.append(common::directive(DIRECTIVE, "--export=ALL"));
        runscript.append(common::directive(DIRECTIVE, format!("--job-name={}", opt.name)));
        if !opt.dependency.is_empty() {
            let deps = opt.dependency.iter().map(u64::to_string).collect::<Vec<_>>().join(":");
            runscript.append(common::directive(DIRECTIVE, format!("--depend=afterok:{deps}")));
        }
        if let Some(queue) = &opt.queue {
            runscript.append(common::directive(DIRECTIVE, format!("-p {queue}")));
        }
        if self.cluster.core.nprocesses > 0 {
            runscript.append(common::directive(DIRECTIVE, format!("-n {}", self.cluster.core.nprocesses)));
        }
        runscript.append(common::directive(DIRECTIVE, format!("--workdir={}", self.cluster.core.directory.display())));
        if let Some(runtime) = opt.runtime {
            runscript.append(common::directive(DIRECTIVE, format!("-t {runtime}")));
        }
        for extra in &opt.extra {
            runscript.append(common::directive(DIRECTIVE, extra));
        }

        let scripts = self.cluster.core.scripts();
        if scripts.len() > 1 {
            let jobsfile = common::jobs_path(&runscript);
            common::write_jobs_file(&jobsfile, &scripts)?;
            let logf = common::log_path(&runscript);
            runscript.append(common::directive(DIRECTIVE, format!("--array=1-{}%{}", scripts.len(), self.cluster.max_array_size())));
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", logf.display())));
            runscript.extend(common::array_bash_extension(ARRAY_INDEX_VAR, &jobsfile, ARRAY_OFFSET)?);
        } else {
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", self.cluster.core.logs()[0].display())));
            runscript.append(scripts[0].to_string_lossy().into_owned());
        }
        Ok(runscript)
    }
}

impl Task for SlurmTask {
    fn kind(&self) -> &'static str {
        "SlurmTask"
    }

    fn core(&self) -> &pyjob_core::TaskCore {
        &self.cluster.core
    }

    fn core_mut(&mut self) -> &mut pyjob_core::TaskCore {
        &mut self.cluster.core
    }

    fn submit(&mut self) -> Result<Pid, PyJobError> {
        let runscript = self.build_runscript()?;
        runscript.write()?;
        let result = cexec(
            &["sbatch".to_string(), runscript.path().to_string_lossy().into_owned()],
            CexecOptions {
                cwd: Some(self.cluster.core.directory.clone()),
                ..Default::default()
            },
        )?;
        let token = result.stdout.split_whitespace().last().unwrap_or("");
        let pid = common::parse_leading_number(token)?;
        self.cluster.runscript = Some(runscript);
        Ok(pid)
    }

    /// Unlike the other backends, any `squeue` failure, not just an absent
    /// executable, is treated as "no active record" here.
    fn info(&self) -> TaskInfo {
        let mut info = TaskInfo::new();
        let Some(pid) = self.cluster.core.pid() else {
            return info;
        };
        match cexec(&["squeue".to_string(), "-j".to_string(), pid.to_string()], CexecOptions::default()) {
            Err(_) => info,
            Ok(_) => {
                info.insert("job_number".to_string(), pid.to_string());
                info.insert("status".to_string(), "Running".to_string());
                info
            }
        }
    }

    fn kill(&mut self) -> Result<(), PyJobError> {
        let Some(pid) = self.cluster.core.pid() else {
            return Ok(());
        };
        match cexec(&["scancel".to_string(), pid.to_string()], CexecOptions::default()) {
            Ok(_) => {
                tracing::debug!(pid, "terminated Slurm task");
                Ok(())
            }
            Err(PyJobError::ExecutableNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) -> Result<(), PyJobError> {
        common::close_cluster(&mut self.cluster)
    }
}

#[cfg(test)]
#[path = "slurm_tests.rs"]
mod tests;
