// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! PBS (Portable Batch System) cluster backend. Torque is textually
//! identical in every directive, submission, kill, and info detail; see
//! [`crate::backends::torque`].

use crate::common::{self, ClusterCore, ClusterOptions};
use pyjob_adapters::{cexec, CexecOptions};
use pyjob_core::task::{Pid, TaskInfo};
use pyjob_core::{get_time, PyJobError, ScriptInput, Task};

const ARRAY_INDEX_VAR: &str = "$PBS_ARRAYID";
const ARRAY_OFFSET: i64 = 0;

/// A task submitted to a PBS cluster via `qsub`.
pub struct PbsTask {
    cluster: ClusterCore,
    directive: &'static str,
    runscript_prefix: &'static str,
}

impl PbsTask {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        common::ensure_exec_available("qstat")?;
        Self::new_unchecked(script, directory, nprocesses, options)
    }

    pub(crate) fn new_unchecked(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        Self::new_with_prefix(script, directory, nprocesses, options, "pbs")
    }

    /// Construct with a custom runscript filename prefix, so [`crate::backends::torque::TorqueTask`]
    /// can reuse this implementation while generating distinguishable
    /// `torque_*.script` filenames.
    pub(crate) fn new_with_prefix(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
        prefix: &'static str,
    ) -> Result<Self, PyJobError> {
        Ok(Self {
            cluster: ClusterCore::new(script, directory, nprocesses, options)?,
            directive: "#PBS",
            runscript_prefix: prefix,
        })
    }

    pub(crate) fn runscript_preview(&self) -> Result<pyjob_core::Script, PyJobError> {
        self.build_runscript()
    }

    fn build_runscript(&self) -> Result<pyjob_core::Script, PyJobError> {
        let mut runscript = common::new_runscript(&self.cluster.core.directory, self.runscript_prefix)?;
        let opt = &self.cluster.options;
        let directive = self.directive;

        runscript.append(common::directive(directive, "-V"));
        runscript.append(common::directive(directive, format!("-N {}", opt.name)));
        runscript.append(common::directive(directive, format!("-w {}", self.cluster.core.directory.display())));
        if let Some(priority) = opt.priority {
            runscript.append(common::directive(directive, format!("-p {priority}")));
        }
        if let Some(queue) = &opt.queue {
            runscript.append(common::directive(directive, format!("-q {queue}")));
        }
        if let Some(runtime) = opt.runtime {
            runscript.append(common::directive(directive, format!("-l walltime={}", get_time(runtime)?)));
        }
        if let Some(shell) = &opt.shell {
            runscript.append(common::directive(directive, format!("-S {}", shell.display())));
        }
        if self.cluster.core.nprocesses > 0 {
            runscript.append(common::directive(directive, format!("-n {}", self.cluster.core.nprocesses)));
        }
        for extra in &opt.extra {
            runscript.append(common::directive(directive, extra));
        }

        let scripts = self.cluster.core.scripts();
        if scripts.len() > 1 {
            let jobsfile = common::jobs_path(&runscript);
            common::write_jobs_file(&jobsfile, &scripts)?;
            let logf = common::log_path(&runscript);
            runscript.append(common::directive(directive, format!("-t 1-{}%{}", scripts.len(), self.cluster.max_array_size())));
            runscript.append(common::directive(directive, format!("-o {}", logf.display())));
            runscript.append(common::directive(directive, format!("-e {}", logf.display())));
            runscript.extend(common::array_bash_extension(ARRAY_INDEX_VAR, &jobsfile, ARRAY_OFFSET)?);
        } else {
            let logf = &self.cluster.core.logs()[0];
            runscript.append(common::directive(directive, format!("-o {}", logf.display())));
            runscript.append(common::directive(directive, format!("-e {}", logf.display())));
            runscript.append(scripts[0].to_string_lossy().into_owned());
        }
        Ok(runscript)
    }
}

impl Task for PbsTask {
    fn kind(&self) -> &'static str {
        "PbsTask"
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
            &["qsub".to_string(), runscript.path().to_string_lossy().into_owned()],
            CexecOptions {
                cwd: Some(self.cluster.core.directory.clone()),
                ..Default::default()
            },
        )?;
        let token = result.stdout.split_whitespace().next().unwrap_or("");
        let pid = common::parse_leading_number(token)?;
        self.cluster.runscript = Some(runscript);
        Ok(pid)
    }

    fn info(&self) -> TaskInfo {
        let mut info = TaskInfo::new();
        let Some(pid) = self.cluster.core.pid() else {
            return info;
        };
        let result = cexec(
            &["qstat".to_string(), "-f".to_string(), pid.to_string()],
            CexecOptions {
                permit_nonzero: true,
                ..Default::default()
            },
        );
        let Ok(result) = result else {
            return info;
        };
        let lines: Vec<&str> = result.stdout.lines().collect();
        let Some(first) = lines.first() else {
            return info;
        };
        if let Some((key, value)) = split_once_re(*first, ": ") {
            info.insert(key.to_string(), value.to_string());
        }
        for line in &lines[1..] {
            let line = line.trim();
            if line.contains("Unknown queue destination") {
                return TaskInfo::new();
            }
            if let Some((key, value)) = split_once_re(line, " = ") {
                info.insert(key.to_string(), value.to_string());
            }
        }
        if info.is_empty() {
            return info;
        }
        info.entry("job_number".to_string()).or_insert_with(|| pid.to_string());
        info.entry("status".to_string()).or_insert_with(|| "Running".to_string());
        info
    }

    fn kill(&mut self) -> Result<(), PyJobError> {
        let Some(pid) = self.cluster.core.pid() else {
            return Ok(());
        };
        match cexec(&["qdel".to_string(), pid.to_string()], CexecOptions::default()) {
            Ok(_) => {
                tracing::debug!(pid, "terminated PBS task");
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

/// Split on the first occurrence of `sep`, trimming surrounding whitespace
/// from both halves, without pulling in a regex dependency for it.
fn split_once_re(line: &str, sep: &str) -> Option<(&str, &str)> {
    line.split_once(sep).map(|(k, v)| (k.trim(), v.trim()))
}

#[cfg(test)]
#[path = "pbs_tests.rs"]
mod tests;
