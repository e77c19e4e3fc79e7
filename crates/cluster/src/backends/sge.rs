// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SGE (Sun/Son of Grid Engine) cluster backend.

use crate::common::{self, ClusterCore, ClusterOptions};
use pyjob_adapters::{cexec, CexecOptions};
use pyjob_core::task::{Pid, TaskInfo};
use pyjob_core::{get_time, PyJobError, ScriptInput, Task};
use std::collections::HashSet;
use std::sync::OnceLock;

const DIRECTIVE: &str = "#$";
const ARRAY_INDEX_VAR: &str = "$SGE_TASK_ID";
const ARRAY_OFFSET: i64 = 0;

static AVAILABLE_ENVIRONMENTS: OnceLock<HashSet<String>> = OnceLock::new();
static AVAILABLE_QUEUES: OnceLock<HashSet<String>> = OnceLock::new();

/// Query `qconf -spl` (parallel environments) or `qconf -sql` (queues),
/// caching the result for the lifetime of the process.
fn qconf_list(flag: &str) -> HashSet<String> {
    match cexec(&["qconf".to_string(), flag.to_string()], CexecOptions { permit_nonzero: true, ..Default::default() }) {
        Ok(result) => result.stdout.lines().map(str::to_string).collect(),
        Err(_) => HashSet::new(),
    }
}

fn available_environments() -> &'static HashSet<String> {
    AVAILABLE_ENVIRONMENTS.get_or_init(|| qconf_list("-spl"))
}

fn available_queues() -> &'static HashSet<String> {
    AVAILABLE_QUEUES.get_or_init(|| qconf_list("-sql"))
}

/// A task submitted to a Sun Grid Engine cluster via `qsub`.
pub struct SgeTask {
    cluster: ClusterCore,
}

impl SgeTask {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        common::ensure_exec_available("qstat")?;
        if !options.environment.is_empty() && !available_environments().contains(&options.environment) {
            return Err(PyJobError::RequirementsNotMet(format!(
                "requested environment '{}' is not a recognised SGE parallel environment",
                options.environment
            )));
        }
        if let Some(queue) = &options.queue {
            if !available_queues().contains(queue) {
                return Err(PyJobError::RequirementsNotMet(format!(
                    "requested queue '{queue}' is not a recognised SGE queue"
                )));
            }
        }
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
        let mut runscript = common::new_runscript(&self.cluster.core.directory, "sge")?;
        let opt = &self.cluster.options;

        runscript.append(common::directive(DIRECTIVE, "-V"));
        runscript.append(common::directive(DIRECTIVE, "-w e"));
        runscript.append(common::directive(DIRECTIVE, "-j yes"));
        runscript.append(common::directive(DIRECTIVE, format!("-N {}", opt.name)));
        if !opt.dependency.is_empty() {
            let deps = opt.dependency.iter().map(u64::to_string).collect::<Vec<_>>().join(",");
            runscript.append(common::directive(DIRECTIVE, format!("-hold_jid {deps}")));
        }
        if let Some(priority) = opt.priority {
            runscript.append(common::directive(DIRECTIVE, format!("-p {priority}")));
        }
        if let Some(queue) = &opt.queue {
            runscript.append(common::directive(DIRECTIVE, format!("-q {queue}")));
        }
        if let Some(runtime) = opt.runtime {
            runscript.append(common::directive(DIRECTIVE, format!("-l h_rt={}", get_time(runtime)?)));
        }
        if let Some(shell) = &opt.shell {
            runscript.append(common::directive(DIRECTIVE, format!("-S {}", shell.display())));
        }
        if self.cluster.core.nprocesses > 0 && !opt.environment.is_empty() {
            runscript.append(common::directive(DIRECTIVE, format!("-pe {} {}", opt.environment, self.cluster.core.nprocesses)));
        }
        runscript.append(common::directive(DIRECTIVE, format!("-wd {}", self.cluster.core.directory.display())));
        for extra in &opt.extra {
            runscript.append(common::directive(DIRECTIVE, extra));
        }

        let scripts = self.cluster.core.scripts();
        if scripts.len() > 1 {
            let jobsfile = common::jobs_path(&runscript);
            common::write_jobs_file(&jobsfile, &scripts)?;
            let logf = common::log_path(&runscript);
            runscript.append(common::directive(DIRECTIVE, format!("-t 1-{} -tc {}", scripts.len(), self.cluster.max_array_size())));
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", logf.display())));
            runscript.extend(common::array_bash_extension(ARRAY_INDEX_VAR, &jobsfile, ARRAY_OFFSET)?);
        } else {
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", self.cluster.core.logs()[0].display())));
            runscript.append(scripts[0].to_string_lossy().into_owned());
        }
        Ok(runscript)
    }
}

impl Task for SgeTask {
    fn kind(&self) -> &'static str {
        "SgeTask"
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
        let is_array = self.cluster.core.scripts().len() > 1;
        let mut pid = None;
        for line in result.stdout.lines() {
            let line = line.trim();
            if line.starts_with("Your job") && line.contains("has been submitted") {
                let Some(token) = line.split_whitespace().nth(2) else {
                    continue;
                };
                let token = if is_array { token.split('.').next().unwrap_or(token) } else { token };
                pid = Some(common::parse_leading_number(token)?);
            }
        }
        let pid = pid.ok_or_else(|| {
            PyJobError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("qsub produced no recognisable submission confirmation: {:?}", result.stdout),
            ))
        })?;
        self.cluster.runscript = Some(runscript);
        Ok(pid)
    }

    fn info(&self) -> TaskInfo {
        let mut info = TaskInfo::new();
        let Some(pid) = self.cluster.core.pid() else {
            return info;
        };
        let result = cexec(
            &["qstat".to_string(), "-j".to_string(), pid.to_string()],
            CexecOptions {
                permit_nonzero: true,
                ..Default::default()
            },
        );
        let Ok(result) = result else {
            return info;
        };
        for line in result.stdout.lines() {
            let line = line.trim();
            if line.contains("jobs do not exist") {
                return TaskInfo::new();
            }
            if line.is_empty() || line.chars().all(|c| c == '=') {
                continue;
            }
            if let Some((key, value)) = line.split_once(": ") {
                info.insert(key.trim().to_string(), value.trim().to_string());
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
                tracing::debug!(pid, "terminated SGE task");
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
#[path = "sge_tests.rs"]
mod tests;
