// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LSF (Load Sharing Facility) cluster backend.

use crate::common::{self, ClusterCore, ClusterOptions};
use pyjob_adapters::{cexec, CexecOptions, Stdout};
use pyjob_core::task::{Pid, TaskInfo};
use pyjob_core::{PyJobError, ScriptInput, Task};
use std::time::Duration;

const DIRECTIVE: &str = "#BSUB";
const ARRAY_INDEX_VAR: &str = "$LSB_JOBINDEX";
const ARRAY_OFFSET: i64 = 1;

/// A task submitted to an LSF cluster via `bsub`.
pub struct LsfTask {
    cluster: ClusterCore,
}

impl LsfTask {
    pub fn new(
        script: impl Into<ScriptInput>,
        directory: Option<std::path::PathBuf>,
        nprocesses: Option<usize>,
        options: ClusterOptions,
    ) -> Result<Self, PyJobError> {
        common::ensure_exec_available("bjobs")?;
        Self::new_unchecked(script, directory, nprocesses, options)
    }

    /// Construct without the `bjobs`-on-`PATH` requirements check, for
    /// exercising runscript generation in environments without a live LSF
    /// installation.
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

    /// Build the runscript without writing it to disk or submitting it.
    pub(crate) fn runscript_preview(&self) -> Result<pyjob_core::Script, PyJobError> {
        self.build_runscript()
    }

    fn build_runscript(&self) -> Result<pyjob_core::Script, PyJobError> {
        let mut runscript = common::new_runscript(&self.cluster.core.directory, "lsf")?;
        let opt = &self.cluster.options;

        if !opt.dependency.is_empty() {
            let deps = opt.dependency.iter().map(|d| format!("deps({d})")).collect::<Vec<_>>().join(" && ");
            runscript.append(common::directive(DIRECTIVE, format!("-w {deps}")));
        }
        runscript.append(common::directive(DIRECTIVE, format!("-cwd {}", self.cluster.core.directory.display())));
        if let Some(priority) = opt.priority {
            runscript.append(common::directive(DIRECTIVE, format!("-sp {priority}")));
        }
        if let Some(queue) = &opt.queue {
            runscript.append(common::directive(DIRECTIVE, format!("-q {queue}")));
        }
        if let Some(runtime) = opt.runtime {
            runscript.append(common::directive(DIRECTIVE, format!("-W {runtime}")));
        }
        if let Some(shell) = &opt.shell {
            runscript.append(common::directive(DIRECTIVE, format!("-L {}", shell.display())));
        }
        if self.cluster.core.nprocesses > 0 {
            runscript.append(common::directive(DIRECTIVE, format!("-R \"span[ptile={}]\"", self.cluster.core.nprocesses)));
        }
        for extra in &opt.extra {
            runscript.append(common::directive(DIRECTIVE, extra));
        }

        let scripts = self.cluster.core.scripts();
        if scripts.len() > 1 {
            let jobsfile = common::jobs_path(&runscript);
            common::write_jobs_file(&jobsfile, &scripts)?;
            let logf = common::log_path(&runscript);
            runscript.append(common::directive(
                DIRECTIVE,
                format!("-J {}[1-{}]%{}", opt.name, scripts.len(), self.cluster.max_array_size()),
            ));
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", logf.display())));
            runscript.extend(common::array_bash_extension(ARRAY_INDEX_VAR, &jobsfile, ARRAY_OFFSET)?);
        } else {
            runscript.append(common::directive(DIRECTIVE, format!("-J {}", opt.name)));
            runscript.append(common::directive(DIRECTIVE, format!("-o {}", self.cluster.core.logs()[0].display())));
            runscript.append(scripts[0].to_string_lossy().into_owned());
        }
        Ok(runscript)
    }
}

impl Task for LsfTask {
    fn kind(&self) -> &'static str {
        "LsfTask"
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
            &["bsub".to_string()],
            CexecOptions {
                cwd: Some(self.cluster.core.directory.clone()),
                stdin: Some(runscript.content()),
                stdout: Stdout::Capture,
                permit_nonzero: false,
            },
        )?;
        // Confirmation line looks like: "Job <123> is submitted to default queue..."
        let token = result
            .stdout
            .split_whitespace()
            .nth(1)
            .unwrap_or("")
            .trim_start_matches('<')
            .trim_end_matches('>');
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
            &["bjobs".to_string(), "-l".to_string(), pid.to_string()],
            CexecOptions {
                permit_nonzero: true,
                ..Default::default()
            },
        );
        match result {
            Err(_) => info,
            Ok(result) => {
                if result.stdout.contains("Done successfully") {
                    info
                } else {
                    info.insert("job_number".to_string(), pid.to_string());
                    info.insert("status".to_string(), "Running".to_string());
                    info
                }
            }
        }
    }

    fn kill(&mut self) -> Result<(), PyJobError> {
        let Some(pid) = self.cluster.core.pid() else {
            return Ok(());
        };
        let pid_str = pid.to_string();
        let bkill = |args: &[&str]| {
            let mut command = vec!["bkill".to_string()];
            command.extend(args.iter().map(|s| s.to_string()));
            cexec(
                &command,
                CexecOptions {
                    permit_nonzero: true,
                    ..Default::default()
                },
            )
        };
        let mut result = bkill(&[pid_str.as_str()])?;
        if result.stdout.contains("is in progress") {
            result = bkill(&["-b", pid_str.as_str()])?;
            std::thread::sleep(Duration::from_secs(10));
        }
        let terminated = ["has already finished", "is being terminated", "is in progress"]
            .iter()
            .any(|needle| result.stdout.contains(needle));
        if terminated {
            tracing::debug!(pid, "terminated LSF task");
            Ok(())
        } else {
            Err(PyJobError::CannotDelete(result.stdout))
        }
    }

    fn close(&mut self) -> Result<(), PyJobError> {
        common::close_cluster(&mut self.cluster)
    }
}

#[cfg(test)]
#[path = "lsf_tests.rs"]
mod tests;
