// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pyjob exec` - construct a `TaskFactory(PLATFORM)` task from the given
//! scripts, run it, and wait for completion.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use pyjob::{ClusterOptions, LocalOptions, Task, TaskFactory};
use pyjob_config::{fallback, ConfigFields, ConfigStore};

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Working directory for the submitted scripts
    #[arg(short = 'd', long = "directory")]
    pub directory: Option<PathBuf>,

    /// Execution backend: local, lsf, pbs, slurm, sge, torque
    #[arg(short = 'p', long = "platform")]
    pub platform: Option<String>,

    /// Number of local worker processes / cluster procs-per-host
    #[arg(short = 't', long = "processes")]
    pub processes: Option<usize>,

    /// Run each script with its own directory as its cwd (local backend only)
    #[arg(long = "chdir")]
    pub chdir: bool,

    /// Do not treat a non-zero child exit as an error
    #[arg(long = "permit-nonzero")]
    pub permit_nonzero: bool,

    /// Scripts to submit, in order
    #[arg(required = true, trailing_var_arg = true)]
    pub scripts: Vec<String>,
}

pub fn run(args: ExecArgs) -> Result<i32> {
    let fields: ConfigFields = ConfigStore::load()
        .map(|store| store.fields().clone())
        .unwrap_or_else(|err| {
            tracing::warn!(%err, "could not load configuration store; continuing with defaults");
            ConfigFields::default()
        });

    let platform = fallback(args.platform.clone(), fields.platform.clone(), "local".to_string());
    let processes = fallback(args.processes, fields.processes, 1);
    let directory = args.directory.clone().or_else(|| fields.directory.clone());

    let local = LocalOptions {
        chdir: args.chdir,
        permit_nonzero: args.permit_nonzero,
    };
    let cluster = ClusterOptions {
        queue: fields.queue.clone(),
        runtime: fields.runtime,
        shell: fields.shell.clone(),
        name: fields.name.clone().unwrap_or_else(|| "pyjob".to_string()),
        environment: fields.environment.clone().unwrap_or_else(|| "mpi".to_string()),
        max_array_size: fields.max_array_size,
        cleanup: fields.cleanup.unwrap_or(false),
        ..ClusterOptions::default()
    };

    let mut task = TaskFactory::create(
        &platform,
        args.scripts.clone(),
        directory,
        Some(processes),
        local,
        cluster,
    )?;

    task.run()?;
    task.wait(std::time::Duration::from_secs(30), None, None)?;
    task.close()?;

    Ok(0)
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
