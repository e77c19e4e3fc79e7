// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pyjob - cross-platform job dispatch CLI

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{conf, exec};

#[derive(Parser)]
#[command(
    name = "pyjob",
    version,
    about = "Submit and track scripts across a local worker pool or a cluster batch system"
)]
struct Cli {
    /// Increase logging verbosity (info -> debug -> trace); repeatable
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit scripts through a TaskFactory-selected backend and wait for completion
    Exec(exec::ExecArgs),
    /// Read or write the persistent configuration store
    Conf(conf::ConfArgs),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("pyjob={level}")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    pyjob_adapters::signal::ensure_installed();

    let result = match cli.command {
        Commands::Exec(args) => exec::run(args),
        Commands::Conf(args) => conf::run(args),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("pyjob: {err:#}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
