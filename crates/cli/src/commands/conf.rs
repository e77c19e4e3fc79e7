// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pyjob conf KEY:VALUE...` - write key/value pairs into the persistent
//! configuration store; `KEY:None` deletes a key.

use anyhow::{anyhow, Result};
use clap::Args;

use pyjob_config::ConfigStore;

#[derive(Args, Debug)]
pub struct ConfArgs {
    /// KEY:VALUE pairs to write; KEY:None deletes the key
    #[arg(required = true)]
    pub pairs: Vec<String>,
}

fn parse_pair(raw: &str) -> Result<(String, Option<String>)> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("malformed KEY:VALUE pair: {raw:?}"))?;
    let value = if value == "None" { None } else { Some(value.to_string()) };
    Ok((key.to_string(), value))
}

pub fn run(args: ConfArgs) -> Result<i32> {
    let pairs = args
        .pairs
        .iter()
        .map(|raw| parse_pair(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut store = ConfigStore::load()?;
    store.set(&pairs)?;
    Ok(0)
}

#[cfg(test)]
#[path = "conf_tests.rs"]
mod tests;
