// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier generation for runscripts and locally-dispatched tasks.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCAL_PID: AtomicU64 = AtomicU64::new(1);

/// Generate the next opaque pid used by [`LocalTask`](https://docs.rs/pyjob-local).
///
/// These carry no OS meaning (unlike cluster job numbers); they only need to
/// be unique within the lifetime of the current process.
pub fn next_local_pid() -> u64 {
    NEXT_LOCAL_PID.fetch_add(1, Ordering::Relaxed)
}

/// Generate a fresh unique integer identifier, used as the stem of a
/// generated runscript (and its sibling `.jobs`/`.log` files).
///
/// Backed by a UUID so that two processes submitting from the same
/// directory at the same time never collide on a runscript filename.
pub fn unique_stem() -> String {
    uuid::Uuid::new_v4().as_u128().to_string()
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
