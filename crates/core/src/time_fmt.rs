// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime formatting shared by the cluster backends that need an
//! `hh:mm:ss` directive value (SGE's `h_rt`, PBS/Torque's `walltime`).

use crate::PyJobError;

/// Format a positive integer number of minutes as `hh:mm:00`.
///
/// `hh` is `minutes / 60`, zero-padded to at least two digits (more for
/// runtimes beyond 99 hours); `mm` is `minutes % 60`, always two digits;
/// seconds are always `"00"` since the backends this formats for only
/// accept minute-granularity runtimes.
///
/// # Errors
///
/// Returns [`PyJobError::InvalidRuntime`] for a non-positive `minutes`.
pub fn get_time(minutes: i64) -> Result<String, PyJobError> {
    if minutes <= 0 {
        return Err(PyJobError::InvalidRuntime(format!(
            "runtime must be a positive number of minutes, got {minutes}"
        )));
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    Ok(format!("{hours:02}:{mins:02}:00"))
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
