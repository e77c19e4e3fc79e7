// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A minimal mirror of the UNIX `which` command, used to turn
//! [`PyJobError::ExecutableNotFound`](pyjob_core::PyJobError::ExecutableNotFound)
//! into a synchronous, dependency-free check before a command is spawned.

use std::path::{Path, PathBuf};

fn is_exe(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path)
            .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Resolve `executable` to an absolute path by searching `PATH`, the way
/// `cexec`'s submission calls resolve `bjobs`/`qsub`/`sbatch`/etc. before
/// spawning them.
///
/// Returns `None` if `executable` contains no path separator and is not
/// found in any `PATH` entry, or if it is a bare path that is not an
/// executable file.
pub fn which(executable: &str) -> Option<PathBuf> {
    let candidate = Path::new(executable);
    if candidate.components().count() > 1 || executable.contains(std::path::MAIN_SEPARATOR) {
        return is_exe(candidate).then(|| candidate.to_path_buf());
    }
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(executable))
        .find(|candidate| is_exe(candidate))
}

#[cfg(test)]
#[path = "which_tests.rs"]
mod tests;
