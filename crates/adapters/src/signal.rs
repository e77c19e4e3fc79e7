// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forwards SIGINT/SIGTERM received by the controlling process to the
//! currently-running child, then re-raises the same signal against this
//! process.
//!
//! This is the one place in the workspace where out-of-band control flow
//! is allowed.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::OnceLock;

static ACTIVE_CHILD_PID: AtomicI32 = AtomicI32::new(0);
static INSTALLED: OnceLock<()> = OnceLock::new();

/// Install the process-wide SIGINT/SIGTERM forwarding handler, if it has not
/// already been installed. Safe to call more than once; only the first call
/// takes effect.
pub fn ensure_installed() {
    INSTALLED.get_or_init(|| {
        if let Ok(mut signals) = signal_hook::iterator::Signals::new([
            signal_hook::consts::SIGINT,
            signal_hook::consts::SIGTERM,
        ]) {
            std::thread::spawn(move || {
                for sig in signals.forever() {
                    forward_and_reraise(sig);
                }
            });
        }
    });
}

fn forward_and_reraise(sig: i32) {
    let Ok(signal) = nix::sys::signal::Signal::try_from(sig) else {
        return;
    };
    let pid = ACTIVE_CHILD_PID.load(Ordering::SeqCst);
    if pid != 0 {
        let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), signal);
    }
    // Re-raise against ourselves so the process exits with the conventional
    // 128+signal code instead of looping back into this handler.
    let _ = nix::sys::signal::raise(signal);
}

/// RAII guard registering `pid` as the currently-active child for signal
/// forwarding. Clears the registration on drop.
pub struct ActiveChild {
    previous: i32,
}

impl ActiveChild {
    pub fn register(pid: u32) -> Self {
        let previous = ACTIVE_CHILD_PID.swap(pid as i32, Ordering::SeqCst);
        Self { previous }
    }
}

impl Drop for ActiveChild {
    fn drop(&mut self) {
        ACTIVE_CHILD_PID.store(self.previous, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
