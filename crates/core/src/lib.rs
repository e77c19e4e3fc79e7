// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pyjob-core: the Task lifecycle, Script/ScriptCollector, error taxonomy and
//! wait/poll engine shared by every execution backend.

pub mod error;
pub mod id;
pub mod script;
pub mod task;
pub mod time_fmt;
pub mod wait;

pub use error::PyJobError;
pub use script::{Script, ScriptCollector, ScriptInput};
pub use task::{Pid, Task, TaskCore, TaskInfo};
pub use time_fmt::get_time;
pub use wait::WaitEngine;
