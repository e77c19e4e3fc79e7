// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `pyjob-cluster`: the `ClusterTask` array-job composition logic shared by
//! every batch-system backend (LSF, PBS, Slurm, SGE, Torque), and the five
//! concrete backends themselves.

pub mod backends;
pub mod common;

pub use backends::lsf::LsfTask;
pub use backends::pbs::PbsTask;
pub use backends::sge::SgeTask;
pub use backends::slurm::SlurmTask;
pub use backends::torque::TorqueTask;
pub use common::{ClusterCore, ClusterOptions};
