// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::common::ClusterOptions;
use pyjob_core::Script;
use tempfile::tempdir;

#[test]
fn runscript_uses_pbs_directive_prefix_with_torque_filename() {
    let dir = tempdir().unwrap();
    let mut script = Script::new(dir.path(), "", "only", ".sh").unwrap();
    script.append("true");

    let task = TorqueTask::new_unchecked(script, Some(dir.path().to_path_buf()), Some(1), ClusterOptions::default()).unwrap();
    let runscript = task.runscript_preview().unwrap();

    assert!(runscript.path().file_name().unwrap().to_string_lossy().starts_with("torque_"));
    assert!(runscript.body().iter().all(|line| !line.starts_with("#SBATCH") && !line.starts_with("#BSUB")));
    assert!(runscript.body().iter().any(|line| line.starts_with("#PBS")));
}

#[test]
fn kind_reports_torque_task() {
    let dir = tempdir().unwrap();
    let mut script = Script::new(dir.path(), "", "only", ".sh").unwrap();
    script.append("true");
    let task = TorqueTask::new_unchecked(script, Some(dir.path().to_path_buf()), Some(1), ClusterOptions::default()).unwrap();
    assert_eq!(task.kind(), "TorqueTask");
}
