// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pyjob_core::Script;
use tempfile::tempdir;

fn member_script(dir: &std::path::Path, stem: &str) -> Script {
    let mut s = Script::new(dir, "", stem, ".sh").unwrap();
    s.append("true");
    s
}

/// S4: cluster array runscript — LSF.
#[test]
fn array_runscript_matches_scenario_bit_exact() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..3).map(|i| member_script(dir.path(), &format!("m{i}"))).collect();

    let options = ClusterOptions {
        max_array_size: Some(3),
        name: "pyjob".to_string(),
        ..Default::default()
    };
    let task = LsfTask::new_unchecked(scripts, Some(dir.path().to_path_buf()), Some(1), options).unwrap();
    let runscript = task.runscript_preview().unwrap();

    let jobsfile = common::jobs_path(&runscript);
    let logfile = common::log_path(&runscript);
    let expected = vec![
        format!("#BSUB -cwd {}", dir.path().display()),
        "#BSUB -R \"span[ptile=1]\"".to_string(),
        "#BSUB -J pyjob[1-3]%3".to_string(),
        format!("#BSUB -o {}", logfile.display()),
        format!("script=$(awk \"NR==$(($LSB_JOBINDEX + 1))\" {})", jobsfile.display()),
        "log=$(echo $script | sed \"s/\\.${script##*.}/\\.log/\")".to_string(),
        "$script > $log 2>&1".to_string(),
    ];
    assert_eq!(runscript.body(), expected.as_slice());
}

#[test]
fn single_script_runscript_appends_path_verbatim() {
    let dir = tempdir().unwrap();
    let script = member_script(dir.path(), "only");
    let script_path = script.path();

    let task = LsfTask::new_unchecked(script, Some(dir.path().to_path_buf()), Some(1), ClusterOptions::default()).unwrap();
    let runscript = task.runscript_preview().unwrap();

    assert_eq!(runscript.body().last().unwrap(), &script_path.to_string_lossy());
}

#[test]
fn dependency_directive_is_emitted_first() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..2).map(|i| member_script(dir.path(), &format!("m{i}"))).collect();
    let options = ClusterOptions {
        dependency: vec![10, 20],
        ..Default::default()
    };
    let task = LsfTask::new_unchecked(scripts, Some(dir.path().to_path_buf()), Some(1), options).unwrap();
    let runscript = task.runscript_preview().unwrap();
    assert_eq!(runscript.body()[0], "#BSUB -w deps(10) && deps(20)");
}
