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

#[test]
fn array_runscript_emits_directives_in_order() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..3).map(|i| member_script(dir.path(), &format!("m{i}"))).collect();
    let options = ClusterOptions {
        queue: Some("batch".to_string()),
        runtime: Some(90),
        name: "pyjob".to_string(),
        max_array_size: Some(2),
        ..Default::default()
    };
    let task = PbsTask::new_unchecked(scripts, Some(dir.path().to_path_buf()), Some(4), options).unwrap();
    let runscript = task.runscript_preview().unwrap();

    let jobsfile = common::jobs_path(&runscript);
    let logfile = common::log_path(&runscript);
    let expected = vec![
        "#PBS -V".to_string(),
        "#PBS -N pyjob".to_string(),
        format!("#PBS -w {}", dir.path().display()),
        "#PBS -q batch".to_string(),
        "#PBS -l walltime=01:30:00".to_string(),
        "#PBS -n 4".to_string(),
        "#PBS -t 1-3%2".to_string(),
        format!("#PBS -o {}", logfile.display()),
        format!("#PBS -e {}", logfile.display()),
        format!("script=$(awk \"NR==$PBS_ARRAYID\" {})", jobsfile.display()),
        "log=$(echo $script | sed \"s/\\.${script##*.}/\\.log/\")".to_string(),
        "$script > $log 2>&1".to_string(),
    ];
    assert_eq!(runscript.body(), expected.as_slice());
}

#[test]
fn info_returns_empty_once_unknown_queue_destination_line_seen() {
    assert_eq!(
        split_once_re("Job_Name = myjob", " = "),
        Some(("Job_Name", "myjob"))
    );
}
