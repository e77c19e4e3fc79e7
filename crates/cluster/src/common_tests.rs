// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn max_array_size_defaults_to_script_count() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..3)
        .map(|i| Script::new(dir.path(), "", format!("s{i}"), ".sh").unwrap())
        .collect();
    let core = ClusterCore::new(scripts, Some(dir.path().to_path_buf()), None, ClusterOptions::default()).unwrap();
    assert_eq!(core.max_array_size(), 3);
}

#[test]
fn max_array_size_honors_explicit_override() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..5)
        .map(|i| Script::new(dir.path(), "", format!("s{i}"), ".sh").unwrap())
        .collect();
    let options = ClusterOptions {
        max_array_size: Some(2),
        ..Default::default()
    };
    let core = ClusterCore::new(scripts, Some(dir.path().to_path_buf()), None, options).unwrap();
    assert_eq!(core.max_array_size(), 2);
}

#[test]
fn environment_defaults_to_mpi() {
    assert_eq!(ClusterOptions::default().environment, "mpi");
}

/// Universal invariant #5: jobs file contains exactly N lines, each equal
/// to the corresponding member script path in insertion order.
#[test]
fn write_jobs_file_has_exactly_n_lines_in_order() {
    let dir = tempdir().unwrap();
    let scripts = vec![
        dir.path().join("a.sh"),
        dir.path().join("b.sh"),
        dir.path().join("c.sh"),
    ];
    let jobsfile = dir.path().join("x.jobs");
    write_jobs_file(&jobsfile, &scripts).unwrap();

    let content = std::fs::read_to_string(&jobsfile).unwrap();
    assert!(content.ends_with('\n'));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    for (line, script) in lines.iter().zip(&scripts) {
        assert_eq!(*line, script.to_string_lossy());
    }
}

#[test]
fn array_bash_extension_rejects_negative_offset() {
    let dir = tempdir().unwrap();
    let jobsfile = dir.path().join("x.jobs");
    std::fs::write(&jobsfile, "a\n").unwrap();
    let err = array_bash_extension("$FOO", &jobsfile, -1).unwrap_err();
    assert!(matches!(err, PyJobError::InvalidOffset(-1)));
}

#[test]
fn array_bash_extension_rejects_missing_jobsfile() {
    let dir = tempdir().unwrap();
    let jobsfile = dir.path().join("missing.jobs");
    let err = array_bash_extension("$FOO", &jobsfile, 0).unwrap_err();
    assert!(matches!(err, PyJobError::InvalidJobsFile(_)));
}

#[test]
fn array_bash_extension_rejects_empty_jobsfile() {
    let dir = tempdir().unwrap();
    let jobsfile = dir.path().join("empty.jobs");
    std::fs::write(&jobsfile, "").unwrap();
    let err = array_bash_extension("$FOO", &jobsfile, 0).unwrap_err();
    assert!(matches!(err, PyJobError::InvalidJobsFile(_)));
}

#[test]
fn array_bash_extension_zero_offset_uses_bare_index_var() {
    let dir = tempdir().unwrap();
    let jobsfile = dir.path().join("x.jobs");
    std::fs::write(&jobsfile, "a\n").unwrap();
    let lines = array_bash_extension("$SGE_TASK_ID", &jobsfile, 0).unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        format!("script=$(awk \"NR==$SGE_TASK_ID\" {})", jobsfile.display())
    );
    assert_eq!(
        lines[1],
        "log=$(echo $script | sed \"s/\\.${script##*.}/\\.log/\")"
    );
    assert_eq!(lines[2], "$script > $log 2>&1");
}

#[test]
fn array_bash_extension_positive_offset_wraps_in_arithmetic_expansion() {
    let dir = tempdir().unwrap();
    let jobsfile = dir.path().join("x.jobs");
    std::fs::write(&jobsfile, "a\n").unwrap();
    let lines = array_bash_extension("$LSB_JOBINDEX", &jobsfile, 1).unwrap();
    assert_eq!(
        lines[0],
        format!(
            "script=$(awk \"NR==$(($LSB_JOBINDEX + 1))\" {})",
            jobsfile.display()
        )
    );
}
