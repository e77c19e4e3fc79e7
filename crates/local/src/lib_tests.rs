// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pyjob_core::script::Script;
use std::time::Duration;
use tempfile::tempdir;

fn script_printing(dir: &Path, stem: &str, text: &str) -> Script {
    let mut s = Script::new(dir, "", stem, ".sh").unwrap();
    s.append(format!("echo {text}"));
    s
}

fn script_sleeping(dir: &Path, stem: &str, seconds: u32) -> Script {
    let mut s = Script::new(dir, "", stem, ".sh").unwrap();
    s.append(format!("sleep {seconds}"));
    s
}

/// S1: local single-script success.
#[test]
fn single_script_success() {
    let dir = tempdir().unwrap();
    let script = script_printing(dir.path(), "t", "ok");
    let mut task = LocalTask::new(script.clone(), Some(dir.path().to_path_buf()), Some(1), false, false).unwrap();

    task.run().unwrap();
    task.wait(Duration::from_millis(10), None, None).unwrap();
    task.close().unwrap();

    assert!(task.completed());
    assert!(task.info().is_empty());
    assert_eq!(std::fs::read_to_string(script.log_path()).unwrap(), "ok\n");
}

/// S2: local four-script fan-out — every log exists with exactly its own
/// single-digit output, nprocesses=2 < 4 scripts.
#[test]
fn four_script_fan_out_produces_isolated_logs() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..4)
        .map(|i| script_printing(dir.path(), &format!("s{i}"), &i.to_string()))
        .collect();
    let logs: Vec<_> = scripts.iter().map(Script::log_path).collect();

    let mut task = LocalTask::new(scripts, Some(dir.path().to_path_buf()), Some(2), false, false).unwrap();
    task.run().unwrap();
    task.wait(Duration::from_millis(10), None, None).unwrap();
    task.close().unwrap();

    for (i, log) in logs.iter().enumerate() {
        assert!(log.exists());
        assert_eq!(std::fs::read_to_string(log).unwrap(), format!("{i}\n"));
    }
}

/// S3: kill shortly after run with many long scripts drops most pending work.
#[test]
fn kill_drops_pending_scripts() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..20)
        .map(|i| script_sleeping(dir.path(), &format!("s{i}"), 2))
        .collect();
    let script_paths: Vec<_> = scripts.iter().map(Script::path).collect();
    let logs: Vec<_> = scripts.iter().map(Script::log_path).collect();

    let mut task = LocalTask::new(scripts, Some(dir.path().to_path_buf()), Some(2), false, false).unwrap();
    task.run().unwrap();
    std::thread::sleep(Duration::from_millis(200));
    task.kill().unwrap();

    let existing = logs.iter().filter(|l| l.exists()).count();
    assert!(existing <= 2, "expected at most nprocesses logs, got {existing}");
    for path in &script_paths {
        assert!(path.exists(), "member scripts must remain on disk after kill");
    }
    assert!(task.completed());
}

#[test]
fn kill_is_idempotent() {
    let dir = tempdir().unwrap();
    let script = script_printing(dir.path(), "t", "ok");
    let mut task = LocalTask::new(script, Some(dir.path().to_path_buf()), Some(1), false, false).unwrap();
    task.run().unwrap();
    task.kill().unwrap();
    task.kill().unwrap();
}

#[test]
fn logs_and_scripts_counts_match() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = (0..3)
        .map(|i| script_printing(dir.path(), &format!("m{i}"), "x"))
        .collect();
    let mut task = LocalTask::new(scripts, Some(dir.path().to_path_buf()), Some(2), false, false).unwrap();
    task.run().unwrap();
    task.wait(Duration::from_millis(10), None, None).unwrap();
    task.close().unwrap();
    assert_eq!(task.logs().len(), task.scripts().len());
    for log in task.logs() {
        assert!(log.exists());
    }
}

#[test]
fn close_waits_for_every_worker_before_returning() {
    let dir = tempdir().unwrap();
    let script = script_sleeping(dir.path(), "slow", 1);
    let log = script.log_path();
    let mut task = LocalTask::new(script, Some(dir.path().to_path_buf()), Some(1), false, false).unwrap();
    task.run().unwrap();
    task.close().unwrap();
    assert!(log.exists());
    assert!(task.completed());
}

#[test]
fn warns_but_does_not_fail_when_nprocesses_exceeds_cpu_count() {
    let dir = tempdir().unwrap();
    let script = script_printing(dir.path(), "t", "ok");
    let huge = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1) + 64;
    let mut task = LocalTask::new(script, Some(dir.path().to_path_buf()), Some(huge), false, false).unwrap();
    task.run().unwrap();
    task.wait(Duration::from_millis(10), None, None).unwrap();
    task.close().unwrap();
    assert!(task.completed());
}
