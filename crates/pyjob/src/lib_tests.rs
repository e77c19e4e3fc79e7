// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

fn member_script(dir: &std::path::Path, stem: &str) -> Script {
    let mut s = Script::new(dir, "", stem, ".sh").unwrap();
    s.append("echo ok");
    s
}

#[test]
fn unknown_platform_is_rejected() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = vec![member_script(dir.path(), "a")];
    let err = TaskFactory::create(
        "invalid",
        scripts,
        Some(dir.path().to_path_buf()),
        Some(1),
        LocalOptions::default(),
        ClusterOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, PyJobError::UnknownPlatform(tag) if tag == "invalid"));
}

#[test]
fn platform_tag_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let scripts: Vec<Script> = vec![member_script(dir.path(), "a")];
    let task = TaskFactory::create(
        "LOCAL",
        scripts,
        Some(dir.path().to_path_buf()),
        Some(1),
        LocalOptions::default(),
        ClusterOptions::default(),
    )
    .unwrap();
    assert_eq!(task.kind(), "LocalTask");
}

#[test]
fn recognized_platforms_cover_every_backend() {
    let tags: Vec<&str> = TaskFactory::recognized_platforms().collect();
    for expected in ["local", "lsf", "pbs", "slurm", "sge", "torque"] {
        assert!(tags.contains(&expected), "missing platform tag {expected}");
    }
}
