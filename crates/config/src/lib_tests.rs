// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn load_missing_file_defaults_every_field_unset() {
    let dir = tempdir().unwrap();
    let store = ConfigStore::load_from(&dir.path().join("pyjob.yml")).unwrap();
    assert_eq!(store.fields(), &ConfigFields::default());
    assert!(!store.locked());
}

#[test]
fn set_persists_and_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pyjob.yml");
    let mut store = ConfigStore::load_from(&path).unwrap();
    store
        .set(&[
            ("platform".to_string(), Some("lsf".to_string())),
            ("processes".to_string(), Some("4".to_string())),
        ])
        .unwrap();

    let reloaded = ConfigStore::load_from(&path).unwrap();
    assert_eq!(reloaded.fields().platform.as_deref(), Some("lsf"));
    assert_eq!(reloaded.fields().processes, Some(4));
}

#[test]
fn set_key_to_none_deletes_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pyjob.yml");
    let mut store = ConfigStore::load_from(&path).unwrap();
    store.set(&[("queue".to_string(), Some("batch".to_string()))]).unwrap();
    assert_eq!(store.fields().queue.as_deref(), Some("batch"));

    store.set(&[("queue".to_string(), None)]).unwrap();
    assert_eq!(store.fields().queue, None);

    let reloaded = ConfigStore::load_from(&path).unwrap();
    assert_eq!(reloaded.fields().queue, None);
}

#[test]
fn locked_store_rejects_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pyjob.yml");
    let mut store = ConfigStore::load_from(&path).unwrap();
    store.lock();
    let err = store
        .set(&[("platform".to_string(), Some("slurm".to_string()))])
        .unwrap_err();
    assert!(matches!(err, PyJobError::ConfigLocked));
}

#[test]
fn fallback_prefers_explicit_then_configured_then_default() {
    assert_eq!(fallback(Some(1), Some(2), 3), 1);
    assert_eq!(fallback(None, Some(2), 3), 2);
    assert_eq!(fallback(None::<i32>, None, 3), 3);
}

#[test]
fn invalid_integer_value_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pyjob.yml");
    let mut store = ConfigStore::load_from(&path).unwrap();
    let err = store
        .set(&[("processes".to_string(), Some("not-a-number".to_string()))])
        .unwrap_err();
    assert!(matches!(err, PyJobError::InvalidRuntime(_)));
}
