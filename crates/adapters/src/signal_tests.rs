// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn active_child_guard_restores_previous_registration_on_drop() {
    assert_eq!(ACTIVE_CHILD_PID.load(Ordering::SeqCst), 0);
    {
        let _outer = ActiveChild::register(111);
        assert_eq!(ACTIVE_CHILD_PID.load(Ordering::SeqCst), 111);
        {
            let _inner = ActiveChild::register(222);
            assert_eq!(ACTIVE_CHILD_PID.load(Ordering::SeqCst), 222);
        }
        assert_eq!(ACTIVE_CHILD_PID.load(Ordering::SeqCst), 111);
    }
    assert_eq!(ACTIVE_CHILD_PID.load(Ordering::SeqCst), 0);
}

#[test]
fn ensure_installed_is_idempotent() {
    ensure_installed();
    ensure_installed();
}
