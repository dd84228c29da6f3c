//! Lock Extractor behavior across both wire encodings.

use std::collections::HashMap;

use shared_resource_arbiter::extractor::extract;
use shared_resource_arbiter::model::lock::{Lock, LockMode};
use shared_resource_arbiter::testutil::FakePromotion;

#[test]
fn primary_block_wins_over_legacy_params_when_both_present() {
    let mut legacy = HashMap::new();
    legacy.insert("teamcity.locks.writeLock.legacy-only".to_string(), String::new());

    let build = FakePromotion::new("p1", Some("P1"), Some("bt1")).with_lock_block("db writeLock\n").with_legacy_params(legacy);
    let locks = extract(&build);

    assert_eq!(locks, vec![Lock::new("db", LockMode::Write, "")]);
}

#[test]
fn multi_line_block_with_mixed_modes_and_values() {
    let build = FakePromotion::new("p1", Some("P1"), Some("bt1"))
        .with_lock_block("db writeLock\nagents readLock a1\ncache readLock\n");
    let locks = extract(&build);

    assert_eq!(locks.len(), 3);
    assert_eq!(locks[0], Lock::new("db", LockMode::Write, ""));
    assert_eq!(locks[1], Lock::new("agents", LockMode::Read, "a1"));
    assert_eq!(locks[2], Lock::new("cache", LockMode::Read, ""));
}

#[test]
fn blank_lines_in_block_are_ignored() {
    let build = FakePromotion::new("p1", Some("P1"), Some("bt1")).with_lock_block("\ndb writeLock\n\n\n");
    assert_eq!(extract(&build), vec![Lock::new("db", LockMode::Write, "")]);
}

#[test]
fn legacy_params_are_sorted_for_determinism() {
    let mut legacy = HashMap::new();
    legacy.insert("teamcity.locks.readLock.zeta".to_string(), "z1".to_string());
    legacy.insert("teamcity.locks.writeLock.alpha".to_string(), String::new());

    let build = FakePromotion::new("p1", Some("P1"), Some("bt1")).with_legacy_params(legacy);
    let locks = extract(&build);

    assert_eq!(locks, vec![Lock::new("alpha", LockMode::Write, ""), Lock::new("zeta", LockMode::Read, "z1")]);
}
