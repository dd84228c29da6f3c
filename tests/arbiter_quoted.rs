//! End-to-end scenarios for Quoted resources (spec.md §8).

use std::sync::Arc;

use shared_resource_arbiter::affinity::ResourceAffinity;
use shared_resource_arbiter::arbiter::Arbiter;
use shared_resource_arbiter::config::StaticConfig;
use shared_resource_arbiter::model::build::BuildPromotion;
use shared_resource_arbiter::model::id::ProjectId;
use shared_resource_arbiter::model::resource::{Quota, Resource};
use shared_resource_arbiter::registry::ResourceRegistry;
use shared_resource_arbiter::store::{LockStore, MemoryLockStore};
use shared_resource_arbiter::testutil::{FakeHierarchy, FakePromotion};

fn arbiter_with_quoted(name: &str, quota: Quota) -> (Arbiter, ProjectId) {
    let project = ProjectId::new("P1");
    let registry = ResourceRegistry::new(Arc::new(FakeHierarchy::new()));
    registry.set_own_resources(project.clone(), vec![Resource::new_quoted("r1", project.clone(), name, quota)]);
    let store: Arc<dyn LockStore> = Arc::new(MemoryLockStore::new());
    let config = Arc::new(StaticConfig::default());
    (Arbiter::new(registry, store, ResourceAffinity::new(), config), project)
}

#[test]
fn two_reads_fit_under_quota_of_two() {
    let (arbiter, _project) = arbiter_with_quoted("db", Quota::Limited(2));

    let holder: Arc<dyn BuildPromotion> =
        Arc::new(FakePromotion::new("holder", Some("P1"), Some("bt-holder")).with_lock_block("db readLock\n").with_running(true));
    let requester: Arc<dyn BuildPromotion> = Arc::new(FakePromotion::new("requester", Some("P1"), Some("bt-requester")).with_lock_block("db readLock\n"));

    assert_eq!(arbiter.arbitrate(&requester, &[holder], &[], false), None);
}

#[test]
fn third_read_exceeds_quota_of_two_and_waits() {
    let (arbiter, _project) = arbiter_with_quoted("db", Quota::Limited(2));

    let h1: Arc<dyn BuildPromotion> =
        Arc::new(FakePromotion::new("h1", Some("P1"), Some("bt1")).with_lock_block("db readLock\n").with_running(true));
    let h2: Arc<dyn BuildPromotion> =
        Arc::new(FakePromotion::new("h2", Some("P1"), Some("bt2")).with_lock_block("db readLock\n").with_running(true));
    let requester: Arc<dyn BuildPromotion> = Arc::new(FakePromotion::new("requester", Some("P1"), Some("bt3")).with_lock_block("db readLock\n"));

    let reason = arbiter.arbitrate(&requester, &[h1, h2], &[], false).expect("should wait");
    assert!(reason.contains("db"));
    assert!(reason.contains("bt1"));
    assert!(reason.contains("bt2"));
}

#[test]
fn write_excludes_any_concurrent_reader_or_writer() {
    let (arbiter, _project) = arbiter_with_quoted("db", Quota::Infinite);

    let reader: Arc<dyn BuildPromotion> =
        Arc::new(FakePromotion::new("reader", Some("P1"), Some("bt-reader")).with_lock_block("db readLock\n").with_running(true));
    let writer: Arc<dyn BuildPromotion> = Arc::new(FakePromotion::new("writer", Some("P1"), Some("bt-writer")).with_lock_block("db writeLock\n"));

    assert!(arbiter.arbitrate(&writer, &[reader], &[], false).is_some());
}

#[test]
fn infinite_quota_never_blocks_reads() {
    let (arbiter, _project) = arbiter_with_quoted("db", Quota::Infinite);

    let holders: Vec<Arc<dyn BuildPromotion>> = (0..50)
        .map(|i| Arc::new(FakePromotion::new(format!("h{i}"), Some("P1"), Some("bt")).with_lock_block("db readLock\n").with_running(true)) as Arc<dyn BuildPromotion>)
        .collect();
    let requester: Arc<dyn BuildPromotion> = Arc::new(FakePromotion::new("requester", Some("P1"), Some("bt-last")).with_lock_block("db readLock\n"));

    assert_eq!(arbiter.arbitrate(&requester, &holders, &[], false), None);
}
