//! Taken-Lock Collector (spec.md §4.3, C3): aggregates running builds
//! and peer-queued builds already cleared this cycle into one
//! `resourceName -> TakenLock` tally, scoped to a project.

use std::collections::HashMap;
use std::sync::Arc;

use crate::extractor;
use crate::model::build::BuildPromotion;
use crate::model::id::ProjectId;
use crate::model::taken_lock::{Holder, TakenLock};
use crate::store::{self, LockStore};

fn in_scope(build: &dyn BuildPromotion, scope: &ProjectId) -> bool {
    build.project_id().as_ref() == Some(scope)
}

fn fold_in(tally: &mut HashMap<String, TakenLock>, build: &dyn BuildPromotion, locks: Vec<crate::model::lock::Lock>) {
    use crate::model::lock::LockMode;

    let promotion_id = build.promotion_id();
    let build_type_id = build.build_type_name();
    for lock in locks {
        let holder = Holder { promotion_id: promotion_id.clone(), build_type_id: build_type_id.clone(), value: lock.value };
        let entry = tally.entry(lock.resource_name).or_default();
        match lock.mode {
            LockMode::Read => entry.read_locks.push(holder),
            LockMode::Write => entry.write_locks.push(holder),
        }
    }
}

/// Running builds prefer their persisted record (authoritative: it is
/// exactly what was granted) over re-extraction, falling back only on
/// a missing or unreadable record. Queued peers always use extraction,
/// since they have no persisted record yet.
pub fn collect(
    lock_store: &dyn LockStore,
    running: &[Arc<dyn BuildPromotion>],
    peer_queued: &[Arc<dyn BuildPromotion>],
    scope: &ProjectId,
) -> HashMap<String, TakenLock> {
    let mut tally: HashMap<String, TakenLock> = HashMap::new();

    for build in running {
        if !in_scope(build.as_ref(), scope) {
            continue;
        }
        let id = build.promotion_id();
        let build_ref = build.clone();
        let locks = store::load_or_fallback(lock_store, &id, move || extractor::extract(build_ref.as_ref()));
        fold_in(&mut tally, build.as_ref(), locks);
    }

    for build in peer_queued {
        if !in_scope(build.as_ref(), scope) {
            continue;
        }
        let locks = extractor::extract(build.as_ref());
        fold_in(&mut tally, build.as_ref(), locks);
    }

    tally
}
