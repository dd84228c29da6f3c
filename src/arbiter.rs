//! The Arbiter (spec.md §4.6, C6): the single decision point a build
//! goes through before the scheduler lets it start.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::affinity::ResourceAffinity;
use crate::collector;
use crate::config::HostConfig;
use crate::extractor;
use crate::formatter;
use crate::inspector;
use crate::model::build::BuildPromotion;
use crate::model::id::{ProjectId, PromotionId, ResourceId};
use crate::model::lock::{Lock, LockMode};
use crate::model::resource::{Resource, ResourceKind};
use crate::model::taken_lock::TakenLock;
use crate::registry::ResourceRegistry;
use crate::store::LockStore;

/// Picks the first free value in the pool's declared order (spec.md §9,
/// open question 2: no ordering guarantee is required beyond
/// determinism for identical inputs).
fn pick_free_value(resource: &Resource, view: &TakenLock, affinity_other: &HashSet<String>) -> Option<String> {
    let pool = resource.value_pool()?;
    let taken: HashSet<&str> = view.read_values().chain(view.write_values()).collect();
    pool.iter().find(|v| !taken.contains(v.as_str()) && !affinity_other.contains(v.as_str())).cloned()
}

fn check_grant(lock: &Lock, resource: &Resource, view: &TakenLock, affinity_other: &HashSet<String>) -> bool {
    match &resource.kind {
        ResourceKind::Quoted { quota } => match lock.mode {
            LockMode::Read => view.write_locks.is_empty() && quota.allows(view.read_locks.len()),
            LockMode::Write => view.is_empty(),
        },
        ResourceKind::Custom { values } => {
            let taken_values: HashSet<&str> = view.read_values().chain(view.write_values()).collect();
            match lock.mode {
                LockMode::Read => {
                    if view.has_all_write() {
                        return false;
                    }
                    if lock.is_any() {
                        let contended =
                            values.iter().filter(|v| taken_values.contains(v.as_str()) || affinity_other.contains(v.as_str())).count();
                        values.len() > contended
                    } else {
                        !taken_values.contains(lock.value.as_str()) && !affinity_other.contains(&lock.value)
                    }
                }
                LockMode::Write => {
                    if lock.is_any() {
                        view.is_empty()
                    } else {
                        !taken_values.contains(lock.value.as_str())
                    }
                }
            }
        }
    }
}

/// Wires the four collaborators (registry, persistent store, affinity,
/// host config) behind one call. One `arbitration_lock` is held across
/// the whole decide-then-reserve sequence for a build, including every
/// chain ancestor it walks, so that two builds racing through
/// `arbitrate` never interleave a read of `other_assigned_values` with
/// a concurrent write to it (spec.md §4.5's atomicity requirement,
/// widened to the granularity this arbiter actually needs: per-call,
/// not per-affinity-operation).
pub struct Arbiter {
    registry: ResourceRegistry,
    lock_store: Arc<dyn LockStore>,
    affinity: ResourceAffinity,
    config: Arc<dyn HostConfig>,
    arbitration_lock: Mutex<()>,
}

impl Arbiter {
    pub fn new(registry: ResourceRegistry, lock_store: Arc<dyn LockStore>, affinity: ResourceAffinity, config: Arc<dyn HostConfig>) -> Self {
        Self { registry, lock_store, affinity, config, arbitration_lock: Mutex::new(()) }
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn affinity(&self) -> &ResourceAffinity {
        &self.affinity
    }

    pub fn lock_store(&self) -> &Arc<dyn LockStore> {
        &self.lock_store
    }

    /// Runs C7 over a build's declared locks and turns any finding into
    /// the wait reason spec.md §4.6/§4.7 require — used both for the
    /// build under arbitration and for each queued chain ancestor it
    /// walks, so a misconfigured ancestor is surfaced rather than
    /// silently skipped.
    fn configuration_error_reason(&self, project_id: &ProjectId, locks: &[Lock], promotion_id: &PromotionId) -> Option<String> {
        let errors = inspector::inspect(&self.registry, project_id, locks);
        if errors.is_empty() {
            return None;
        }
        let mut names: Vec<&String> = errors.keys().collect();
        names.sort();
        let detail = names.iter().map(|n| format!("{n}: {}", errors[*n])).collect::<Vec<_>>().join("; ");
        log::info!("build {promotion_id:?} blocked by shared-resource configuration error(s): {detail}");
        Some(format!("Build cannot start due to a shared resource configuration error: {detail}"))
    }

    /// Returns `None` when the build may start now, `Some(reason)` when
    /// it must keep waiting. `emulate = true` runs the full decision
    /// without reserving anything or stamping attributes — used by
    /// dry-run/"why is my build waiting" tooling (spec.md §8: idempotent
    /// re-decision under emulate).
    pub fn arbitrate(
        &self,
        build: &Arc<dyn BuildPromotion>,
        running: &[Arc<dyn BuildPromotion>],
        peer_queued: &[Arc<dyn BuildPromotion>],
        emulate: bool,
    ) -> Option<String> {
        let Some(project_id) = build.project_id() else {
            log::debug!("build {:?} has no project id; granting with no side effect", build.promotion_id());
            return None;
        };
        if build.build_type_id().is_none() {
            log::debug!("build {:?} has no build configuration; granting with no side effect", build.promotion_id());
            return None;
        }

        let _guard = self.arbitration_lock.lock().expect("arbitration lock poisoned");

        let live_ids: HashSet<PromotionId> =
            running.iter().chain(peer_queued.iter()).map(|b| b.promotion_id()).chain(std::iter::once(build.promotion_id())).collect();
        self.affinity.actualize(&live_ids);

        let locks = extractor::extract(build.as_ref());
        if locks.is_empty() {
            return None;
        }

        if let Some(reason) = self.configuration_error_reason(&project_id, &locks, &build.promotion_id()) {
            return Some(reason);
        }

        let taken = collector::collect(self.lock_store.as_ref(), running, peer_queued, &project_id);
        let resolved = self.registry.resolve(&project_id);

        if self.config.resources_in_chains_enabled() {
            self.arbitrate_chain(build, &locks, &resolved, &taken, emulate)
        } else {
            self.decide_and_maybe_reserve(build, &locks, &resolved, &taken, &[], emulate)
        }
    }

    /// Walks composite-chain ancestors (spec.md §4.6): already-running
    /// ancestors with a persisted record are chain-internal and
    /// excluded from contention; still-queued ancestors are decided
    /// (and, on success, reserved) in the same pass so a denial
    /// anywhere in the chain surfaces as the whole build's wait reason.
    fn arbitrate_chain(
        &self,
        build: &Arc<dyn BuildPromotion>,
        locks: &[Lock],
        resolved: &HashMap<String, Resource>,
        taken: &HashMap<String, TakenLock>,
        emulate: bool,
    ) -> Option<String> {
        let mut excluded: Vec<PromotionId> = Vec::new();

        for ancestor in build.chain_ancestors() {
            if ancestor.is_running() && self.lock_store.locks_stored(&ancestor.promotion_id()) {
                excluded.push(ancestor.promotion_id());
                continue;
            }
            if ancestor.is_running() {
                // Running but nothing persisted: treated as an ordinary
                // external holder, already reflected in `taken` by the
                // collector via its extraction fallback.
                continue;
            }
            let ancestor_locks = extractor::extract(ancestor.as_ref());
            if ancestor_locks.is_empty() {
                continue;
            }
            if let Some(ancestor_project_id) = ancestor.project_id() {
                if let Some(reason) = self.configuration_error_reason(&ancestor_project_id, &ancestor_locks, &ancestor.promotion_id()) {
                    return Some(reason);
                }
            }
            if let Some(reason) = self.decide_and_maybe_reserve(&ancestor, &ancestor_locks, resolved, taken, &excluded, emulate) {
                return Some(reason);
            }
            excluded.push(ancestor.promotion_id());
        }

        self.decide_and_maybe_reserve(build, locks, resolved, taken, &excluded, emulate)
    }

    /// Checks every declared lock against its resource; on success,
    /// reserves Custom READ values (stamping the attribute and
    /// recording the pick in `ResourceAffinity`) unless `emulate`.
    fn decide_and_maybe_reserve(
        &self,
        build: &Arc<dyn BuildPromotion>,
        locks: &[Lock],
        resolved: &HashMap<String, Resource>,
        taken: &HashMap<String, TakenLock>,
        excluded: &[PromotionId],
        emulate: bool,
    ) -> Option<String> {
        let mut unavailable = Vec::new();
        let mut views: HashMap<String, TakenLock> = HashMap::new();

        for lock in locks {
            let Some(resource) = resolved.get(&lock.resource_name) else {
                log::debug!("lock '{}' on build {:?} references an unresolved resource; skipping", lock.resource_name, build.promotion_id());
                continue;
            };
            let empty = TakenLock::default();
            let view = taken.get(&lock.resource_name).unwrap_or(&empty).without_holders(excluded);
            let affinity_other =
                if resource.is_custom() { self.affinity.other_assigned_values(&resource.id, &build.promotion_id()) } else { HashSet::new() };

            if !check_grant(lock, resource, &view, &affinity_other) {
                unavailable.push(lock.clone());
            }
            views.insert(lock.resource_name.clone(), view);
        }

        if !unavailable.is_empty() {
            return Some(formatter::format_wait_reason(taken, &unavailable));
        }

        let mut picks: HashMap<ResourceId, String> = HashMap::new();
        for lock in locks {
            let Some(resource) = resolved.get(&lock.resource_name) else { continue };
            if !resource.is_custom() || lock.mode != LockMode::Read {
                continue;
            }
            let chosen = if !lock.value.is_empty() {
                lock.value.clone()
            } else {
                let view = views.get(&lock.resource_name).cloned().unwrap_or_default();
                let affinity_other = self.affinity.other_assigned_values(&resource.id, &build.promotion_id());
                match pick_free_value(resource, &view, &affinity_other) {
                    Some(v) => v,
                    None => {
                        log::warn!(
                            "value pick failed for resource '{}' on build {:?} after the grant check passed; granting with an empty stamp",
                            resource.name,
                            build.promotion_id()
                        );
                        String::new()
                    }
                }
            };
            if !emulate {
                build.set_attribute(&format!("teamcity.sharedResources.reserved.{}", resource.id), &chosen);
            }
            picks.insert(resource.id.clone(), chosen);
        }

        if !emulate && !picks.is_empty() {
            self.affinity.store(build.promotion_id(), picks);
        }

        None
    }
}
