//! Test doubles for the host-supplied collaborators, mirroring the
//! teacher's `simulator_mock.rs` / `MockSimulator` pattern: hand-written
//! fakes implementing the same trait as production code, not a mocking
//! framework.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::model::build::BuildPromotion;
use crate::model::id::{BuildTypeId, ProjectId, PromotionId};
use crate::error::Result;
use crate::registry::ProjectHierarchy;
use crate::store::LockStore;

#[derive(Debug)]
struct FakePromotionState {
    lock_feature_block: Option<String>,
    legacy_lock_params: HashMap<String, String>,
    attributes: HashMap<String, String>,
    is_running: bool,
    chain_ancestors: Vec<Arc<dyn BuildPromotion>>,
}

/// A fake `BuildPromotion`. Locks, running state, and chain ancestry are
/// set up via the builder methods before handing `Arc<dyn BuildPromotion>`
/// to the arbiter.
#[derive(Debug)]
pub struct FakePromotion {
    id: PromotionId,
    project_id: Option<ProjectId>,
    build_type_id: Option<BuildTypeId>,
    state: Mutex<FakePromotionState>,
}

impl FakePromotion {
    pub fn new(id: impl Into<String>, project_id: Option<&str>, build_type_id: Option<&str>) -> Self {
        Self {
            id: PromotionId::new(id.into()),
            project_id: project_id.map(ProjectId::new),
            build_type_id: build_type_id.map(BuildTypeId::new),
            state: Mutex::new(FakePromotionState {
                lock_feature_block: None,
                legacy_lock_params: HashMap::new(),
                attributes: HashMap::new(),
                is_running: false,
                chain_ancestors: Vec::new(),
            }),
        }
    }

    pub fn with_lock_block(self, block: impl Into<String>) -> Self {
        self.state.lock().unwrap().lock_feature_block = Some(block.into());
        self
    }

    pub fn with_legacy_params(self, params: HashMap<String, String>) -> Self {
        self.state.lock().unwrap().legacy_lock_params = params;
        self
    }

    pub fn with_running(self, running: bool) -> Self {
        self.state.lock().unwrap().is_running = running;
        self
    }

    pub fn with_chain_ancestors(self, ancestors: Vec<Arc<dyn BuildPromotion>>) -> Self {
        self.state.lock().unwrap().chain_ancestors = ancestors;
        self
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.state.lock().unwrap().attributes.get(key).cloned()
    }
}

impl BuildPromotion for FakePromotion {
    fn promotion_id(&self) -> PromotionId {
        self.id.clone()
    }

    fn project_id(&self) -> Option<ProjectId> {
        self.project_id.clone()
    }

    fn build_type_id(&self) -> Option<BuildTypeId> {
        self.build_type_id.clone()
    }

    fn build_type_name(&self) -> String {
        self.build_type_id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    fn lock_feature_block(&self) -> Option<String> {
        self.state.lock().unwrap().lock_feature_block.clone()
    }

    fn legacy_lock_params(&self) -> HashMap<String, String> {
        self.state.lock().unwrap().legacy_lock_params.clone()
    }

    fn set_attribute(&self, key: &str, value: &str) {
        self.state.lock().unwrap().attributes.insert(key.to_string(), value.to_string());
    }

    fn is_running(&self) -> bool {
        self.state.lock().unwrap().is_running
    }

    fn chain_ancestors(&self) -> Vec<Arc<dyn BuildPromotion>> {
        self.state.lock().unwrap().chain_ancestors.clone()
    }
}

/// A fixed, hand-assembled project tree: `parents[child] = parent`.
#[derive(Debug, Default)]
pub struct FakeHierarchy {
    parents: HashMap<ProjectId, ProjectId>,
}

impl FakeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, child: &str, parent: &str) -> Self {
        self.parents.insert(ProjectId::new(child), ProjectId::new(parent));
        self
    }
}

impl ProjectHierarchy for FakeHierarchy {
    fn ancestor_chain(&self, project_id: &ProjectId) -> Vec<ProjectId> {
        let mut chain = vec![project_id.clone()];
        let mut current = project_id.clone();
        while let Some(parent) = self.parents.get(&current) {
            chain.push(parent.clone());
            current = parent.clone();
        }
        chain.reverse();
        chain
    }
}

/// In-memory `LockStore`, for tests that need persisted-lock fallback
/// behavior without touching a filesystem.
#[derive(Debug, Default)]
pub struct InMemoryLockStore {
    records: Mutex<HashMap<PromotionId, Vec<crate::model::lock::Lock>>>,
}

impl InMemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LockStore for InMemoryLockStore {
    fn store(&self, running_build_id: &PromotionId, locks: &[crate::model::lock::Lock]) -> Result<()> {
        self.records.lock().unwrap().insert(running_build_id.clone(), locks.to_vec());
        Ok(())
    }

    fn locks_stored(&self, running_build_id: &PromotionId) -> bool {
        self.records.lock().unwrap().contains_key(running_build_id)
    }

    fn load(&self, running_build_id: &PromotionId) -> Result<HashMap<String, crate::model::lock::Lock>> {
        let guard = self.records.lock().unwrap();
        let locks = guard.get(running_build_id).cloned().unwrap_or_default();
        Ok(locks.into_iter().map(|l| (l.resource_name.clone(), l)).collect())
    }

    fn remove(&self, running_build_id: &PromotionId) -> Result<()> {
        self.records.lock().unwrap().remove(running_build_id);
        Ok(())
    }
}
