//! Persistent Lock Store (spec.md §4.4, C4): remembers the locks a
//! running build acquired at grant time, so restarts of the host
//! process don't need to re-extract from a feature that may have since
//! been edited or removed.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{ArbiterError, Result};
use crate::model::id::PromotionId;
use crate::model::lock::{Lock, LockMode};

pub trait LockStore: Send + Sync {
    fn store(&self, running_build_id: &PromotionId, locks: &[Lock]) -> Result<()>;
    fn locks_stored(&self, running_build_id: &PromotionId) -> bool;
    fn load(&self, running_build_id: &PromotionId) -> Result<HashMap<String, Lock>>;
    fn remove(&self, running_build_id: &PromotionId) -> Result<()>;
}

fn encode(locks: &[Lock]) -> String {
    let mut out = String::new();
    for lock in locks {
        out.push_str(&lock.resource_name);
        out.push('\t');
        out.push_str(lock.mode.as_wire_str());
        out.push('\t');
        out.push_str(&lock.value);
        out.push('\n');
    }
    out
}

fn decode(content: &str) -> Result<HashMap<String, Lock>> {
    let mut map = HashMap::new();
    for line in content.lines() {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, '\t');
        let name = parts.next().ok_or_else(|| ArbiterError::Malformed(line.to_string()))?;
        let mode_str = parts.next().ok_or_else(|| ArbiterError::Malformed(line.to_string()))?;
        let value = parts.next().unwrap_or("");
        let mode = LockMode::from_wire_str(mode_str)
            .ok_or_else(|| ArbiterError::Malformed(format!("unknown lock mode '{mode_str}' in record '{line}'")))?;
        map.insert(name.to_string(), Lock::new(name, mode, value));
    }
    Ok(map)
}

/// One file per running build, named after its promotion id. Distinct
/// builds never contend for the same file, so no locking is needed
/// beyond what the filesystem already gives a single writer per path.
pub struct FileLockStore {
    dir: PathBuf,
}

impl FileLockStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, id: &PromotionId) -> PathBuf {
        self.dir.join(format!("{}.locks", id.as_str()))
    }
}

impl LockStore for FileLockStore {
    fn store(&self, running_build_id: &PromotionId, locks: &[Lock]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(running_build_id), encode(locks))?;
        Ok(())
    }

    fn locks_stored(&self, running_build_id: &PromotionId) -> bool {
        self.path_for(running_build_id).exists()
    }

    fn load(&self, running_build_id: &PromotionId) -> Result<HashMap<String, Lock>> {
        let content = fs::read_to_string(self.path_for(running_build_id))?;
        decode(&content)
    }

    fn remove(&self, running_build_id: &PromotionId) -> Result<()> {
        let path = self.path_for(running_build_id);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// In-memory variant kept here (rather than only in `testutil`) since
/// the demo CLI (SPEC_FULL.md §6) uses it too for single-process runs
/// that don't need a real directory.
pub struct MemoryLockStore {
    records: RwLock<HashMap<PromotionId, Vec<Lock>>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()) }
    }
}

impl Default for MemoryLockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LockStore for MemoryLockStore {
    fn store(&self, running_build_id: &PromotionId, locks: &[Lock]) -> Result<()> {
        self.records.write().expect("lock store poisoned").insert(running_build_id.clone(), locks.to_vec());
        Ok(())
    }

    fn locks_stored(&self, running_build_id: &PromotionId) -> bool {
        self.records.read().expect("lock store poisoned").contains_key(running_build_id)
    }

    fn load(&self, running_build_id: &PromotionId) -> Result<HashMap<String, Lock>> {
        let guard = self.records.read().expect("lock store poisoned");
        let locks = guard.get(running_build_id).cloned().unwrap_or_default();
        Ok(locks.into_iter().map(|l| (l.resource_name.clone(), l)).collect())
    }

    fn remove(&self, running_build_id: &PromotionId) -> Result<()> {
        self.records.write().expect("lock store poisoned").remove(running_build_id);
        Ok(())
    }
}

/// Reads a persisted record if present, falling back to `fallback` (the
/// build's own extracted locks) and logging a warning on storage
/// failure, per spec.md §2's StorageError policy: "warn and fall back
/// to extraction, never fail the whole arbitration cycle."
pub fn load_or_fallback(store: &dyn LockStore, id: &PromotionId, fallback: impl FnOnce() -> Vec<Lock>) -> Vec<Lock> {
    if !store.locks_stored(id) {
        return fallback();
    }
    match store.load(id) {
        Ok(map) => map.into_values().collect(),
        Err(err) => {
            log::warn!("failed to load persisted locks for build {id}: {err}; falling back to extraction");
            fallback()
        }
    }
}
