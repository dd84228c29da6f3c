//! Lock Extractor (spec.md §4.2, C2): turns a build's raw declarations,
//! in either wire encoding, into a `Vec<Lock>`.

use std::collections::{HashMap, HashSet};

use crate::model::build::BuildPromotion;
use crate::model::lock::{Lock, LockMode};

const LEGACY_READ_PREFIX: &str = "teamcity.locks.readLock.";
const LEGACY_WRITE_PREFIX: &str = "teamcity.locks.writeLock.";

/// Parses the primary encoding: one `name<SP>mode<SP>value` record per
/// line. Malformed lines (unknown mode, empty name) are skipped rather
/// than failing the whole block — a build should not be unable to start
/// because one of its lock lines got mangled upstream.
fn extract_from_block(block: &str) -> Vec<Lock> {
    let mut seen = HashSet::new();
    let mut locks = Vec::new();
    for line in block.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let mut parts = line.splitn(3, ' ');
        let name = parts.next().unwrap_or("");
        let mode_str = parts.next().unwrap_or("");
        let value = parts.next().unwrap_or("");
        if name.is_empty() {
            continue;
        }
        let Some(mode) = LockMode::from_wire_str(mode_str) else {
            log::debug!("skipping malformed lock line for resource '{name}': unknown mode '{mode_str}'");
            continue;
        };
        if seen.insert(name.to_string()) {
            locks.push(Lock::new(name, mode, value));
        }
    }
    locks
}

/// Parses the legacy `teamcity.locks.<mode>.<name>` parameter encoding.
/// Keys are walked in sorted order so the result is deterministic
/// regardless of the host's map iteration order.
fn extract_from_legacy(params: &HashMap<String, String>) -> Vec<Lock> {
    let mut seen = HashSet::new();
    let mut locks = Vec::new();
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();
    for key in keys {
        let value = &params[key];
        if let Some(name) = key.strip_prefix(LEGACY_READ_PREFIX) {
            if seen.insert(name.to_string()) {
                locks.push(Lock::new(name, LockMode::Read, value.clone()));
            }
        } else if let Some(name) = key.strip_prefix(LEGACY_WRITE_PREFIX) {
            if seen.insert(name.to_string()) {
                locks.push(Lock::new(name, LockMode::Write, value.clone()));
            }
        }
    }
    locks
}

/// Prefers the primary block when present; falls back to the legacy
/// parameter encoding otherwise (spec.md §6: used for builds whose
/// original feature is no longer reachable).
pub fn extract(build: &dyn BuildPromotion) -> Vec<Lock> {
    match build.lock_feature_block() {
        Some(block) => extract_from_block(&block),
        None => extract_from_legacy(&build.legacy_lock_params()),
    }
}
