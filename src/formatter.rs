//! Wait-Reason Formatter (spec.md §4.8, C8): turns a set of unavailable
//! locks into the human-readable string the host displays to users.

use std::collections::HashMap;

use crate::model::lock::Lock;
use crate::model::taken_lock::TakenLock;

/// `taken` is the full, unfiltered tally (not a chain-excluded view) —
/// the message should name whoever actually holds the resource, not
/// only the holders this build contends with.
pub fn format_wait_reason(taken: &HashMap<String, TakenLock>, unavailable: &[Lock]) -> String {
    let mut names: Vec<&str> = unavailable.iter().map(|l| l.resource_name.as_str()).collect();
    names.sort();
    names.dedup();

    let parts: Vec<String> = names
        .iter()
        .map(|name| {
            let build_types = taken.get(*name).map(TakenLock::build_types_naming).unwrap_or_default();
            if build_types.is_empty() {
                name.to_string()
            } else {
                format!("{name} (locked by {})", build_types.join(", "))
            }
        })
        .collect();

    let noun = if names.len() == 1 { "resource" } else { "resources" };
    format!("Build is waiting for the following {noun} to become available: {}", parts.join(", "))
}
