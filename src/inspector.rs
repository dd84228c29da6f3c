//! Configuration Inspector (spec.md §4.7, C7): surfaces resource
//! definition problems instead of letting the arbiter fail silently or
//! panic on them.

use std::collections::HashMap;

use crate::model::id::ProjectId;
use crate::model::lock::Lock;
use crate::registry::ResourceRegistry;

/// Keyed by the resource name the declared lock references. A build's
/// own lock list, not the whole project tree, is inspected — a
/// duplicate definition only matters if something actually locks it.
pub fn inspect(registry: &ResourceRegistry, project_id: &ProjectId, locks: &[Lock]) -> HashMap<String, String> {
    let resolved = registry.resolve(project_id);
    let duplicates = registry.duplicate_names_in_scope(project_id);

    let mut errors = HashMap::new();
    for lock in locks {
        if !resolved.contains_key(&lock.resource_name) {
            errors.insert(
                lock.resource_name.clone(),
                format!("UndefinedResource: no resource named '{}' is visible to project '{project_id}'", lock.resource_name),
            );
        } else if duplicates.contains(&lock.resource_name) {
            errors.insert(
                lock.resource_name.clone(),
                format!("DuplicateName: resource '{}' is defined more than once at the same project level", lock.resource_name),
            );
        }
    }
    errors
}
