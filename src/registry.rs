//! Resource Registry (spec.md §4.1, C1).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::model::id::ProjectId;
use crate::model::resource::Resource;

/// Project-hierarchy lookup, supplied by the host (out of scope per
/// spec.md §1: "Project/build-configuration storage" is an external
/// collaborator).
pub trait ProjectHierarchy: Send + Sync {
    /// Root-first chain of project ids ending with `project_id` itself.
    fn ancestor_chain(&self, project_id: &ProjectId) -> Vec<ProjectId>;
}

#[derive(Debug, Default)]
struct StoreInner {
    own_resources: HashMap<ProjectId, Vec<Resource>>,
}

/// Maps resource names to definitions, resolved with project-hierarchy
/// inheritance and overrides. Single lock over the whole map, the
/// teacher's `ResourceStore` shape (`Arc<RwLock<StoreInner>>`).
#[derive(Clone)]
pub struct ResourceRegistry {
    hierarchy: Arc<dyn ProjectHierarchy>,
    inner: Arc<RwLock<StoreInner>>,
}

impl ResourceRegistry {
    pub fn new(hierarchy: Arc<dyn ProjectHierarchy>) -> Self {
        Self { hierarchy, inner: Arc::new(RwLock::new(StoreInner::default())) }
    }

    /// Replaces the resources defined directly at `project_id` (invariant
    /// 1, name uniqueness, is enforced by `ConfigurationInspector`, not
    /// here — duplicate definitions are a configuration error to report,
    /// not to silently collapse).
    pub fn set_own_resources(&self, project_id: ProjectId, resources: Vec<Resource>) {
        let mut guard = self.inner.write().expect("registry lock poisoned");
        guard.own_resources.insert(project_id, resources);
    }

    pub fn own_resources(&self, project_id: &ProjectId) -> Vec<Resource> {
        let guard = self.inner.read().expect("registry lock poisoned");
        guard.own_resources.get(project_id).cloned().unwrap_or_default()
    }

    pub fn ancestor_chain(&self, project_id: &ProjectId) -> Vec<ProjectId> {
        self.hierarchy.ancestor_chain(project_id)
    }

    /// The effective view: walks the project path root-down, letting the
    /// nearest (leaf) definition win (spec.md §4.1). Returned map is a
    /// snapshot, safe to iterate while builds are arbitrated elsewhere.
    pub fn resolve(&self, project_id: &ProjectId) -> HashMap<String, Resource> {
        let mut resolved = HashMap::new();
        for ancestor in self.ancestor_chain(project_id) {
            for resource in self.own_resources(&ancestor) {
                resolved.insert(resource.name.clone(), resource);
            }
        }
        resolved
    }

    pub fn as_map(&self, project_id: &ProjectId) -> HashMap<String, Resource> {
        self.resolve(project_id)
    }

    /// Names defined more than once at the same project level, anywhere
    /// in `project_id`'s ancestor chain (invariant 1 / C7 DuplicateName).
    pub fn duplicate_names_in_scope(&self, project_id: &ProjectId) -> HashSet<String> {
        let mut duplicates = HashSet::new();
        for ancestor in self.ancestor_chain(project_id) {
            let mut seen = HashSet::new();
            for resource in self.own_resources(&ancestor) {
                if !seen.insert(resource.name.clone()) {
                    duplicates.insert(resource.name);
                }
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::resource::Quota;

    struct LinearHierarchy(Vec<ProjectId>);

    impl ProjectHierarchy for LinearHierarchy {
        fn ancestor_chain(&self, project_id: &ProjectId) -> Vec<ProjectId> {
            let idx = self.0.iter().position(|p| p == project_id).unwrap();
            self.0[..=idx].to_vec()
        }
    }

    fn registry() -> (ResourceRegistry, ProjectId, ProjectId) {
        let root = ProjectId::new("Root");
        let child = ProjectId::new("Root_Child");
        let hierarchy = Arc::new(LinearHierarchy(vec![root.clone(), child.clone()]));
        (ResourceRegistry::new(hierarchy), root, child)
    }

    #[test]
    fn descendant_override_wins() {
        let (registry, root, child) = registry();
        registry.set_own_resources(
            root.clone(),
            vec![Resource::new_quoted("r-root", root.clone(), "db", Quota::Limited(1))],
        );
        registry.set_own_resources(
            child.clone(),
            vec![Resource::new_quoted("r-child", child.clone(), "db", Quota::Limited(5))],
        );

        let resolved = registry.resolve(&child);
        let db = resolved.get("db").unwrap();
        assert_eq!(db.id, crate::model::id::ResourceId::new("r-child"));
    }

    #[test]
    fn root_only_resource_visible_to_descendant() {
        let (registry, root, child) = registry();
        registry.set_own_resources(
            root.clone(),
            vec![Resource::new_quoted("r-root", root.clone(), "shared-db", Quota::Infinite)],
        );

        let resolved = registry.resolve(&child);
        assert!(resolved.contains_key("shared-db"));
    }

    #[test]
    fn duplicate_names_detected_at_same_level() {
        let (registry, root, _child) = registry();
        registry.set_own_resources(
            root.clone(),
            vec![
                Resource::new_quoted("r1", root.clone(), "db", Quota::Limited(1)),
                Resource::new_quoted("r2", root.clone(), "db", Quota::Limited(2)),
            ],
        );
        let duplicates = registry.duplicate_names_in_scope(&root);
        assert!(duplicates.contains("db"));
    }
}
