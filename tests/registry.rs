//! Resource Registry resolution across a multi-level project hierarchy.

use std::sync::Arc;

use shared_resource_arbiter::model::id::ProjectId;
use shared_resource_arbiter::model::resource::{Quota, Resource};
use shared_resource_arbiter::registry::ResourceRegistry;
use shared_resource_arbiter::testutil::FakeHierarchy;

#[test]
fn three_level_hierarchy_overrides_at_each_step() {
    let hierarchy = Arc::new(FakeHierarchy::new().with_parent("Child", "Root").with_parent("Grandchild", "Child"));
    let registry = ResourceRegistry::new(hierarchy);

    let root = ProjectId::new("Root");
    let child = ProjectId::new("Child");
    let grandchild = ProjectId::new("Grandchild");

    registry.set_own_resources(root.clone(), vec![Resource::new_quoted("r-root", root.clone(), "db", Quota::Limited(1))]);
    registry.set_own_resources(child.clone(), vec![Resource::new_quoted("r-child", child.clone(), "db", Quota::Limited(2))]);

    // grandchild inherits child's override of "db", not root's.
    let resolved = registry.resolve(&grandchild);
    assert_eq!(resolved["db"].id, shared_resource_arbiter::model::id::ResourceId::new("r-child"));

    // child itself still sees its own override.
    let resolved_at_child = registry.resolve(&child);
    assert_eq!(resolved_at_child["db"].id, shared_resource_arbiter::model::id::ResourceId::new("r-child"));

    // root only sees its own definition.
    let resolved_at_root = registry.resolve(&root);
    assert_eq!(resolved_at_root["db"].id, shared_resource_arbiter::model::id::ResourceId::new("r-root"));
}

#[test]
fn unrelated_sibling_projects_do_not_see_each_others_resources() {
    let hierarchy = Arc::new(FakeHierarchy::new().with_parent("Sibling-A", "Root").with_parent("Sibling-B", "Root"));
    let registry = ResourceRegistry::new(hierarchy);

    let sibling_a = ProjectId::new("Sibling-A");
    registry.set_own_resources(sibling_a.clone(), vec![Resource::new_quoted("r-a", sibling_a.clone(), "db", Quota::Limited(1))]);

    let resolved_b = registry.resolve(&ProjectId::new("Sibling-B"));
    assert!(!resolved_b.contains_key("db"));
}
