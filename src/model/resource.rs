//! Resource definitions (spec.md §3).
//!
//! Two kinds, one per-kind grant rule each (spec.md §9: "do not lift
//! per-kind behavior into shared state" — kept as a tagged enum rather
//! than a trait hierarchy, since the two kinds never share behavior).

use serde::{Deserialize, Serialize};

use crate::model::id::{ProjectId, ResourceId};

/// `quota` is `None` for the infinite sentinel (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quota {
    Limited(u32),
    Infinite,
}

impl Quota {
    pub fn allows(self, current_readers: usize) -> bool {
        match self {
            Quota::Infinite => true,
            Quota::Limited(q) => current_readers < q as usize,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Quoted { quota: Quota },
    /// Non-empty, finite set of distinct string values (spec.md §3).
    Custom { values: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub project_id: ProjectId,
    pub name: String,
    pub kind: ResourceKind,
}

impl Resource {
    pub fn new_quoted(id: impl Into<ResourceId>, project_id: ProjectId, name: impl Into<String>, quota: Quota) -> Self {
        Self { id: id.into(), project_id, name: name.into(), kind: ResourceKind::Quoted { quota } }
    }

    pub fn new_custom(
        id: impl Into<ResourceId>,
        project_id: ProjectId,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        assert!(!values.is_empty(), "custom resource value pool must be non-empty");
        Self { id: id.into(), project_id, name: name.into(), kind: ResourceKind::Custom { values } }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.kind, ResourceKind::Custom { .. })
    }

    pub fn value_pool(&self) -> Option<&[String]> {
        match &self.kind {
            ResourceKind::Custom { values } => Some(values),
            ResourceKind::Quoted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinite_quota_always_allows() {
        assert!(Quota::Infinite.allows(10_000));
    }

    #[test]
    fn limited_quota_caps_at_exact_count() {
        assert!(Quota::Limited(3).allows(2));
        assert!(!Quota::Limited(3).allows(3));
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn custom_resource_rejects_empty_pool() {
        Resource::new_custom("r1", ProjectId::new("P1"), "agents", vec![]);
    }
}
