//! Wire shapes for the demo scenario file the `arbiter-cli` binary
//! reads (SPEC_FULL.md §6). Intentionally thin: a developer debugging
//! harness, not a persistence format for a real host integration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDto {
    pub projects: Vec<ProjectDto>,
    pub resources: Vec<ResourceDto>,
    #[serde(default)]
    pub running_builds: Vec<BuildDto>,
    #[serde(default)]
    pub queued_builds: Vec<BuildDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDto {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDto {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub kind: ResourceKindDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResourceKindDto {
    /// `quota: null` means infinite.
    Quoted { quota: Option<u32> },
    Custom { values: Vec<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDto {
    pub id: String,
    pub project_id: String,
    pub build_type_id: String,
    /// Primary lock-declaration block, one `name mode [value]` line per
    /// lock (spec.md §6). Absent means no lock-declaring feature.
    #[serde(default)]
    pub lock_block: Option<String>,
    #[serde(default)]
    pub chain_ancestor_ids: Vec<String>,
}
