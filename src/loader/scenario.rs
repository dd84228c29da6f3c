//! Loads a demo scenario file and assembles the collaborators the
//! arbiter needs from it (SPEC_FULL.md §6). This is the CLI's own
//! minimal `BuildPromotion`/`ProjectHierarchy`, kept separate from
//! `testutil`'s fakes since this one reads real files and is shipped
//! in the binary, not only under `#[cfg(test)]`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::api::scenario_dto::{BuildDto, ResourceKindDto, ScenarioDto};
use crate::error::Result;
use crate::model::build::BuildPromotion;
use crate::model::id::{BuildTypeId, ProjectId, PromotionId};
use crate::model::resource::{Quota, Resource, ResourceKind};
use crate::registry::{ProjectHierarchy, ResourceRegistry};

pub fn load_scenario_file(path: impl AsRef<Path>) -> Result<Scenario> {
    let content = fs::read_to_string(path)?;
    let dto: ScenarioDto = serde_json::from_str(&content)?;
    Ok(Scenario::from_dto(dto))
}

pub struct Scenario {
    pub registry: ResourceRegistry,
    pub running: Vec<Arc<dyn BuildPromotion>>,
    pub queued: Vec<Arc<dyn BuildPromotion>>,
}

impl Scenario {
    fn from_dto(dto: ScenarioDto) -> Self {
        let mut parents = HashMap::new();
        for project in &dto.projects {
            if let Some(parent_id) = &project.parent_id {
                parents.insert(ProjectId::new(project.id.clone()), ProjectId::new(parent_id.clone()));
            }
        }
        let hierarchy = Arc::new(MapHierarchy { parents });
        let registry = ResourceRegistry::new(hierarchy);

        let mut by_project: HashMap<ProjectId, Vec<Resource>> = HashMap::new();
        for resource in dto.resources {
            let project_id = ProjectId::new(resource.project_id.clone());
            let kind = match resource.kind {
                ResourceKindDto::Quoted { quota: Some(q) } => ResourceKind::Quoted { quota: Quota::Limited(q) },
                ResourceKindDto::Quoted { quota: None } => ResourceKind::Quoted { quota: Quota::Infinite },
                ResourceKindDto::Custom { values } => ResourceKind::Custom { values },
            };
            by_project.entry(project_id.clone()).or_default().push(Resource {
                id: resource.id.into(),
                project_id,
                name: resource.name,
                kind,
            });
        }
        for (project_id, resources) in by_project {
            registry.set_own_resources(project_id, resources);
        }

        let all_builds: HashMap<String, Arc<ScenarioBuild>> = dto
            .running_builds
            .iter()
            .map(|b| (b.id.clone(), Arc::new(ScenarioBuild::new(b, true))))
            .chain(dto.queued_builds.iter().map(|b| (b.id.clone(), Arc::new(ScenarioBuild::new(b, false)))))
            .collect();

        for build in all_builds.values() {
            let ancestors: Vec<Arc<dyn BuildPromotion>> = build
                .chain_ancestor_ids
                .iter()
                .filter_map(|id| all_builds.get(id))
                .map(|b| b.clone() as Arc<dyn BuildPromotion>)
                .collect();
            *build.chain_ancestors.lock().expect("scenario build lock poisoned") = ancestors;
        }

        let running = dto.running_builds.iter().map(|b| all_builds[&b.id].clone() as Arc<dyn BuildPromotion>).collect();
        let queued = dto.queued_builds.iter().map(|b| all_builds[&b.id].clone() as Arc<dyn BuildPromotion>).collect();

        Scenario { registry, running, queued }
    }
}

struct MapHierarchy {
    parents: HashMap<ProjectId, ProjectId>,
}

impl ProjectHierarchy for MapHierarchy {
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

#[derive(Debug)]
struct ScenarioBuild {
    id: PromotionId,
    project_id: ProjectId,
    build_type_id: BuildTypeId,
    lock_block: Option<String>,
    is_running: bool,
    chain_ancestor_ids: Vec<String>,
    chain_ancestors: Mutex<Vec<Arc<dyn BuildPromotion>>>,
    attributes: Mutex<HashMap<String, String>>,
}

impl ScenarioBuild {
    fn new(dto: &BuildDto, is_running: bool) -> Self {
        Self {
            id: PromotionId::new(dto.id.clone()),
            project_id: ProjectId::new(dto.project_id.clone()),
            build_type_id: BuildTypeId::new(dto.build_type_id.clone()),
            lock_block: dto.lock_block.clone(),
            is_running,
            chain_ancestor_ids: dto.chain_ancestor_ids.clone(),
            chain_ancestors: Mutex::new(Vec::new()),
            attributes: Mutex::new(HashMap::new()),
        }
    }
}

impl BuildPromotion for ScenarioBuild {
    fn promotion_id(&self) -> PromotionId {
        self.id.clone()
    }

    fn project_id(&self) -> Option<ProjectId> {
        Some(self.project_id.clone())
    }

    fn build_type_id(&self) -> Option<BuildTypeId> {
        Some(self.build_type_id.clone())
    }

    fn build_type_name(&self) -> String {
        self.build_type_id.to_string()
    }

    fn lock_feature_block(&self) -> Option<String> {
        self.lock_block.clone()
    }

    fn legacy_lock_params(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    fn set_attribute(&self, key: &str, value: &str) {
        log::info!("build {} reserved {key} = {value}", self.id);
        self.attributes.lock().expect("scenario build lock poisoned").insert(key.to_string(), value.to_string());
    }

    fn is_running(&self) -> bool {
        self.is_running
    }

    fn chain_ancestors(&self) -> Vec<Arc<dyn BuildPromotion>> {
        self.chain_ancestors.lock().expect("scenario build lock poisoned").clone()
    }
}
