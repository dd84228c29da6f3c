//! Configuration surface (spec.md §6).

/// Flags the host scheduler exposes to the arbiter. Threaded in through
/// constructors rather than read from a global, matching how the
/// teacher wires its own dependencies explicitly (`ResourceStore::new`,
/// `Resources::new`) instead of reaching for a singleton.
pub trait HostConfig: Send + Sync {
    /// `teamcity.sharedResources.resourcesInChains.enabled` — default
    /// `true`; when `false` the chain rule (spec.md §4.6) is skipped.
    fn resources_in_chains_enabled(&self) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct StaticConfig {
    pub resources_in_chains_enabled: bool,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self { resources_in_chains_enabled: true }
    }
}

impl HostConfig for StaticConfig {
    fn resources_in_chains_enabled(&self) -> bool {
        self.resources_in_chains_enabled
    }
}
