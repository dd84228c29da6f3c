//! Host-supplied build/promotion view (spec.md §3 BuildPromotion, §6 inputs).
//!
//! The arbiter never owns builds; it reads a narrow view through this
//! trait, the way `resource_trait.rs`'s `Resource` trait gives the VRM
//! domain a narrow read-only view onto an externally-owned resource.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::id::{BuildTypeId, ProjectId, PromotionId};

/// A build request as the host scheduler sees it: id, project scope,
/// build-configuration identity, its raw lock declarations (both
/// encodings from spec.md §6), and a way to stamp chosen values back
/// onto the promotion.
pub trait BuildPromotion: std::fmt::Debug + Send + Sync {
    fn promotion_id(&self) -> PromotionId;
    fn project_id(&self) -> Option<ProjectId>;
    fn build_type_id(&self) -> Option<BuildTypeId>;
    fn build_type_name(&self) -> String;

    /// The single feature parameter holding the primary lock-declaration
    /// block (spec.md §6), or `None` if the build has no lock-declaring
    /// feature at all.
    fn lock_feature_block(&self) -> Option<String>;

    /// Legacy-encoded lock parameters: `teamcity.locks.<mode>.<name>` to
    /// value (spec.md §6). Used when reading locks from a running build
    /// whose original feature may no longer be reachable.
    fn legacy_lock_params(&self) -> HashMap<String, String>;

    /// Stamp a reserved value onto the promotion under
    /// `teamcity.sharedResources.reserved.<resourceId>` (spec.md §4.6/§6).
    fn set_attribute(&self, key: &str, value: &str);

    /// Whether this promotion is currently a running build (spec.md
    /// §4.6 step 2: chain ancestors must be running to be chain-internal).
    fn is_running(&self) -> bool;

    /// Composite-chain ancestors, nearest first, in walk order
    /// (spec.md §4.6).
    fn chain_ancestors(&self) -> Vec<Arc<dyn BuildPromotion>>;
}

#[cfg(test)]
pub(crate) mod tests_support {
    //! Thin assertions about the trait object shape; fakes live in
    //! `crate::testutil`.
    use super::*;
    use crate::testutil::FakePromotion;

    #[test]
    fn fake_promotion_round_trips_project_and_type() {
        let p = FakePromotion::new("p1", Some("Project_A"), Some("Bt1"));
        assert_eq!(p.promotion_id(), PromotionId::new("p1"));
        assert_eq!(p.project_id(), Some(ProjectId::new("Project_A")));
        assert_eq!(p.build_type_id(), Some(BuildTypeId::new("Bt1")));
    }
}
