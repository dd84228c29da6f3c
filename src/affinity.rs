//! Resource Affinity (spec.md §4.5, C5): remembers which Custom values
//! a queued-but-not-yet-running build has been assigned this cycle, so
//! a later ANY-value request in the same cycle doesn't double-book a
//! value nothing has actually taken yet.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::model::id::{PromotionId, ResourceId};

#[derive(Debug, Default)]
struct Inner {
    picks: HashMap<PromotionId, HashMap<ResourceId, String>>,
}

/// Single lock over the whole map, same shape as `ReservationStore`.
#[derive(Clone, Default)]
pub struct ResourceAffinity {
    inner: Arc<RwLock<Inner>>,
}

impl ResourceAffinity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops bookkeeping for any promotion not in `live_ids` (spec.md
    /// §4.5: a build that left the queue without starting must not pin
    /// a value forever).
    pub fn actualize(&self, live_ids: &HashSet<PromotionId>) {
        let mut guard = self.inner.write().expect("affinity lock poisoned");
        guard.picks.retain(|id, _| live_ids.contains(id));
    }

    pub fn store(&self, promotion_id: PromotionId, picks: HashMap<ResourceId, String>) {
        if picks.is_empty() {
            return;
        }
        let mut guard = self.inner.write().expect("affinity lock poisoned");
        guard.picks.entry(promotion_id).or_default().extend(picks);
    }

    /// Values other queued promotions have already been assigned for
    /// `resource_id`, excluding `promotion_id` itself.
    pub fn other_assigned_values(&self, resource_id: &ResourceId, promotion_id: &PromotionId) -> HashSet<String> {
        let guard = self.inner.read().expect("affinity lock poisoned");
        guard
            .picks
            .iter()
            .filter(|(id, _)| *id != promotion_id)
            .filter_map(|(_, picks)| picks.get(resource_id).cloned())
            .collect()
    }
}
