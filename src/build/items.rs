use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Stand-in id for any upgraded boots.
pub const BOOTS_SENTINEL: u32 = 10010;
/// Stand-in id for any consumable in a starting set.
pub const CONSUMABLE_SENTINEL: u32 = 2003;

const BASIC_BOOTS: u32 = 1001;

const UPGRADED_BOOTS: &[u32] = &[
    2422, 3005, 3006, 3009, 3010, 3013, 3020, 3047, 3111, 3117, 3158, 3170, 3171, 3172, 3173,
    3174, 3175, 3176,
];

const CONSUMABLES: &[u32] = &[2003, 2009, 2010, 2031, 2033, 2055, 2138, 2139, 2140];

const TRINKETS: &[u32] = &[3340, 3363, 3364, 3330];

const COMPLETED_ITEMS: &[u32] = &[
    2065, 2504, 3001, 3003, 3004, 3026, 3031, 3032, 3033, 3036, 3040, 3042, 3046, 3050, 3053,
    3065, 3068, 3071, 3072, 3073, 3074, 3075, 3078, 3083, 3085, 3087, 3089, 3091, 3094, 3100,
    3102, 3107, 3110, 3115, 3116, 3118, 3119, 3121, 3135, 3137, 3139, 3142, 3143, 3153, 3157,
    3161, 3165, 3181, 3190, 3222, 3302, 3504, 3508, 3742, 3748, 3814, 4005, 4401, 4628, 4629,
    4645, 6333, 6610, 6631, 6653, 6655, 6662, 6672, 6673, 6675, 6676, 6692, 6694, 6695, 6697,
    6698,
];

/// Item classification used to turn raw purchase ids into build signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub completed: BTreeSet<u32>,
    pub upgraded_boots: BTreeSet<u32>,
    pub consumables: BTreeSet<u32>,
    pub trinkets: BTreeSet<u32>,
}

impl Default for ItemCatalog {
    fn default() -> Self {
        ItemCatalog {
            completed: COMPLETED_ITEMS.iter().copied().collect(),
            upgraded_boots: UPGRADED_BOOTS.iter().copied().collect(),
            consumables: CONSUMABLES.iter().copied().collect(),
            trinkets: TRINKETS.iter().copied().collect(),
        }
    }
}

impl ItemCatalog {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::JsonError(format!("Failed to parse item catalog: {}", e)))
    }

    pub fn is_boots(&self, item_id: u32) -> bool {
        item_id == BOOTS_SENTINEL || self.upgraded_boots.contains(&item_id)
    }

    /// Maps upgraded boots onto the sentinel, drops basic boots and empty
    /// slots. Everything else passes through.
    pub fn normalize(&self, item_id: u32) -> Option<u32> {
        match item_id {
            0 | BASIC_BOOTS => None,
            id if self.is_boots(id) => Some(BOOTS_SENTINEL),
            id => Some(id),
        }
    }

    /// Completed-tier after normalization; the boots sentinel counts.
    pub fn is_completed(&self, normalized_id: u32) -> bool {
        normalized_id == BOOTS_SENTINEL || self.completed.contains(&normalized_id)
    }

    pub fn is_consumable(&self, item_id: u32) -> bool {
        self.consumables.contains(&item_id)
    }

    pub fn is_trinket(&self, item_id: u32) -> bool {
        self.trinkets.contains(&item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boots_tiers_normalize_differently() {
        let catalog = ItemCatalog::default();
        assert_eq!(catalog.normalize(1001), None);
        assert_eq!(catalog.normalize(3020), Some(BOOTS_SENTINEL));
        assert_eq!(catalog.normalize(3158), Some(BOOTS_SENTINEL));
        assert_eq!(catalog.normalize(3089), Some(3089));
        assert_eq!(catalog.normalize(0), None);
    }

    #[test]
    fn components_are_not_completed() {
        let catalog = ItemCatalog::default();
        assert!(catalog.is_completed(3089));
        assert!(catalog.is_completed(BOOTS_SENTINEL));
        // Needlessly Large Rod
        assert!(!catalog.is_completed(1058));
    }
}
