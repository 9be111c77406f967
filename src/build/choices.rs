use super::identity::{item_slots, resolve_core, CoreKey};
use super::items::{ItemCatalog, CONSUMABLE_SENTINEL};
use crate::model::{ItemPurchase, ParticipantSample};
use std::collections::BTreeSet;

/// Purchases made before this point count as the starting set.
pub const STARTING_WINDOW_MS: u64 = 60_000;

const SKILL_NAMES: [char; 3] = ['Q', 'W', 'E'];
const MAX_BASIC_RANK: usize = 5;

/// The discrete build decisions of one participant, normalized into the
/// keys baselines are indexed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildChoices {
    pub core: Option<CoreKey>,
    /// Non-boot completed items with their purchase slot.
    pub items: Vec<(u32, u8)>,
    pub keystone: Option<u32>,
    pub secondary_style: Option<u32>,
    pub spells: Option<String>,
    pub starting: Option<String>,
    pub skills: Option<String>,
}

impl BuildChoices {
    pub fn extract(sample: &ParticipantSample, catalog: &ItemCatalog) -> Self {
        let purchases = sample.purchase_order();
        BuildChoices {
            core: resolve_core(&purchases, &sample.final_items, catalog),
            items: item_slots(&purchases, &sample.final_items, catalog),
            keystone: Some(sample.runes.keystone).filter(|&id| id != 0),
            secondary_style: Some(sample.runes.secondary_style).filter(|&id| id != 0),
            spells: spell_key(sample.summoner_spells),
            starting: starting_key(&sample.purchases, catalog),
            skills: skill_order(&sample.skill_level_ups),
        }
    }
}

/// Order-independent key for a summoner spell pair.
pub fn spell_key(spells: [u32; 2]) -> Option<String> {
    if spells.iter().any(|&s| s == 0) {
        return None;
    }
    let (a, b) = (spells[0].min(spells[1]), spells[0].max(spells[1]));
    Some(format!("{}_{}", a, b))
}

/// Sorted, de-duplicated starting purchase key with trinkets dropped and
/// every consumable folded into one sentinel.
pub fn starting_key(purchases: &[ItemPurchase], catalog: &ItemCatalog) -> Option<String> {
    let items: BTreeSet<u32> = purchases
        .iter()
        .take_while(|p| p.timestamp_ms < STARTING_WINDOW_MS)
        .map(|p| p.item_id)
        .filter(|&id| id != 0 && !catalog.is_trinket(id))
        .map(|id| {
            if catalog.is_consumable(id) {
                CONSUMABLE_SENTINEL
            } else {
                id
            }
        })
        .collect();

    if items.is_empty() {
        return None;
    }
    Some(items.iter().map(|id| id.to_string()).collect::<Vec<_>>().join("_"))
}

/// Max order of the basic abilities, e.g. `"QEW"`. Abilities that reach
/// rank 5 come first in the order they got there; the rest follow by points
/// spent, ties broken by slot.
pub fn skill_order(level_ups: &[u8]) -> Option<String> {
    let mut points = [0usize; 3];
    let mut maxed = Vec::with_capacity(3);

    for &slot in level_ups {
        let idx = match slot {
            1..=3 => (slot - 1) as usize,
            _ => continue,
        };
        points[idx] += 1;
        if points[idx] == MAX_BASIC_RANK {
            maxed.push(idx);
        }
    }

    if points.iter().all(|&p| p == 0) {
        return None;
    }

    let mut rest: Vec<usize> = (0..3).filter(|i| !maxed.contains(i)).collect();
    rest.sort_by(|a, b| points[*b].cmp(&points[*a]).then(a.cmp(b)));

    Some(maxed.into_iter().chain(rest).map(|i| SKILL_NAMES[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(item_id: u32, timestamp_ms: u64) -> ItemPurchase {
        ItemPurchase { item_id, timestamp_ms }
    }

    #[test]
    fn spell_key_ignores_order() {
        assert_eq!(spell_key([14, 4]), spell_key([4, 14]));
        assert_eq!(spell_key([4, 14]).as_deref(), Some("4_14"));
        assert_eq!(spell_key([0, 4]), None);
    }

    #[test]
    fn potion_variants_share_a_starting_key() {
        let catalog = ItemCatalog::default();
        let two_pots = [buy(1055, 1_000), buy(2003, 1_500), buy(2003, 1_600), buy(3340, 2_000)];
        let refillable = [buy(1055, 1_000), buy(2031, 1_500)];
        assert_eq!(starting_key(&two_pots, &catalog).as_deref(), Some("1055_2003"));
        assert_eq!(starting_key(&two_pots, &catalog), starting_key(&refillable, &catalog));
    }

    #[test]
    fn late_purchases_are_not_starting_items() {
        let catalog = ItemCatalog::default();
        let purchases = [buy(1056, 5_000), buy(3089, 900_000)];
        assert_eq!(starting_key(&purchases, &catalog).as_deref(), Some("1056"));
        assert_eq!(starting_key(&[buy(3089, 900_000)], &catalog), None);
    }

    #[test]
    fn skill_order_follows_max_sequence() {
        // Q first, then E to rank 5, W last
        let ups = [1, 2, 3, 1, 1, 4, 1, 3, 1, 4, 3, 3, 3, 2, 2, 4, 2, 2];
        assert_eq!(skill_order(&ups).as_deref(), Some("QEW"));
    }

    #[test]
    fn partial_skill_order_ranks_by_points() {
        let ups = [3, 1, 3, 2, 3];
        assert_eq!(skill_order(&ups).as_deref(), Some("EQW"));
        assert_eq!(skill_order(&[]), None);
        assert_eq!(skill_order(&[4]), None);
    }
}
