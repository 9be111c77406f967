use super::items::{ItemCatalog, BOOTS_SENTINEL};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Order-independent identity of a build: three completed items, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreKey([u32; 3]);

impl CoreKey {
    pub fn new(items: [u32; 3]) -> Option<Self> {
        let mut items = items;
        items.sort_unstable();
        if items[0] == items[1] || items[1] == items[2] {
            return None;
        }
        Some(CoreKey(items))
    }

    pub fn items(&self) -> [u32; 3] {
        self.0
    }

    pub fn contains(&self, item: u32) -> bool {
        self.0.contains(&item)
    }

    /// Number of items shared with another core.
    pub fn overlap(&self, other: &CoreKey) -> usize {
        self.0.iter().filter(|id| other.0.contains(id)).count()
    }
}

impl fmt::Display for CoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.0[0], self.0[1], self.0[2])
    }
}

impl FromStr for CoreKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ids = s
            .split('_')
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid core key {}: {}", s, e))?;
        let items: [u32; 3] = ids
            .try_into()
            .map_err(|_| format!("core key {} does not have exactly 3 items", s))?;
        CoreKey::new(items).ok_or_else(|| format!("core key {} repeats an item", s))
    }
}

/// Distinct completed items, normalized, in purchase order, that are still
/// in the final inventory. Sold items never count.
pub fn completed_sequence(purchases: &[u32], final_items: &[u32], catalog: &ItemCatalog) -> Vec<u32> {
    let inventory: BTreeSet<u32> = final_items.iter().filter_map(|&id| catalog.normalize(id)).collect();
    let mut seen = BTreeSet::new();
    purchases
        .iter()
        .filter_map(|&id| catalog.normalize(id))
        .filter(|id| catalog.is_completed(*id) && inventory.contains(id))
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Non-boot completed items with their 1-based purchase slot.
pub fn item_slots(purchases: &[u32], final_items: &[u32], catalog: &ItemCatalog) -> Vec<(u32, u8)> {
    completed_sequence(purchases, final_items, catalog)
        .into_iter()
        .filter(|&id| id != BOOTS_SENTINEL)
        .zip(1u8..)
        .collect()
}

/// Core key from the first three qualifying items, or `None` when the
/// player never finished three.
pub fn resolve_core(purchases: &[u32], final_items: &[u32], catalog: &ItemCatalog) -> Option<CoreKey> {
    let sequence = completed_sequence(purchases, final_items, catalog);
    match sequence.as_slice() {
        [a, b, c, ..] => CoreKey::new([*a, *b, *c]),
        _ => None,
    }
}
