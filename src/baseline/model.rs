use super::stats::{RunningStat, WinStat};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::AddAssign;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuneStats {
    /// Keystone rune id -> outcome.
    pub primary: BTreeMap<u32, WinStat>,
    /// Secondary tree style id -> outcome.
    pub secondary: BTreeMap<u32, WinStat>,
}

/// Build-choice outcomes for every game sharing one core (or, for
/// `ChampionPatchBaseline::overall`, every game of the champion). The nested
/// maps are independent dimensions, not a partition of `games`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreCohort {
    pub games: u64,
    pub wins: u64,
    /// item id -> purchase slot (1-based) -> outcome.
    pub items: BTreeMap<u32, BTreeMap<u8, WinStat>>,
    pub runes: RuneStats,
    /// Unordered summoner spell pair key, e.g. `"4_14"`.
    pub spells: BTreeMap<String, WinStat>,
    /// Normalized starting item key, e.g. `"1055_2003"`.
    pub starting: BTreeMap<String, WinStat>,
    /// Skill max order, e.g. `"QEW"`.
    pub skills: BTreeMap<String, WinStat>,
}

impl CoreCohort {
    pub fn outcome(&self) -> WinStat {
        WinStat::new(self.games, self.wins)
    }

    pub fn win_rate(&self) -> f64 {
        self.outcome().win_rate()
    }

    /// Outcome of an item summed over purchase slots `[slot - window, slot + window]`.
    pub fn item_in_window(&self, item_id: u32, slot: u8, window: u8) -> WinStat {
        let lo = slot.saturating_sub(window);
        let hi = slot.saturating_add(window);
        self.items
            .get(&item_id)
            .map(|slots| slots.range(lo..=hi).map(|(_, s)| *s).sum())
            .unwrap_or_default()
    }

    /// Every item observed inside the purchase window around `slot`.
    pub fn items_in_window(&self, slot: u8, window: u8) -> BTreeMap<u32, WinStat> {
        self.items
            .keys()
            .map(|&id| (id, self.item_in_window(id, slot, window)))
            .filter(|(_, s)| s.games > 0)
            .collect()
    }
}

fn merge_counts<K: Ord + Clone>(into: &mut BTreeMap<K, WinStat>, from: &BTreeMap<K, WinStat>) {
    for (key, stat) in from {
        *into.entry(key.clone()).or_default() += *stat;
    }
}

/// Structural merge: every count is summed, nothing is reweighted.
impl AddAssign<&CoreCohort> for CoreCohort {
    fn add_assign(&mut self, other: &CoreCohort) {
        self.games += other.games;
        self.wins += other.wins;
        for (item, slots) in &other.items {
            merge_counts(self.items.entry(*item).or_default(), slots);
        }
        merge_counts(&mut self.runes.primary, &other.runes.primary);
        merge_counts(&mut self.runes.secondary, &other.runes.secondary);
        merge_counts(&mut self.spells, &other.spells);
        merge_counts(&mut self.starting, &other.starting);
        merge_counts(&mut self.skills, &other.skills);
    }
}

/// Per-metric running statistics kept for each champion and patch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricBaselines {
    pub damage_to_champions_per_min: RunningStat,
    pub total_damage_per_min: RunningStat,
    pub heal_shield_per_min: RunningStat,
    pub cc_per_min: RunningStat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionPatchBaseline {
    pub champion: String,
    pub patch: String,
    #[serde(default)]
    pub games: u64,
    #[serde(default)]
    pub wins: u64,
    #[serde(default)]
    pub metrics: MetricBaselines,
    /// Normalized core key -> cohort.
    #[serde(default)]
    pub core: BTreeMap<String, CoreCohort>,
    /// Character-wide build statistics, independent of core.
    #[serde(default)]
    pub overall: CoreCohort,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl ChampionPatchBaseline {
    pub fn new(champion: &str, patch: &str) -> Self {
        ChampionPatchBaseline {
            champion: champion.to_string(),
            patch: patch.to_string(),
            games: 0,
            wins: 0,
            metrics: MetricBaselines::default(),
            core: BTreeMap::new(),
            overall: CoreCohort::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn win_rate(&self) -> f64 {
        WinStat::new(self.games, self.wins).win_rate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cohort(games: u64, wins: u64) -> CoreCohort {
        let mut c = CoreCohort {
            games,
            wins,
            ..Default::default()
        };
        c.items.entry(3157).or_default().insert(4, WinStat::new(games, wins));
        c.runes.primary.insert(8112, WinStat::new(games, wins));
        c.spells.insert("4_14".into(), WinStat::new(games, wins));
        c.starting.insert("1056_2003".into(), WinStat::new(games, wins));
        c.skills.insert("QEW".into(), WinStat::new(games, wins));
        c
    }

    #[test]
    fn merge_sums_every_dimension() {
        let mut merged = CoreCohort::default();
        merged += &cohort(10, 6);
        merged += &cohort(5, 1);

        assert_eq!(merged.outcome(), WinStat::new(15, 7));
        assert_eq!(merged.items[&3157][&4], WinStat::new(15, 7));
        assert_eq!(merged.runes.primary[&8112], WinStat::new(15, 7));
        assert_eq!(merged.spells["4_14"], WinStat::new(15, 7));
        assert_eq!(merged.starting["1056_2003"], WinStat::new(15, 7));
        assert_eq!(merged.skills["QEW"], WinStat::new(15, 7));
    }

    #[test]
    fn item_window_sums_neighbouring_slots() {
        let mut c = CoreCohort::default();
        let slots = c.items.entry(3089).or_default();
        slots.insert(3, WinStat::new(4, 2));
        slots.insert(4, WinStat::new(6, 3));
        slots.insert(6, WinStat::new(10, 10));

        assert_eq!(c.item_in_window(3089, 4, 1), WinStat::new(10, 5));
        assert_eq!(c.item_in_window(3089, 1, 0), WinStat::default());
        assert_eq!(c.items_in_window(6, 0).len(), 1);
    }
}
