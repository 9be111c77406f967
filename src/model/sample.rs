use serde::{Deserialize, Serialize};

/// Raw end-of-game totals for one participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawStats {
    pub damage_to_champions: f64,
    pub total_damage_dealt: f64,
    pub healing: f64,
    pub shielding: f64,
    /// Seconds of crowd control applied to enemy champions.
    pub cc_time: f64,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub team_kills: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPurchase {
    pub item_id: u32,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuneSelection {
    pub keystone: u32,
    pub primary_style: u32,
    pub secondary_style: u32,
}

/// Kill/death quality scores (0-100) computed from the match timeline by an
/// upstream analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineQuality {
    pub kill_quality: Option<f64>,
    pub death_quality: Option<f64>,
}

/// Everything the engine knows about one participant in one finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSample {
    pub champion: String,
    pub patch: String,
    #[serde(default)]
    pub win: bool,
    pub game_duration_secs: f64,
    pub stats: RawStats,
    /// Inventory slots 0-6 at game end; 0 marks an empty slot.
    #[serde(default)]
    pub final_items: Vec<u32>,
    #[serde(default)]
    pub runes: RuneSelection,
    #[serde(default)]
    pub summoner_spells: [u32; 2],
    /// Chronological purchases, undos already applied.
    #[serde(default)]
    pub purchases: Vec<ItemPurchase>,
    /// Chronological ability level-ups: 1=Q, 2=W, 3=E, 4=R.
    #[serde(default)]
    pub skill_level_ups: Vec<u8>,
    #[serde(default)]
    pub timeline: Option<TimelineQuality>,
}

impl ParticipantSample {
    pub fn minutes(&self) -> f64 {
        self.game_duration_secs / 60.0
    }

    /// Per-minute rate of a raw total; zero when the duration is unusable.
    pub fn per_minute(&self, value: f64) -> f64 {
        let minutes = self.minutes();
        if minutes > 0.0 && value.is_finite() {
            value / minutes
        } else {
            0.0
        }
    }

    pub fn purchase_order(&self) -> Vec<u32> {
        self.purchases.iter().map(|p| p.item_id).collect()
    }

    pub fn kill_participation(&self) -> Option<f64> {
        if self.stats.team_kills == 0 {
            return None;
        }
        Some((self.stats.kills as f64 + self.stats.assists as f64) / self.stats.team_kills as f64)
    }

    pub fn deaths_per_minute(&self) -> f64 {
        self.per_minute(self.stats.deaths as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_optional_fields_missing() {
        let json = r#"{
            "champion": "Ahri",
            "patch": "14.23",
            "game_duration_secs": 1800,
            "stats": { "damage_to_champions": 30000, "total_damage_dealt": 150000 }
        }"#;
        let sample: ParticipantSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.champion, "Ahri");
        assert!(sample.purchases.is_empty());
        assert!(sample.timeline.is_none());
        assert_eq!(sample.per_minute(sample.stats.damage_to_champions), 1000.0);
        assert_eq!(sample.kill_participation(), None);
    }

    #[test]
    fn kill_participation_handles_extreme_counts() {
        let json = r#"{
            "champion": "Ahri",
            "patch": "14.23",
            "game_duration_secs": 1800,
            "stats": { "kills": 4294967295, "assists": 4294967295, "team_kills": 4294967295 }
        }"#;
        let sample: ParticipantSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.kill_participation(), Some(2.0));
    }
}
