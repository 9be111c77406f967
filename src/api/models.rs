use crate::error::AppError;
use crate::model::{normalize_patch, ItemPurchase, ParticipantSample, RawStats, RuneSelection};
use serde::Deserialize;

// Match V5 response
#[derive(Debug, Deserialize)]
pub struct MatchDto {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub match_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Seconds.
    pub game_duration: i64,
    #[serde(default)]
    pub game_version: String,
    pub participants: Vec<ParticipantDto>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub puuid: String,
    pub participant_id: i32,
    pub champion_name: String,
    pub team_id: i32,
    #[serde(default)]
    pub win: bool,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub deaths: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub total_damage_dealt_to_champions: f64,
    #[serde(default)]
    pub total_damage_dealt: f64,
    #[serde(default)]
    pub total_heals_on_teammates: f64,
    #[serde(default)]
    pub total_damage_shielded_on_teammates: f64,
    #[serde(default, rename = "timeCCingOthers")]
    pub time_ccing_others: f64,
    #[serde(default)]
    pub item0: u32,
    #[serde(default)]
    pub item1: u32,
    #[serde(default)]
    pub item2: u32,
    #[serde(default)]
    pub item3: u32,
    #[serde(default)]
    pub item4: u32,
    #[serde(default)]
    pub item5: u32,
    #[serde(default)]
    pub item6: u32,
    #[serde(default)]
    pub summoner1_id: u32,
    #[serde(default)]
    pub summoner2_id: u32,
    #[serde(default)]
    pub perks: PerksDto,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PerksDto {
    #[serde(default)]
    pub styles: Vec<PerkStyleDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerkStyleDto {
    #[serde(default)]
    pub description: String,
    pub style: u32,
    #[serde(default)]
    pub selections: Vec<PerkSelectionDto>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PerkSelectionDto {
    pub perk: u32,
}

// Match V5 timeline response
#[derive(Debug, Deserialize)]
pub struct TimelineDto {
    pub info: TimelineInfo,
}

#[derive(Debug, Deserialize)]
pub struct TimelineInfo {
    pub frames: Vec<FrameDto>,
}

#[derive(Debug, Deserialize)]
pub struct FrameDto {
    #[serde(default)]
    pub events: Vec<EventDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: u64,
    #[serde(default)]
    pub participant_id: i32,
    #[serde(default)]
    pub item_id: u32,
    #[serde(default)]
    pub before_id: u32,
    #[serde(default)]
    pub skill_slot: u8,
    #[serde(default)]
    pub level_up_type: String,
}

impl ParticipantDto {
    pub fn items(&self) -> Vec<u32> {
        vec![
            self.item0, self.item1, self.item2, self.item3, self.item4, self.item5, self.item6,
        ]
    }

    fn runes(&self) -> RuneSelection {
        let style = |description: &str| self.perks.styles.iter().find(|s| s.description == description);
        let primary = style("primaryStyle").or_else(|| self.perks.styles.first());
        let secondary = style("subStyle").or_else(|| self.perks.styles.get(1));
        RuneSelection {
            keystone: primary
                .and_then(|s| s.selections.first())
                .map(|s| s.perk)
                .unwrap_or(0),
            primary_style: primary.map(|s| s.style).unwrap_or(0),
            secondary_style: secondary.map(|s| s.style).unwrap_or(0),
        }
    }
}

impl TimelineDto {
    fn events_for(&self, participant_id: i32) -> impl Iterator<Item = &EventDto> {
        self.info
            .frames
            .iter()
            .flat_map(|f| f.events.iter())
            .filter(move |e| e.participant_id == participant_id)
    }

    /// Purchases in order, with shop undos removing the purchase they revert.
    pub fn purchases(&self, participant_id: i32) -> Vec<ItemPurchase> {
        let mut purchases: Vec<ItemPurchase> = Vec::new();
        for event in self.events_for(participant_id) {
            match event.kind.as_str() {
                "ITEM_PURCHASED" => purchases.push(ItemPurchase {
                    item_id: event.item_id,
                    timestamp_ms: event.timestamp,
                }),
                "ITEM_UNDO" if event.before_id != 0 => {
                    if let Some(pos) = purchases.iter().rposition(|p| p.item_id == event.before_id) {
                        purchases.remove(pos);
                    }
                }
                _ => {}
            }
        }
        purchases
    }

    pub fn skill_level_ups(&self, participant_id: i32) -> Vec<u8> {
        self.events_for(participant_id)
            .filter(|e| e.kind == "SKILL_LEVEL_UP" && e.level_up_type == "NORMAL")
            .map(|e| e.skill_slot)
            .collect()
    }
}

impl MatchDto {
    fn team_kills(&self, team_id: i32) -> u32 {
        self.info
            .participants
            .iter()
            .filter(|p| p.team_id == team_id)
            .map(|p| p.kills)
            .sum()
    }

    fn to_sample(&self, p: &ParticipantDto, timeline: Option<&TimelineDto>) -> ParticipantSample {
        ParticipantSample {
            champion: p.champion_name.clone(),
            patch: normalize_patch(&self.info.game_version),
            win: p.win,
            game_duration_secs: self.info.game_duration as f64,
            stats: RawStats {
                damage_to_champions: p.total_damage_dealt_to_champions,
                total_damage_dealt: p.total_damage_dealt,
                healing: p.total_heals_on_teammates,
                shielding: p.total_damage_shielded_on_teammates,
                cc_time: p.time_ccing_others,
                kills: p.kills,
                deaths: p.deaths,
                assists: p.assists,
                team_kills: self.team_kills(p.team_id),
            },
            final_items: p.items(),
            runes: p.runes(),
            summoner_spells: [p.summoner1_id, p.summoner2_id],
            purchases: timeline.map(|t| t.purchases(p.participant_id)).unwrap_or_default(),
            skill_level_ups: timeline
                .map(|t| t.skill_level_ups(p.participant_id))
                .unwrap_or_default(),
            timeline: None,
        }
    }

    pub fn participant_sample(
        &self,
        puuid: &str,
        timeline: Option<&TimelineDto>,
    ) -> Result<ParticipantSample, AppError> {
        let participant = self
            .info
            .participants
            .iter()
            .find(|p| p.puuid == puuid)
            .ok_or_else(|| AppError::ParticipantNotFound(format!("{} in {}", puuid, self.metadata.match_id)))?;
        Ok(self.to_sample(participant, timeline))
    }

    pub fn participant_samples(&self, timeline: Option<&TimelineDto>) -> Vec<ParticipantSample> {
        self.info
            .participants
            .iter()
            .map(|p| self.to_sample(p, timeline))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATCH: &str = r#"{
        "metadata": { "matchId": "EUW1_1", "participants": ["a", "b"] },
        "info": {
            "gameDuration": 1800,
            "gameVersion": "14.23.636.2434",
            "participants": [
                {
                    "puuid": "a", "participantId": 1, "championName": "Ahri", "teamId": 100,
                    "win": true, "kills": 7, "deaths": 3, "assists": 9,
                    "totalDamageDealtToChampions": 30000, "totalDamageDealt": 150000,
                    "totalHealsOnTeammates": 0, "totalDamageShieldedOnTeammates": 0,
                    "timeCCingOthers": 25,
                    "item0": 3157, "item1": 3089, "item2": 3020, "item3": 0, "item4": 0, "item5": 0, "item6": 3340,
                    "summoner1Id": 14, "summoner2Id": 4,
                    "perks": { "styles": [
                        { "description": "primaryStyle", "style": 8100, "selections": [{ "perk": 8112 }] },
                        { "description": "subStyle", "style": 8200, "selections": [{ "perk": 8226 }] }
                    ] }
                },
                {
                    "puuid": "b", "participantId": 2, "championName": "Lux", "teamId": 100,
                    "win": true, "kills": 13, "deaths": 2, "assists": 4,
                    "totalDamageDealtToChampions": 25000, "totalDamageDealt": 90000
                }
            ]
        }
    }"#;

    const TIMELINE: &str = r#"{
        "info": { "frames": [
            { "events": [
                { "type": "ITEM_PURCHASED", "timestamp": 1000, "participantId": 1, "itemId": 1056 },
                { "type": "ITEM_PURCHASED", "timestamp": 1200, "participantId": 1, "itemId": 2003 },
                { "type": "ITEM_PURCHASED", "timestamp": 1300, "participantId": 1, "itemId": 2003 },
                { "type": "ITEM_UNDO", "timestamp": 1400, "participantId": 1, "beforeId": 2003, "afterId": 0 },
                { "type": "SKILL_LEVEL_UP", "timestamp": 90000, "participantId": 1, "skillSlot": 1, "levelUpType": "NORMAL" },
                { "type": "ITEM_PURCHASED", "timestamp": 1500, "participantId": 2, "itemId": 1055 }
            ] },
            { "events": [
                { "type": "ITEM_PURCHASED", "timestamp": 600000, "participantId": 1, "itemId": 3157 },
                { "type": "SKILL_LEVEL_UP", "timestamp": 610000, "participantId": 1, "skillSlot": 3, "levelUpType": "NORMAL" }
            ] }
        ] }
    }"#;

    #[test]
    fn converts_participant_with_timeline() {
        let m: MatchDto = serde_json::from_str(MATCH).unwrap();
        let t: TimelineDto = serde_json::from_str(TIMELINE).unwrap();
        let sample = m.participant_sample("a", Some(&t)).unwrap();

        assert_eq!(sample.champion, "Ahri");
        assert_eq!(sample.patch, "14.23");
        assert_eq!(sample.stats.team_kills, 20);
        assert_eq!(sample.stats.cc_time, 25.0);
        assert_eq!(sample.runes.keystone, 8112);
        assert_eq!(sample.runes.secondary_style, 8200);
        assert_eq!(sample.summoner_spells, [14, 4]);
        assert_eq!(sample.purchase_order(), vec![1056, 2003, 3157]);
        assert_eq!(sample.skill_level_ups, vec![1, 3]);
        assert_eq!(sample.final_items.len(), 7);
    }

    #[test]
    fn missing_participant_is_an_error() {
        let m: MatchDto = serde_json::from_str(MATCH).unwrap();
        assert!(matches!(
            m.participant_sample("zzz", None),
            Err(AppError::ParticipantNotFound(_))
        ));
        assert_eq!(m.participant_samples(None).len(), 2);
    }
}
