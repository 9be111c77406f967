use super::model::{ChampionPatchBaseline, CoreCohort};
use crate::build::{BuildChoices, ItemCatalog};
use crate::model::ParticipantSample;
use chrono::Utc;

impl CoreCohort {
    /// Adds one game's choices to every dimension it touches.
    pub fn record(&mut self, choices: &BuildChoices, won: bool) {
        self.games += 1;
        if won {
            self.wins += 1;
        }
        for &(item, slot) in &choices.items {
            self.items
                .entry(item)
                .or_default()
                .entry(slot)
                .or_default()
                .record(won);
        }
        if let Some(keystone) = choices.keystone {
            self.runes.primary.entry(keystone).or_default().record(won);
        }
        if let Some(style) = choices.secondary_style {
            self.runes.secondary.entry(style).or_default().record(won);
        }
        if let Some(spells) = &choices.spells {
            self.spells.entry(spells.clone()).or_default().record(won);
        }
        if let Some(starting) = &choices.starting {
            self.starting.entry(starting.clone()).or_default().record(won);
        }
        if let Some(skills) = &choices.skills {
            self.skills.entry(skills.clone()).or_default().record(won);
        }
    }
}

impl ChampionPatchBaseline {
    /// Folds one finished game into the running statistics. Samples with no
    /// usable duration are skipped and `false` is returned.
    pub fn record(&mut self, sample: &ParticipantSample, catalog: &ItemCatalog) -> bool {
        if !(sample.game_duration_secs > 0.0) {
            return false;
        }

        self.games += 1;
        if sample.win {
            self.wins += 1;
        }

        let stats = &sample.stats;
        self.metrics
            .damage_to_champions_per_min
            .push(sample.per_minute(stats.damage_to_champions));
        self.metrics
            .total_damage_per_min
            .push(sample.per_minute(stats.total_damage_dealt));
        self.metrics
            .heal_shield_per_min
            .push(sample.per_minute(stats.healing + stats.shielding));
        self.metrics.cc_per_min.push(sample.per_minute(stats.cc_time));

        let choices = BuildChoices::extract(sample, catalog);
        self.overall.record(&choices, sample.win);
        if let Some(core) = choices.core {
            self.core
                .entry(core.to_string())
                .or_default()
                .record(&choices, sample.win);
        }

        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::baseline::{ChampionPatchBaseline, WinStat};
    use crate::build::ItemCatalog;
    use crate::model::{ItemPurchase, ParticipantSample, RawStats, RuneSelection};

    fn sample(win: bool, damage: f64) -> ParticipantSample {
        let items = [3157, 3089, 3135, 3020];
        ParticipantSample {
            champion: "Ahri".into(),
            patch: "14.23".into(),
            win,
            game_duration_secs: 1800.0,
            stats: RawStats {
                damage_to_champions: damage,
                total_damage_dealt: damage * 5.0,
                cc_time: 30.0,
                ..Default::default()
            },
            final_items: items.to_vec(),
            runes: RuneSelection {
                keystone: 8112,
                primary_style: 8100,
                secondary_style: 8200,
            },
            summoner_spells: [14, 4],
            purchases: items
                .iter()
                .enumerate()
                .map(|(i, &item_id)| ItemPurchase {
                    item_id,
                    timestamp_ms: 300_000 * (i as u64 + 1),
                })
                .collect(),
            skill_level_ups: vec![1, 2, 3],
            timeline: None,
        }
    }

    #[test]
    fn records_metrics_and_cohorts() {
        let catalog = ItemCatalog::default();
        let mut baseline = ChampionPatchBaseline::new("Ahri", "14.23");
        assert!(baseline.record(&sample(true, 30_000.0), &catalog));
        assert!(baseline.record(&sample(false, 60_000.0), &catalog));

        assert_eq!(baseline.games, 2);
        assert_eq!(baseline.wins, 1);
        assert_eq!(baseline.metrics.damage_to_champions_per_min.count, 2);
        assert!((baseline.metrics.damage_to_champions_per_min.mean - 1500.0).abs() < 1e-9);
        assert!((baseline.metrics.cc_per_min.mean - 1.0).abs() < 1e-9);

        let cohort = &baseline.core["3089_3135_3157"];
        assert_eq!(cohort.outcome(), WinStat::new(2, 1));
        assert_eq!(cohort.items[&3135][&3], WinStat::new(2, 1));
        assert_eq!(cohort.spells["4_14"], WinStat::new(2, 1));
        assert_eq!(baseline.overall.runes.primary[&8112], WinStat::new(2, 1));
        assert_eq!(baseline.overall.skills["QWE"], WinStat::new(2, 1));
    }

    #[test]
    fn skips_games_without_duration() {
        let catalog = ItemCatalog::default();
        let mut baseline = ChampionPatchBaseline::new("Ahri", "14.23");
        let mut bad = sample(true, 30_000.0);
        bad.game_duration_secs = 0.0;
        assert!(!baseline.record(&bad, &catalog));
        assert_eq!(baseline.games, 0);
    }
}
