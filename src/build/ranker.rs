use super::matcher::CoreMatch;
use super::identity::CoreKey;
use crate::baseline::{ChampionPatchBaseline, CoreCohort, WinStat};
use crate::config::{CategoryParams, CoreQualityParams, RankingParams};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Lower bound of the Wilson score interval for a win rate.
pub fn wilson_lower_bound(stat: WinStat, z: f64) -> f64 {
    if stat.games == 0 {
        return 0.0;
    }
    let n = stat.games as f64;
    let p = stat.win_rate();
    let z2 = z * z;
    let centre = p + z2 / (2.0 * n);
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt();
    ((centre - margin) / (1.0 + z2 / n)).max(0.0)
}

/// Ranking score: Wilson lower bound plus a small bonus growing with
/// `log10(games)` so popular options edge out rare ones at equal bounds.
pub fn wilson_score(stat: WinStat, params: &RankingParams) -> f64 {
    if stat.games == 0 {
        return 0.0;
    }
    wilson_lower_bound(stat, params.wilson_z) + (stat.games as f64).log10() * params.small_pickrate_bonus
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedOption<K> {
    pub key: K,
    pub stat: WinStat,
    pub score: f64,
}

/// Options with at least `min_sample` games, best first. Ties fall back to
/// key order so rankings are reproducible.
pub fn rank_options<K: Ord + Clone>(
    options: &BTreeMap<K, WinStat>,
    min_sample: u64,
    params: &RankingParams,
) -> Vec<RankedOption<K>> {
    let mut ranked: Vec<RankedOption<K>> = options
        .iter()
        .filter(|(_, stat)| stat.games >= min_sample.max(1))
        .map(|(key, stat)| RankedOption {
            key: key.clone(),
            stat: *stat,
            score: wilson_score(*stat, params),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    ranked
}

/// 0.5 at `min_sample`, 1.0 at `full`, linear between. Below `min_sample`
/// the entry is low-confidence and scales linearly down to 0.
pub fn confidence(games: u64, min_sample: u64, full: u64) -> f64 {
    if games == 0 {
        return 0.0;
    }
    let min_sample = min_sample.max(1);
    if games < min_sample {
        return 0.5 * games as f64 / min_sample as f64;
    }
    if games >= full || full <= min_sample {
        return 1.0;
    }
    0.5 + 0.5 * (games - min_sample) as f64 / (full - min_sample) as f64
}

/// 100 for the top option, dropping linearly with the Wilson gap, never
/// below `distance_floor`.
pub fn distance_score(player: f64, top: f64, params: &RankingParams) -> f64 {
    let gap = (top - player).max(0.0);
    (100.0 - gap * params.distance_scale).max(params.distance_floor)
}

pub fn choice_score(distance: f64, confidence: f64, max_penalty: f64) -> f64 {
    100.0 - ((100.0 - distance) * max_penalty / 100.0) * confidence
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceScore {
    pub score: f64,
    pub confidence: f64,
    pub games: u64,
    /// 1-based position among ranked options, if ranked.
    pub rank: Option<usize>,
    pub ranked_options: usize,
    pub off_meta: bool,
}

/// Scores one discrete choice against every option observed in the
/// reference population. `None` when the population holds no data at all,
/// or when the choice is unseen and no option has reached `min_sample`.
pub fn score_choice<K: Ord + Clone>(
    choice: &K,
    options: &BTreeMap<K, WinStat>,
    category: &CategoryParams,
    params: &RankingParams,
) -> Option<ChoiceScore> {
    if options.values().all(|s| s.games == 0) {
        return None;
    }

    let ranked = rank_options(options, category.min_sample, params);

    let stat = match options.get(choice).filter(|s| s.games > 0) {
        Some(stat) => *stat,
        // No established meta to be off from.
        None if ranked.is_empty() => return None,
        None => {
            return Some(ChoiceScore {
                score: (100.0 - category.off_meta_penalty).clamp(0.0, 100.0),
                confidence: 1.0,
                games: 0,
                rank: None,
                ranked_options: ranked.len(),
                off_meta: true,
            });
        }
    };

    // Nothing reached min_sample: compare against the best observed option.
    let top = match ranked.first() {
        Some(top) => top.score,
        None => rank_options(options, 1, params).first()?.score,
    };
    let player = wilson_score(stat, params);
    let conf = confidence(stat.games, category.min_sample, params.full_confidence);
    let distance = distance_score(player, top, params);

    Some(ChoiceScore {
        score: choice_score(distance, conf, category.max_penalty).clamp(0.0, 100.0),
        confidence: conf,
        games: stat.games,
        rank: ranked.iter().position(|o| &o.key == choice).map(|i| i + 1),
        ranked_options: ranked.len(),
        off_meta: false,
    })
}

/// Average of per-slot item scores, each item compared only with items
/// bought in the same purchase window. Items of `core` are skipped: a
/// core-specific cohort judges them through core quality.
pub fn score_items(
    items: &[(u32, u8)],
    cohort: &CoreCohort,
    core: Option<&CoreKey>,
    category: &CategoryParams,
    params: &RankingParams,
) -> Option<ChoiceScore> {
    let scored: Vec<ChoiceScore> = items
        .iter()
        .filter(|(item, _)| !core.map_or(false, |key| key.contains(*item)))
        .filter_map(|&(item, slot)| {
            let window = cohort.items_in_window(slot, category.position_window);
            score_choice(&item, &window, category, params)
        })
        .collect();

    if scored.is_empty() {
        return None;
    }

    let n = scored.len() as f64;
    Some(ChoiceScore {
        score: scored.iter().map(|s| s.score).sum::<f64>() / n,
        confidence: scored.iter().map(|s| s.confidence).sum::<f64>() / n,
        games: scored.iter().map(|s| s.games).sum(),
        rank: None,
        ranked_options: scored.iter().map(|s| s.ranked_options).max().unwrap_or(0),
        off_meta: scored.iter().any(|s| s.off_meta),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreQuality {
    pub score: f64,
    pub top_core: String,
    pub top_win_rate: f64,
    pub player_win_rate: f64,
}

/// Compares the matched cohort's win rate with the best established core.
/// Only meaningful when the player's core (or its family) was matched.
pub fn core_quality(
    matched: &CoreMatch<'_>,
    baseline: &ChampionPatchBaseline,
    quality: &CoreQualityParams,
    params: &RankingParams,
) -> Option<CoreQuality> {
    if !matched.is_core_specific() {
        return None;
    }

    let floor = baseline.win_rate() - quality.noise_margin;
    let candidates: BTreeMap<String, WinStat> = baseline
        .core
        .iter()
        .filter(|(key, _)| key.parse::<CoreKey>().is_ok())
        .filter(|(_, c)| c.games >= quality.min_games && c.win_rate() >= floor)
        .map(|(key, c)| (key.clone(), c.outcome()))
        .collect();

    let top = rank_options(&candidates, quality.min_games, params).into_iter().next()?;
    let top_win_rate = top.stat.win_rate();
    let player_win_rate = matched.cohort.win_rate();
    let gap = top_win_rate - player_win_rate;

    let score = if gap <= 0.0 {
        100.0
    } else {
        100.0 - (gap * quality.gap_scale).min(quality.max_penalty)
    };

    Some(CoreQuality {
        score,
        top_core: top.key,
        top_win_rate,
        player_win_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::items::BOOTS_SENTINEL;
    use crate::build::matcher::CoreMatchKind;
    use std::borrow::Cow;

    fn params() -> RankingParams {
        RankingParams::default()
    }

    fn options(entries: &[(u32, u64, u64)]) -> BTreeMap<u32, WinStat> {
        entries
            .iter()
            .map(|&(k, games, wins)| (k, WinStat::new(games, wins)))
            .collect()
    }

    #[test]
    fn wilson_discounts_small_samples() {
        let z = params().wilson_z;
        let small = wilson_lower_bound(WinStat::new(10, 6), z);
        let large = wilson_lower_bound(WinStat::new(1_000, 600), z);
        assert!(small < large);
        assert!(large < 0.6);
        assert_eq!(wilson_lower_bound(WinStat::default(), z), 0.0);
    }

    #[test]
    fn ranking_filters_small_options_and_is_stable() {
        let opts = options(&[(8112, 500, 270), (8128, 500, 270), (8010, 5, 5)]);
        let ranked = rank_options(&opts, 10, &params());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, 8112);
        assert_eq!(ranked[1].key, 8128);
    }

    #[test]
    fn confidence_ramps_between_thresholds() {
        assert_eq!(confidence(0, 10, 30), 0.0);
        assert_eq!(confidence(5, 10, 30), 0.25);
        assert_eq!(confidence(10, 10, 30), 0.5);
        assert_eq!(confidence(20, 10, 30), 0.75);
        assert_eq!(confidence(30, 10, 30), 1.0);
        assert_eq!(confidence(3_000, 10, 30), 1.0);
    }

    #[test]
    fn more_confidence_is_never_less_extreme() {
        let distance = distance_score(0.40, 0.48, &params());
        let mut last = 100.0;
        for games in [1, 5, 10, 15, 20, 30, 100] {
            let conf = confidence(games, 10, 30);
            let score = choice_score(distance, conf, 40.0);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn distance_is_floored() {
        let p = params();
        assert_eq!(distance_score(0.5, 0.5, &p), 100.0);
        assert_eq!(distance_score(0.6, 0.5, &p), 100.0);
        assert_eq!(distance_score(0.0, 0.9, &p), p.distance_floor);
    }

    #[test]
    fn top_choice_scores_full_marks() {
        let opts = options(&[(8112, 800, 440), (8128, 600, 290)]);
        let s = score_choice(&8112, &opts, &params().keystone, &params()).unwrap();
        assert_eq!(s.score, 100.0);
        assert_eq!(s.rank, Some(1));
        assert!(!s.off_meta);
    }

    #[test]
    fn worse_choice_is_penalized_up_to_category_max() {
        let p = params();
        let opts = options(&[(8112, 800, 440), (8128, 600, 240)]);
        let s = score_choice(&8128, &opts, &p.keystone, &p).unwrap();
        assert!(s.score < 100.0);
        assert!(s.score >= 100.0 - p.keystone.max_penalty);
        assert_eq!(s.rank, Some(2));
    }

    #[test]
    fn unseen_choice_gets_off_meta_penalty() {
        let p = params();
        let opts = options(&[(8112, 800, 440)]);
        let s = score_choice(&9923, &opts, &p.keystone, &p).unwrap();
        assert!(s.off_meta);
        assert_eq!(s.score, 100.0 - p.keystone.off_meta_penalty);
    }

    #[test]
    fn empty_population_is_not_scored() {
        let p = params();
        assert_eq!(score_choice(&8112, &BTreeMap::new(), &p.keystone, &p), None);
    }

    #[test]
    fn rare_choice_has_low_confidence() {
        let p = params();
        let opts = options(&[(8112, 800, 440), (8010, 2, 0)]);
        let s = score_choice(&8010, &opts, &p.keystone, &p).unwrap();
        assert_eq!(s.rank, None);
        assert!((s.confidence - 0.1).abs() < 1e-12);
        assert!(s.score > 100.0 - p.keystone.max_penalty * 0.2);
    }

    #[test]
    fn items_compare_within_purchase_window() {
        let p = params();
        let mut cohort = CoreCohort::default();
        cohort.items.entry(3157).or_default().insert(4, WinStat::new(300, 170));
        cohort.items.entry(3135).or_default().insert(4, WinStat::new(300, 120));
        // Strong late item outside the window of slot 4 must not count.
        cohort.items.entry(3089).or_default().insert(6, WinStat::new(900, 600));

        let best = score_items(&[(3157, 4)], &cohort, None, &p.items, &p).unwrap();
        let worse = score_items(&[(3135, 4)], &cohort, None, &p.items, &p).unwrap();
        assert_eq!(best.score, 100.0);
        assert!(worse.score < 100.0);

        // Core items are judged by core quality, not ranked again.
        let core = CoreKey::new([3157, 3089, 6655]).unwrap();
        assert_eq!(score_items(&[(3157, 4)], &cohort, Some(&core), &p.items, &p), None);
    }

    #[test]
    fn boots_in_core_leave_later_items_ranked() {
        let p = params();
        let mut cohort = CoreCohort::default();
        cohort.items.entry(3135).or_default().insert(3, WinStat::new(200, 60));
        cohort.items.entry(3116).or_default().insert(3, WinStat::new(200, 140));

        // Boots take a core place but no item slot, so 3135 sits in slot 3.
        let core = CoreKey::new([3157, 3089, BOOTS_SENTINEL]).unwrap();
        let items = [(3157, 1), (3089, 2), (3135, 3)];
        let s = score_items(&items, &cohort, Some(&core), &p.items, &p).unwrap();
        assert!(s.score < 100.0);
        assert_eq!(s.ranked_options, 2);
    }

    #[test]
    fn sparse_population_scores_known_choices_with_low_confidence() {
        let p = params();
        let opts = options(&[(8112, 5, 3), (8229, 4, 1)]);

        let best = score_choice(&8112, &opts, &p.keystone, &p).unwrap();
        assert_eq!(best.score, 100.0);
        assert_eq!(best.ranked_options, 0);

        let weaker = score_choice(&8229, &opts, &p.keystone, &p).unwrap();
        assert!(weaker.score < 100.0);
        assert!(weaker.score >= 100.0 - p.keystone.max_penalty * weaker.confidence);
        assert!(!weaker.off_meta);

        // Nothing is established, so an unseen keystone is not off-meta.
        assert_eq!(score_choice(&9999, &opts, &p.keystone, &p), None);
    }

    fn baseline_with(cohorts: &[(&str, u64, u64)]) -> ChampionPatchBaseline {
        let mut baseline = ChampionPatchBaseline::new("Ahri", "14.23");
        baseline.games = 10_000;
        baseline.wins = 5_000;
        for &(key, games, wins) in cohorts {
            baseline.core.insert(
                key.to_string(),
                CoreCohort {
                    games,
                    wins,
                    ..Default::default()
                },
            );
        }
        baseline
    }

    fn exact<'a>(baseline: &'a ChampionPatchBaseline, key: &str) -> CoreMatch<'a> {
        CoreMatch {
            kind: CoreMatchKind::Exact,
            cohort: Cow::Borrowed(&baseline.core[key]),
            merged_cohorts: 1,
        }
    }

    #[test]
    fn best_core_has_no_penalty() {
        let baseline = baseline_with(&[("3089_3135_3157", 2_000, 1_100), ("3089_3157_6655", 1_500, 720)]);
        let q = core_quality(&exact(&baseline, "3089_3135_3157"), &baseline, &Default::default(), &params()).unwrap();
        assert_eq!(q.score, 100.0);
        assert_eq!(q.top_core, "3089_3135_3157");
    }

    #[test]
    fn weaker_core_penalty_is_capped() {
        let quality = CoreQualityParams::default();
        let baseline = baseline_with(&[("3089_3135_3157", 2_000, 1_100), ("3001_3042_3089", 40, 4)]);
        let q = core_quality(&exact(&baseline, "3001_3042_3089"), &baseline, &quality, &params()).unwrap();
        assert_eq!(q.score, 100.0 - quality.max_penalty);

        let mild = baseline_with(&[("3089_3135_3157", 2_000, 1_100), ("3001_3042_3089", 1_000, 540)]);
        let q = core_quality(&exact(&mild, "3001_3042_3089"), &mild, &quality, &params()).unwrap();
        assert!((q.score - (100.0 - 0.01 * quality.gap_scale)).abs() < 1e-9);
    }
}
