use super::breakdown::{
    BuildBreakdown, Component, ComponentScores, KdaBreakdown, Metric, MetricScore, Provenance,
    ScoreBreakdown,
};
use super::transform::{
    cc_score, death_score, kill_participation_score, situational_relevance, stat_score,
    NEUTRAL_SCORE,
};
use crate::baseline::{resolve_baseline, BaselineSource, ChampionPatchBaseline, CoreCohort, RunningStat};
use crate::build::ranker::{core_quality, score_choice, score_items};
use crate::build::{match_core, BuildChoices, ChoiceScore, CoreMatch, ItemCatalog};
use crate::config::ScoringProfile;
use crate::error::Unscoreable;
use crate::model::{normalize_patch, ParticipantSample};
use tracing::{debug, trace};

/// Weighted mean of `(score, weight)` pairs; `None` when no weight is set.
fn weighted_mean(parts: &[(f64, f64)]) -> Option<f64> {
    let total: f64 = parts.iter().map(|(_, w)| w).sum();
    if !(total > 0.0) {
        return None;
    }
    Some(parts.iter().map(|(s, w)| s * w).sum::<f64>() / total)
}

/// Scores participants against an injected baseline source. Stateless:
/// the same sample and baseline snapshot always produce the same result.
pub struct ScoringEngine<S> {
    source: S,
    profile: ScoringProfile,
    catalog: ItemCatalog,
}

impl<S: BaselineSource> ScoringEngine<S> {
    pub fn new(source: S) -> Self {
        ScoringEngine {
            source,
            profile: ScoringProfile::default(),
            catalog: ItemCatalog::default(),
        }
    }

    pub fn with_profile(mut self, profile: ScoringProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_catalog(mut self, catalog: ItemCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// The final score breakdown, or `None` when the sample can't be scored.
    pub fn calculate_score(&self, sample: &ParticipantSample) -> Option<ScoreBreakdown> {
        match self.evaluate(sample) {
            Ok(breakdown) => Some(breakdown),
            Err(reason) => {
                debug!(champion = %sample.champion, patch = %sample.patch, %reason, "participant not scored");
                None
            }
        }
    }

    /// Like [`ScoringEngine::calculate_score`] but says why a sample was
    /// rejected.
    pub fn evaluate(&self, sample: &ParticipantSample) -> Result<ScoreBreakdown, Unscoreable> {
        if !(sample.game_duration_secs > 0.0) {
            return Err(Unscoreable::InvalidDuration);
        }
        if !(sample.stats.total_damage_dealt > 0.0) {
            return Err(Unscoreable::MissingDamage);
        }

        let thresholds = &self.profile.thresholds;
        let patch = normalize_patch(&sample.patch);

        let metric_baseline = resolve_baseline(&self.source, &sample.champion, &patch, thresholds.metric_min_games)
            .ok_or_else(|| Unscoreable::InsufficientBaseline {
                champion: sample.champion.clone(),
                patch: patch.clone(),
            })?;
        let build_baseline = resolve_baseline(&self.source, &sample.champion, &patch, thresholds.build_min_games);

        let mut neutral_components = Vec::new();

        let metrics = self.score_metrics(sample, metric_baseline.baseline);
        let performance = weighted_mean(&metrics.iter().map(|m| (m.score, m.weight)).collect::<Vec<_>>())
            .unwrap_or_else(|| {
                neutral_components.push(Component::Performance);
                NEUTRAL_SCORE
            });

        let choices = BuildChoices::extract(sample, &self.catalog);
        let (build_breakdown, matched) = match &build_baseline {
            Some(resolved) => {
                let matched = match_core(choices.core.as_ref(), resolved.baseline, thresholds);
                (self.score_build(&choices, &matched, resolved.baseline), Some(matched))
            }
            None => (BuildBreakdown::default(), None),
        };
        let build = self.build_component(&build_breakdown).unwrap_or_else(|| {
            neutral_components.push(Component::Build);
            NEUTRAL_SCORE
        });

        let timeline = timeline_component(sample).unwrap_or_else(|| {
            neutral_components.push(Component::Timeline);
            NEUTRAL_SCORE
        });

        let kda_breakdown = self.score_kda(sample);
        let kda = weighted_mean(&[
            (kda_breakdown.kill_participation_score, self.profile.kda.kill_participation),
            (kda_breakdown.death_score, self.profile.kda.death_tempo),
        ])
        .unwrap_or_else(|| {
            neutral_components.push(Component::Kda);
            NEUTRAL_SCORE
        });

        let components = ComponentScores {
            performance,
            build,
            timeline,
            kda,
        };
        let final_score = self.compose(&components);

        let provenance = Provenance {
            profile: format!("{}@{}", self.profile.name, self.profile.version),
            metric_patch: metric_baseline.baseline.patch.clone(),
            metric_patch_fallback: metric_baseline.fallback,
            build_patch: build_baseline.as_ref().map(|b| b.baseline.patch.clone()),
            build_patch_fallback: build_baseline.as_ref().map(|b| b.fallback).unwrap_or(false),
            core_key: choices.core.map(|k| k.to_string()),
            core_match: matched.as_ref().map(|m| m.kind),
            merged_cohorts: matched.as_ref().map(|m| m.merged_cohorts).unwrap_or(0),
            timeline_supplied: sample.timeline.is_some(),
            neutral_components,
        };

        Ok(ScoreBreakdown {
            champion: sample.champion.clone(),
            final_score,
            components,
            metrics,
            build: build_breakdown,
            kda: kda_breakdown,
            provenance,
        })
    }

    fn score_metrics(&self, sample: &ParticipantSample, baseline: &ChampionPatchBaseline) -> Vec<MetricScore> {
        let params = &self.profile.transform;
        let weights = &self.profile.metrics;
        let stats = &sample.stats;
        let m = &baseline.metrics;

        let scored = |metric: Metric, raw: f64, stat: &RunningStat, weight: f64, use_log: bool| {
            let s = stat_score(raw, stat.mean, Some(stat), use_log, params);
            MetricScore {
                metric,
                score: s.score,
                weight,
                raw,
                baseline: stat.mean,
                z: s.z,
            }
        };

        let heal_shield = sample.per_minute(stats.healing + stats.shielding);
        let heal_relevance = situational_relevance(&m.heal_shield_per_min, params.heal_shield_activity, params);

        let cc = sample.per_minute(stats.cc_time);
        let cc_metric = match cc_score(cc, &m.cc_per_min, weights.log_crowd_control, params) {
            Some(s) => MetricScore {
                metric: Metric::CrowdControl,
                score: s.score,
                weight: weights.crowd_control
                    * situational_relevance(&m.cc_per_min, params.cc_activity, params),
                raw: cc,
                baseline: m.cc_per_min.mean,
                z: s.z,
            },
            None => MetricScore {
                metric: Metric::CrowdControl,
                score: NEUTRAL_SCORE,
                weight: 0.0,
                raw: cc,
                baseline: m.cc_per_min.mean,
                z: None,
            },
        };

        vec![
            scored(
                Metric::DamageToChampions,
                sample.per_minute(stats.damage_to_champions),
                &m.damage_to_champions_per_min,
                weights.damage_to_champions,
                weights.log_damage,
            ),
            scored(
                Metric::TotalDamage,
                sample.per_minute(stats.total_damage_dealt),
                &m.total_damage_per_min,
                weights.total_damage,
                weights.log_damage,
            ),
            scored(
                Metric::HealShield,
                heal_shield,
                &m.heal_shield_per_min,
                weights.heal_shield * heal_relevance,
                weights.log_heal_shield,
            ),
            cc_metric,
        ]
    }

    fn score_build(
        &self,
        choices: &BuildChoices,
        matched: &CoreMatch<'_>,
        baseline: &ChampionPatchBaseline,
    ) -> BuildBreakdown {
        let ranking = &self.profile.ranking;
        let cohort = matched.cohort.as_ref();
        let core = choices.core.as_ref().filter(|_| matched.is_core_specific());

        let breakdown = BuildBreakdown {
            items: score_items(&choices.items, cohort, core, &ranking.items, ranking)
                .or_else(|| {
                    if matched.is_core_specific() {
                        score_items(&choices.items, &baseline.overall, None, &ranking.items, ranking)
                    } else {
                        None
                    }
                }),
            keystone: choices.keystone.and_then(|k| {
                with_overall_fallback(matched, baseline, |c| {
                    score_choice(&k, &c.runes.primary, &ranking.keystone, ranking)
                })
            }),
            spells: choices.spells.as_ref().and_then(|s| {
                with_overall_fallback(matched, baseline, |c| score_choice(s, &c.spells, &ranking.spells, ranking))
            }),
            skills: choices.skills.as_ref().and_then(|s| {
                with_overall_fallback(matched, baseline, |c| score_choice(s, &c.skills, &ranking.skills, ranking))
            }),
            starting: choices.starting.as_ref().and_then(|s| {
                with_overall_fallback(matched, baseline, |c| {
                    score_choice(s, &c.starting, &ranking.starting, ranking)
                })
            }),
            core: core_quality(matched, baseline, &self.profile.core_quality, ranking),
        };

        trace!(?breakdown, core_match = ?matched.kind, "build scored");
        breakdown
    }

    /// Weighted build score over the categories that produced a result;
    /// unscored categories drop out instead of dragging the mean down.
    /// `None` only when nothing at all could be scored.
    fn build_component(&self, b: &BuildBreakdown) -> Option<f64> {
        let w = &self.profile.build;
        let parts: Vec<(f64, f64)> = [
            (b.items.as_ref().map(|c| c.score), w.items),
            (b.keystone.as_ref().map(|c| c.score), w.keystone),
            (b.spells.as_ref().map(|c| c.score), w.spells),
            (b.skills.as_ref().map(|c| c.score), w.skills),
            (b.core.as_ref().map(|c| c.score), w.core),
            (b.starting.as_ref().map(|c| c.score), w.starting),
        ]
        .into_iter()
        .filter_map(|(score, weight)| score.map(|s| (s, weight)))
        .collect();
        weighted_mean(&parts)
    }

    fn score_kda(&self, sample: &ParticipantSample) -> KdaBreakdown {
        let params = &self.profile.transform;
        let kill_participation = sample.kill_participation();
        let deaths_per_min = sample.deaths_per_minute();
        let death_quality = sample.timeline.and_then(|t| t.death_quality);

        KdaBreakdown {
            kill_participation,
            kill_participation_score: kill_participation_score(kill_participation, params),
            deaths_per_min,
            death_score: death_score(deaths_per_min, death_quality, params),
        }
    }

    fn compose(&self, c: &ComponentScores) -> u8 {
        let w = &self.profile.components;
        let score = weighted_mean(&[
            (c.performance, w.performance),
            (c.build, w.build),
            (c.timeline, w.timeline),
            (c.kda, w.kda),
        ])
        .filter(|s| s.is_finite())
        .unwrap_or(NEUTRAL_SCORE);
        score.round().clamp(0.0, 100.0) as u8
    }
}

/// Mean of whichever timeline quality scores were supplied.
fn timeline_component(sample: &ParticipantSample) -> Option<f64> {
    let timeline = sample.timeline?;
    let values: Vec<f64> = [timeline.kill_quality, timeline.death_quality]
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Scores against the matched cohort; a core-specific cohort that has no
/// data for the category defers to the champion-wide numbers.
fn with_overall_fallback<F>(matched: &CoreMatch<'_>, baseline: &ChampionPatchBaseline, score: F) -> Option<ChoiceScore>
where
    F: Fn(&CoreCohort) -> Option<ChoiceScore>,
{
    score(matched.cohort.as_ref()).or_else(|| {
        if matched.is_core_specific() {
            score(&baseline.overall)
        } else {
            None
        }
    })
}
