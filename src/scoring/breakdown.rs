use crate::build::{ChoiceScore, CoreMatchKind, CoreQuality};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    DamageToChampions,
    TotalDamage,
    HealShield,
    CrowdControl,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::DamageToChampions => "Damage to champions / min",
            Metric::TotalDamage => "Total damage / min",
            Metric::HealShield => "Heal + shield / min",
            Metric::CrowdControl => "Crowd control / min",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Performance,
    Build,
    Timeline,
    Kda,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub metric: Metric,
    pub score: f64,
    pub weight: f64,
    pub raw: f64,
    pub baseline: f64,
    pub z: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentScores {
    pub performance: f64,
    pub build: f64,
    pub timeline: f64,
    pub kda: f64,
}

/// Per-category build results; `None` categories were left out of the
/// build component.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BuildBreakdown {
    pub items: Option<ChoiceScore>,
    pub keystone: Option<ChoiceScore>,
    pub spells: Option<ChoiceScore>,
    pub skills: Option<ChoiceScore>,
    pub starting: Option<ChoiceScore>,
    pub core: Option<CoreQuality>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KdaBreakdown {
    pub kill_participation: Option<f64>,
    pub kill_participation_score: f64,
    pub deaths_per_min: f64,
    pub death_score: f64,
}

/// Where the numbers came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Provenance {
    pub profile: String,
    pub metric_patch: String,
    pub metric_patch_fallback: bool,
    pub build_patch: Option<String>,
    pub build_patch_fallback: bool,
    pub core_key: Option<String>,
    pub core_match: Option<CoreMatchKind>,
    pub merged_cohorts: usize,
    pub timeline_supplied: bool,
    /// Components that had no usable input and contributed 50.
    pub neutral_components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub champion: String,
    pub final_score: u8,
    pub components: ComponentScores,
    pub metrics: Vec<MetricScore>,
    pub build: BuildBreakdown,
    pub kda: KdaBreakdown,
    pub provenance: Provenance,
}
