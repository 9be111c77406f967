pub mod breakdown;
pub mod engine;
pub mod transform;

pub use breakdown::{
    BuildBreakdown, Component, ComponentScores, KdaBreakdown, Metric, MetricScore, Provenance,
    ScoreBreakdown,
};
pub use engine::ScoringEngine;
pub use transform::{sigmoid_score, stat_score, StatScore, NEUTRAL_SCORE};
