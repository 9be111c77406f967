pub mod aggregate;
pub mod model;
pub mod source;
pub mod stats;

pub use model::{ChampionPatchBaseline, CoreCohort, MetricBaselines, RuneStats};
pub use source::{resolve_baseline, BaselineSource, ResolvedBaseline};
pub use stats::{RunningStat, WinStat};
