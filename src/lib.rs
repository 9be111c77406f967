//! Player quality index: scores one participant's finished game from 0 to
//! 100 against per-champion, per-patch population baselines.

pub mod api;
pub mod baseline;
pub mod build;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod scoring;

pub use baseline::{BaselineSource, ChampionPatchBaseline};
pub use cache::{BaselineCache, BaselineStore};
pub use config::{Config, ScoringProfile};
pub use error::{AppError, Unscoreable};
pub use model::ParticipantSample;
pub use scoring::{ScoreBreakdown, ScoringEngine};
