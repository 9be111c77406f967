pub mod patch;
pub mod sample;

pub use patch::{compare_patches, normalize_patch, PatchVersion};
pub use sample::{ItemPurchase, ParticipantSample, RawStats, RuneSelection, TimelineQuality};
