pub mod choices;
pub mod identity;
pub mod items;
pub mod matcher;
pub mod ranker;

pub use choices::BuildChoices;
pub use identity::{resolve_core, CoreKey};
pub use items::{ItemCatalog, BOOTS_SENTINEL, CONSUMABLE_SENTINEL};
pub use matcher::{match_core, CoreMatch, CoreMatchKind};
pub use ranker::{ChoiceScore, CoreQuality};
