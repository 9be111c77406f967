use super::model::ChampionPatchBaseline;
use crate::model::compare_patches;
use tracing::debug;

/// Read access to stored baselines. The engine only ever reads through
/// this trait, so fixtures and caches are interchangeable.
pub trait BaselineSource {
    fn get_baseline(&self, champion: &str, patch: &str) -> Option<&ChampionPatchBaseline>;

    /// Every patch with a stored baseline for the champion, in any order.
    fn patches(&self, champion: &str) -> Vec<String>;
}

impl<T: BaselineSource + ?Sized> BaselineSource for &T {
    fn get_baseline(&self, champion: &str, patch: &str) -> Option<&ChampionPatchBaseline> {
        (**self).get_baseline(champion, patch)
    }

    fn patches(&self, champion: &str) -> Vec<String> {
        (**self).patches(champion)
    }
}

/// A baseline chosen by the patch-fallback policy.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedBaseline<'a> {
    pub baseline: &'a ChampionPatchBaseline,
    /// True when the sample's own patch was missing or too small.
    pub fallback: bool,
}

/// Exact patch if it has at least `min_games`, else the most recent patch
/// that does, else nothing.
pub fn resolve_baseline<'a, S>(
    source: &'a S,
    champion: &str,
    patch: &str,
    min_games: u64,
) -> Option<ResolvedBaseline<'a>>
where
    S: BaselineSource + ?Sized,
{
    if let Some(baseline) = source.get_baseline(champion, patch) {
        if baseline.games >= min_games {
            return Some(ResolvedBaseline {
                baseline,
                fallback: false,
            });
        }
    }

    let mut patches = source.patches(champion);
    patches.sort_by(|a, b| compare_patches(b, a));

    let resolved = patches
        .iter()
        .filter(|p| p.as_str() != patch)
        .filter_map(|p| source.get_baseline(champion, p))
        .find(|b| b.games >= min_games);

    match resolved {
        Some(baseline) => {
            debug!(
                champion,
                requested = patch,
                used = %baseline.patch,
                min_games,
                "falling back to most recent reliable patch"
            );
            Some(ResolvedBaseline {
                baseline,
                fallback: true,
            })
        }
        None => {
            debug!(champion, patch, min_games, "no reliable baseline");
            None
        }
    }
}
