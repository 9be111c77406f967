use super::identity::CoreKey;
use crate::baseline::{ChampionPatchBaseline, CoreCohort};
use crate::config::BaselineThresholds;
use serde::Serialize;
use std::borrow::Cow;
use tracing::debug;

/// Which population build choices were compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreMatchKind {
    /// The player's own core had enough games.
    Exact,
    /// Cores sharing two of three items, merged.
    Family,
    /// Core known but neither exact nor family qualified; champion-wide data.
    Global,
    /// Player never completed a core; champion-wide data.
    Unresolved,
}

#[derive(Debug, Clone)]
pub struct CoreMatch<'a> {
    pub kind: CoreMatchKind,
    pub cohort: Cow<'a, CoreCohort>,
    /// Number of cohorts merged into a family match.
    pub merged_cohorts: usize,
}

impl<'a> CoreMatch<'a> {
    fn global(kind: CoreMatchKind, baseline: &'a ChampionPatchBaseline) -> Self {
        CoreMatch {
            kind,
            cohort: Cow::Borrowed(&baseline.overall),
            merged_cohorts: 0,
        }
    }

    pub fn is_core_specific(&self) -> bool {
        matches!(self.kind, CoreMatchKind::Exact | CoreMatchKind::Family)
    }
}

/// Exact cohort, then family merge, then champion-wide statistics. An exact
/// match that clears `min_exact` short-circuits family matching.
pub fn match_core<'a>(
    key: Option<&CoreKey>,
    baseline: &'a ChampionPatchBaseline,
    thresholds: &BaselineThresholds,
) -> CoreMatch<'a> {
    let key = match key {
        Some(key) => key,
        None => return CoreMatch::global(CoreMatchKind::Unresolved, baseline),
    };
    let key_str = key.to_string();

    if let Some(cohort) = baseline.core.get(&key_str) {
        if cohort.games >= thresholds.min_exact {
            return CoreMatch {
                kind: CoreMatchKind::Exact,
                cohort: Cow::Borrowed(cohort),
                merged_cohorts: 1,
            };
        }
    }

    let mut family = CoreCohort::default();
    let mut merged = 0;
    for (other_key, cohort) in &baseline.core {
        if *other_key == key_str {
            continue;
        }
        let shares_two = other_key
            .parse::<CoreKey>()
            .map(|other| other.overlap(key) >= 2)
            .unwrap_or(false);
        if shares_two {
            family += cohort;
            merged += 1;
        }
    }

    if merged > 0 && family.games >= thresholds.min_family {
        debug!(core = %key, merged, games = family.games, "using core family");
        return CoreMatch {
            kind: CoreMatchKind::Family,
            cohort: Cow::Owned(family),
            merged_cohorts: merged,
        };
    }

    debug!(core = %key, "no core cohort qualified, using champion-wide data");
    CoreMatch::global(CoreMatchKind::Global, baseline)
}
