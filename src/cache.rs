use crate::baseline::{BaselineSource, ChampionPatchBaseline};
use crate::error::AppError;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn champion_key(champion: &str) -> String {
    champion.trim().to_lowercase()
}

/// Baselines on disk, one JSON file per champion holding every patch.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        BaselineStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn get_baseline_path(&self, champion: &str) -> PathBuf {
        let file: String = champion_key(champion)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file))
    }

    /// Every stored patch for a champion; empty when nothing is stored yet.
    pub fn load(&self, champion: &str) -> Result<Vec<ChampionPatchBaseline>, AppError> {
        let path = self.get_baseline_path(champion);

        match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                AppError::JsonError(format!("Failed to parse {}: {}", path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    pub fn save(&self, champion: &str, baselines: &[ChampionPatchBaseline]) -> Result<(), AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| AppError::Io {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let path = self.get_baseline_path(champion);
        let json = serde_json::to_string_pretty(baselines).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize baselines: {}", e))
        })?;

        fs::write(&path, json).map_err(|e| AppError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// In-memory baselines keyed by champion and patch. Scoring many
/// participants should prefetch each distinct champion once, then score
/// everything against this cache.
#[derive(Debug, Default, Clone)]
pub struct BaselineCache {
    entries: BTreeMap<String, BTreeMap<String, ChampionPatchBaseline>>,
}

impl BaselineCache {
    pub fn new() -> Self {
        BaselineCache::default()
    }

    pub fn from_baselines(baselines: impl IntoIterator<Item = ChampionPatchBaseline>) -> Self {
        let mut cache = BaselineCache::new();
        for baseline in baselines {
            cache.insert(baseline);
        }
        cache
    }

    pub fn insert(&mut self, baseline: ChampionPatchBaseline) {
        self.entries
            .entry(champion_key(&baseline.champion))
            .or_default()
            .insert(baseline.patch.clone(), baseline);
    }

    pub fn contains_champion(&self, champion: &str) -> bool {
        self.entries.contains_key(&champion_key(champion))
    }

    /// Loads every champion not already cached. Returns how many baselines
    /// were added.
    pub fn prefetch<'a>(
        &mut self,
        store: &BaselineStore,
        champions: impl IntoIterator<Item = &'a str>,
    ) -> Result<usize, AppError> {
        let wanted: BTreeSet<String> = champions
            .into_iter()
            .map(champion_key)
            .filter(|c| !self.entries.contains_key(c))
            .collect();

        let mut loaded = 0;
        for champion in wanted {
            let baselines = store.load(&champion)?;
            debug!(champion = %champion, patches = baselines.len(), "prefetched baselines");
            loaded += baselines.len();
            // Remember misses too so they are not reloaded.
            self.entries.entry(champion).or_default();
            for baseline in baselines {
                self.insert(baseline);
            }
        }
        info!(loaded, "baseline prefetch complete");
        Ok(loaded)
    }

    /// The baseline for a champion/patch, created empty if missing.
    pub fn get_or_create(&mut self, champion: &str, patch: &str) -> &mut ChampionPatchBaseline {
        self.entries
            .entry(champion_key(champion))
            .or_default()
            .entry(patch.to_string())
            .or_insert_with(|| ChampionPatchBaseline::new(champion, patch))
    }

    pub fn champions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn baselines(&self, champion: &str) -> Vec<ChampionPatchBaseline> {
        self.entries
            .get(&champion_key(champion))
            .map(|patches| patches.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn save_all(&self, store: &BaselineStore) -> Result<(), AppError> {
        for champion in self.champions() {
            store.save(champion, &self.baselines(champion))?;
        }
        Ok(())
    }
}

impl BaselineSource for BaselineCache {
    fn get_baseline(&self, champion: &str, patch: &str) -> Option<&ChampionPatchBaseline> {
        self.entries.get(&champion_key(champion))?.get(patch)
    }

    fn patches(&self, champion: &str) -> Vec<String> {
        self.entries
            .get(&champion_key(champion))
            .map(|patches| patches.keys().cloned().collect())
            .unwrap_or_default()
    }
}
