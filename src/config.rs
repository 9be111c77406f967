use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub profile_path: Option<PathBuf>,
    pub item_catalog_path: Option<PathBuf>,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_dir = match env::var("LEAGUE_SCORE_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::home_dir()
                .ok_or_else(|| {
                    AppError::ConfigError(
                        "LEAGUE_SCORE_DATA_DIR not set and no home directory found".to_string(),
                    )
                })?
                .join(".league_score"),
        };

        let profile_path = env::var("LEAGUE_SCORE_PROFILE").ok().map(PathBuf::from);
        let item_catalog_path = env::var("LEAGUE_SCORE_ITEMS").ok().map(PathBuf::from);

        let logging = LoggingConfig {
            level: env::var("LEAGUE_SCORE_LOG").unwrap_or_else(|_| "warn".to_string()),
            format: env::var("LEAGUE_SCORE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        Ok(Config {
            data_dir,
            profile_path,
            item_catalog_path,
            logging,
        })
    }

    pub fn baselines_dir(&self) -> PathBuf {
        self.data_dir.join("baselines")
    }

    /// The configured profile, or the built-in default when none is set.
    pub fn load_profile(&self) -> Result<ScoringProfile, AppError> {
        match &self.profile_path {
            Some(path) => ScoringProfile::load(path),
            None => Ok(ScoringProfile::default()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
            _ => {
                fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "pretty".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentWeights {
    pub performance: f64,
    pub build: f64,
    pub timeline: f64,
    pub kda: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        ComponentWeights {
            performance: 0.45,
            build: 0.25,
            timeline: 0.10,
            kda: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub damage_to_champions: f64,
    pub total_damage: f64,
    pub heal_shield: f64,
    pub crowd_control: f64,
    pub log_damage: bool,
    pub log_heal_shield: bool,
    pub log_crowd_control: bool,
}

impl Default for MetricWeights {
    fn default() -> Self {
        MetricWeights {
            damage_to_champions: 1.0,
            total_damage: 0.6,
            heal_shield: 1.0,
            crowd_control: 1.0,
            log_damage: false,
            log_heal_shield: true,
            log_crowd_control: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildWeights {
    pub items: f64,
    pub keystone: f64,
    pub spells: f64,
    pub skills: f64,
    pub core: f64,
    pub starting: f64,
}

impl Default for BuildWeights {
    fn default() -> Self {
        BuildWeights {
            items: 0.30,
            keystone: 0.15,
            spells: 0.10,
            skills: 0.15,
            core: 0.20,
            starting: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdaWeights {
    pub kill_participation: f64,
    pub death_tempo: f64,
}

impl Default for KdaWeights {
    fn default() -> Self {
        KdaWeights {
            kill_participation: 0.5,
            death_tempo: 0.5,
        }
    }
}

/// Minimum sample sizes for trusting a baseline or a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineThresholds {
    pub metric_min_games: u64,
    pub build_min_games: u64,
    pub min_exact: u64,
    pub min_family: u64,
}

impl Default for BaselineThresholds {
    fn default() -> Self {
        BaselineThresholds {
            metric_min_games: 2_000,
            build_min_games: 500,
            min_exact: 10,
            min_family: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    pub sigmoid_k: f64,
    pub min_sample: u64,
    /// Std dev must exceed this fraction of the mean to use a z-score.
    pub meaningful_spread: f64,
    pub assumed_relative_std: f64,
    pub max_cv: f64,
    /// Seconds of CC per minute below which CC is not scored.
    pub cc_activity: f64,
    pub heal_shield_activity: f64,
    pub high_cv: f64,
    pub high_cv_boost: f64,
    pub situational_floor: f64,
    pub situational_ceiling: f64,
    pub death_band_low: f64,
    pub death_band_high: f64,
    pub passive_penalty: f64,
    pub excess_death_slope: f64,
    pub max_death_relief: f64,
    pub kp_optimal: f64,
    pub kp_exponent: f64,
}

impl Default for TransformParams {
    fn default() -> Self {
        TransformParams {
            sigmoid_k: 1.2,
            min_sample: 30,
            meaningful_spread: 0.05,
            assumed_relative_std: 0.35,
            max_cv: 1.5,
            cc_activity: 0.5,
            heal_shield_activity: 150.0,
            high_cv: 1.0,
            high_cv_boost: 1.25,
            situational_floor: 0.4,
            situational_ceiling: 0.8,
            death_band_low: 0.10,
            death_band_high: 0.20,
            passive_penalty: 25.0,
            excess_death_slope: 250.0,
            max_death_relief: 0.5,
            kp_optimal: 0.9,
            kp_exponent: 0.7,
        }
    }
}

/// Per-category knobs for choice ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryParams {
    pub min_sample: u64,
    pub max_penalty: f64,
    pub off_meta_penalty: f64,
    /// Purchase-slot tolerance; only meaningful for items.
    pub position_window: u8,
}

impl CategoryParams {
    pub const fn new(min_sample: u64, max_penalty: f64, off_meta_penalty: f64, position_window: u8) -> Self {
        CategoryParams {
            min_sample,
            max_penalty,
            off_meta_penalty,
            position_window,
        }
    }
}

impl Default for CategoryParams {
    fn default() -> Self {
        CategoryParams::new(10, 40.0, 15.0, 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingParams {
    pub wilson_z: f64,
    pub small_pickrate_bonus: f64,
    pub distance_scale: f64,
    pub distance_floor: f64,
    pub full_confidence: u64,
    pub items: CategoryParams,
    pub keystone: CategoryParams,
    pub spells: CategoryParams,
    pub skills: CategoryParams,
    pub starting: CategoryParams,
}

impl Default for RankingParams {
    fn default() -> Self {
        RankingParams {
            wilson_z: 1.96,
            small_pickrate_bonus: 0.01,
            distance_scale: 800.0,
            distance_floor: 20.0,
            full_confidence: 30,
            items: CategoryParams::new(10, 50.0, 20.0, 1),
            keystone: CategoryParams::new(10, 40.0, 15.0, 0),
            spells: CategoryParams::new(10, 30.0, 10.0, 0),
            skills: CategoryParams::new(10, 40.0, 15.0, 0),
            starting: CategoryParams::new(10, 25.0, 10.0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreQualityParams {
    pub min_games: u64,
    /// Cores this far below the champion's win rate are treated as noise.
    pub noise_margin: f64,
    pub gap_scale: f64,
    pub max_penalty: f64,
}

impl Default for CoreQualityParams {
    fn default() -> Self {
        CoreQualityParams {
            min_games: 20,
            noise_margin: 0.05,
            gap_scale: 500.0,
            max_penalty: 40.0,
        }
    }
}

/// Versioned weight table. Every tunable constant of the scoring model
/// lives here so formula revisions are a data change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    pub name: String,
    pub version: u32,
    pub components: ComponentWeights,
    pub metrics: MetricWeights,
    pub build: BuildWeights,
    pub kda: KdaWeights,
    pub thresholds: BaselineThresholds,
    pub transform: TransformParams,
    pub ranking: RankingParams,
    pub core_quality: CoreQualityParams,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        ScoringProfile {
            name: "default".to_string(),
            version: 3,
            components: ComponentWeights::default(),
            metrics: MetricWeights::default(),
            build: BuildWeights::default(),
            kda: KdaWeights::default(),
            thresholds: BaselineThresholds::default(),
            transform: TransformParams::default(),
            ranking: RankingParams::default(),
            core_quality: CoreQualityParams::default(),
        }
    }
}

impl ScoringProfile {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| AppError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, AppError> {
        let profile: ScoringProfile = toml::from_str(content)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let c = &self.components;
        let weights = [
            ("components.performance", c.performance),
            ("components.build", c.build),
            ("components.timeline", c.timeline),
            ("components.kda", c.kda),
            ("metrics.damage_to_champions", self.metrics.damage_to_champions),
            ("metrics.total_damage", self.metrics.total_damage),
            ("metrics.heal_shield", self.metrics.heal_shield),
            ("metrics.crowd_control", self.metrics.crowd_control),
            ("build.items", self.build.items),
            ("build.keystone", self.build.keystone),
            ("build.spells", self.build.spells),
            ("build.skills", self.build.skills),
            ("build.core", self.build.core),
            ("build.starting", self.build.starting),
            ("kda.kill_participation", self.kda.kill_participation),
            ("kda.death_tempo", self.kda.death_tempo),
        ];

        if let Some((field, value)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(AppError::ConfigError(format!(
                "{} must be a non-negative number, got {}",
                field, value
            )));
        }

        if c.performance + c.build + c.timeline + c.kda <= 0.0 {
            return Err(AppError::ConfigError(
                "at least one component weight must be positive".to_string(),
            ));
        }

        if self.transform.sigmoid_k <= 0.0 {
            return Err(AppError::ConfigError("transform.sigmoid_k must be positive".to_string()));
        }

        Ok(())
    }
}
