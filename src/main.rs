use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use league_score::api::models::{MatchDto, TimelineDto};
use league_score::build::ItemCatalog;
use league_score::display::output::{
    display_breakdown, display_error, display_info, display_success, display_summary,
};
use league_score::model::normalize_patch;
use league_score::{BaselineCache, BaselineStore, Config, ParticipantSample, ScoreBreakdown, ScoringEngine, ScoringProfile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "League Score")]
#[command(about = "Score a player's game against champion and patch baselines", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score participant samples against stored baselines
    Score {
        /// Sample files (one sample or an array of samples per file)
        #[arg(required = true)]
        samples: Vec<PathBuf>,

        /// Baseline directory (default: <data dir>/baselines)
        #[arg(long)]
        baselines: Option<PathBuf>,

        /// Scoring profile TOML (default: built-in profile)
        #[arg(long)]
        profile: Option<PathBuf>,

        /// Print breakdowns as JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Convert a match and its timeline into participant samples
    Convert {
        /// Match JSON file
        #[arg(long = "match")]
        match_file: PathBuf,

        /// Timeline JSON file
        #[arg(long)]
        timeline: Option<PathBuf>,

        /// Only convert this participant
        #[arg(long)]
        puuid: Option<String>,

        /// Write samples here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Fold samples into the stored baselines
    Aggregate {
        #[arg(required = true)]
        samples: Vec<PathBuf>,

        #[arg(long)]
        baselines: Option<PathBuf>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SampleFile {
    Many(Vec<ParticipantSample>),
    One(ParticipantSample),
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    source: String,
    champion: &'a str,
    patch: &'a str,
    score: Option<ScoreBreakdown>,
    reason: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_env()?;
    config.logging.init();

    match args.command {
        Command::Score {
            samples,
            baselines,
            profile,
            json,
        } => score(&config, &samples, baselines, profile, json),
        Command::Convert {
            match_file,
            timeline,
            puuid,
            out,
        } => convert(&match_file, timeline.as_deref(), puuid.as_deref(), out.as_deref()),
        Command::Aggregate { samples, baselines } => aggregate(&config, &samples, baselines),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Samples tagged with the file they came from.
fn load_samples(paths: &[PathBuf]) -> Result<Vec<(String, ParticipantSample)>> {
    let mut samples = Vec::new();
    for path in paths {
        let source = path.display().to_string();
        match read_json::<SampleFile>(path)? {
            SampleFile::One(sample) => samples.push((source, sample)),
            SampleFile::Many(many) => {
                samples.extend(many.into_iter().map(|s| (source.clone(), s)));
            }
        }
    }
    Ok(samples)
}

fn load_catalog(config: &Config) -> Result<ItemCatalog> {
    match &config.item_catalog_path {
        Some(path) => Ok(ItemCatalog::load(path)?),
        None => Ok(ItemCatalog::default()),
    }
}

fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}

fn score(
    config: &Config,
    paths: &[PathBuf],
    baselines: Option<PathBuf>,
    profile: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let profile = match profile {
        Some(path) => ScoringProfile::load(&path)?,
        None => config.load_profile()?,
    };
    let store = BaselineStore::new(baselines.unwrap_or_else(|| config.baselines_dir()));
    let samples = load_samples(paths)?;

    // One load per distinct champion, then score everything from memory.
    let mut cache = BaselineCache::new();
    cache
        .prefetch(&store, samples.iter().map(|(_, s)| s.champion.as_str()))
        .with_context(|| format!("Failed to load baselines from {}", store.dir().display()))?;

    info!(profile = %profile.name, version = profile.version, samples = samples.len(), "scoring");
    let engine = ScoringEngine::new(cache)
        .with_profile(profile)
        .with_catalog(load_catalog(config)?);

    let pb = progress_bar(samples.len(), "Scoring");
    let results: Vec<_> = samples
        .iter()
        .map(|(source, sample)| {
            let result = engine.evaluate(sample);
            pb.inc(1);
            (source, sample, result)
        })
        .collect();
    pb.finish_and_clear();

    if json {
        let out: Vec<ScoreOutput> = results
            .into_iter()
            .map(|(source, sample, result)| {
                let (score, reason) = match result {
                    Ok(breakdown) => (Some(breakdown), None),
                    Err(reason) => (None, Some(reason.to_string())),
                };
                ScoreOutput {
                    source: source.clone(),
                    champion: &sample.champion,
                    patch: &sample.patch,
                    score,
                    reason,
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let mut summary = Vec::new();
    for (source, sample, result) in &results {
        match result {
            Ok(breakdown) => {
                display_breakdown(source, breakdown);
                summary.push((
                    sample.champion.clone(),
                    sample.patch.clone(),
                    Ok(breakdown.final_score),
                    breakdown.provenance.core_key.clone(),
                ));
            }
            Err(reason) => {
                warn!(source = %source, champion = %sample.champion, %reason, "sample not scored");
                summary.push((sample.champion.clone(), sample.patch.clone(), Err(reason.to_string()), None));
            }
        }
    }
    display_summary(&summary);
    Ok(())
}

fn convert(
    match_file: &Path,
    timeline: Option<&Path>,
    puuid: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    let match_data: MatchDto = read_json(match_file)?;
    let timeline: Option<TimelineDto> = timeline.map(|p| read_json(p)).transpose()?;

    let samples = match puuid {
        Some(puuid) => vec![match_data.participant_sample(puuid, timeline.as_ref())?],
        None => match_data.participant_samples(timeline.as_ref()),
    };
    let json = serde_json::to_string_pretty(&samples)?;

    match out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            display_success(&format!("Wrote {} samples to {}", samples.len(), path.display()));
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn aggregate(config: &Config, paths: &[PathBuf], baselines: Option<PathBuf>) -> Result<()> {
    let store = BaselineStore::new(baselines.unwrap_or_else(|| config.baselines_dir()));
    let catalog = load_catalog(config)?;
    let samples = load_samples(paths)?;

    let mut cache = BaselineCache::new();
    cache.prefetch(&store, samples.iter().map(|(_, s)| s.champion.as_str()))?;

    let pb = progress_bar(samples.len(), "Aggregating");
    let mut recorded = 0;
    for (source, sample) in &samples {
        let patch = normalize_patch(&sample.patch);
        if cache.get_or_create(&sample.champion, &patch).record(sample, &catalog) {
            recorded += 1;
        } else {
            warn!(source = %source, champion = %sample.champion, "skipped sample without a usable duration");
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    cache.save_all(&store)?;
    display_info(&format!("Baselines stored in {}", store.dir().display()));
    display_success(&format!("Recorded {} of {} samples", recorded, samples.len()));
    Ok(())
}
