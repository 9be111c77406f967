use crate::build::ChoiceScore;
use crate::scoring::{Component, ScoreBreakdown};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "#")]
    number: String,
    champion: String,
    patch: String,
    score: String,
    core: String,
}

#[derive(Tabled)]
struct MetricRow {
    metric: String,
    value: String,
    baseline: String,
    score: String,
    weight: String,
}

#[derive(Tabled)]
struct BuildRow {
    category: String,
    score: String,
    rank: String,
    games: String,
    confidence: String,
}

fn colored_score(score: u8) -> ColoredString {
    let text = score.to_string();
    match score {
        70..=100 => text.green().bold(),
        45..=69 => text.yellow().bold(),
        _ => text.red().bold(),
    }
}

fn build_row(category: &str, choice: &Option<ChoiceScore>) -> BuildRow {
    match choice {
        Some(c) => BuildRow {
            category: category.to_string(),
            score: format!("{:.1}", c.score),
            rank: match c.rank {
                Some(rank) => format!("#{} of {}", rank, c.ranked_options),
                None if c.off_meta => "off-meta".to_string(),
                None => "-".to_string(),
            },
            games: c.games.to_string(),
            confidence: format!("{:.0}%", c.confidence * 100.0),
        },
        None => BuildRow {
            category: category.to_string(),
            score: "not scored".dimmed().to_string(),
            rank: "-".to_string(),
            games: "-".to_string(),
            confidence: "-".to_string(),
        },
    }
}

pub fn display_breakdown(label: &str, breakdown: &ScoreBreakdown) {
    println!(
        "\n{} {}",
        format!("🎮 {} ({})", label, breakdown.champion).bold().cyan(),
        colored_score(breakdown.final_score)
    );
    println!("{}\n", "=".repeat(60).cyan());

    let c = &breakdown.components;
    println!(
        "{} performance {:.1} | build {:.1} | timeline {:.1} | kda {:.1}\n",
        "📈 Components:".bold(),
        c.performance,
        c.build,
        c.timeline,
        c.kda
    );

    let rows: Vec<MetricRow> = breakdown
        .metrics
        .iter()
        .map(|m| MetricRow {
            metric: m.metric.to_string(),
            value: format!("{:.1}", m.raw),
            baseline: format!("{:.1}", m.baseline),
            score: format!("{:.1}", m.score),
            weight: format!("{:.2}", m.weight),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let b = &breakdown.build;
    let mut rows = vec![
        build_row("Items", &b.items),
        build_row("Keystone", &b.keystone),
        build_row("Spells", &b.spells),
        build_row("Skill order", &b.skills),
        build_row("Starting items", &b.starting),
    ];
    rows.push(match &b.core {
        Some(core) => BuildRow {
            category: "Core".to_string(),
            score: format!("{:.1}", core.score),
            rank: format!("top {}", core.top_core),
            games: "-".to_string(),
            confidence: format!(
                "{:.1}% vs {:.1}%",
                core.player_win_rate * 100.0,
                core.top_win_rate * 100.0
            ),
        },
        None => build_row("Core", &None),
    });
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let kda = &breakdown.kda;
    println!(
        "\n{} kill participation {} ({:.1}) | deaths/min {:.2} ({:.1})",
        "⚔️  KDA:".bold(),
        kda.kill_participation
            .map(|kp| format!("{:.0}%", kp * 100.0))
            .unwrap_or_else(|| "n/a".to_string()),
        kda.kill_participation_score,
        kda.deaths_per_min,
        kda.death_score
    );

    let p = &breakdown.provenance;
    println!("\n{}", "Provenance".bold().yellow());
    println!(
        "• Metrics: patch {}{}",
        p.metric_patch,
        if p.metric_patch_fallback { " (fallback)" } else { "" }
    );
    match &p.build_patch {
        Some(patch) => println!(
            "• Build: patch {}{}",
            patch,
            if p.build_patch_fallback { " (fallback)" } else { "" }
        ),
        None => println!("• Build: {}", "no baseline with enough games".yellow()),
    }
    println!(
        "• Core: {} via {}",
        p.core_key.as_deref().unwrap_or("none"),
        p.core_match
            .map(|k| format!("{:?}", k).to_lowercase())
            .unwrap_or_else(|| "-".to_string())
    );
    if !p.neutral_components.is_empty() {
        let names: Vec<String> = p
            .neutral_components
            .iter()
            .map(|c| component_name(*c).to_string())
            .collect();
        println!("• Neutral (no data): {}", names.join(", "));
    }
    println!("• Profile: {}", p.profile);
    println!();
}

fn component_name(component: Component) -> &'static str {
    match component {
        Component::Performance => "performance",
        Component::Build => "build",
        Component::Timeline => "timeline",
        Component::Kda => "kda",
    }
}

/// One row per sample; unscored samples show why.
pub fn display_summary(results: &[(String, String, Result<u8, String>, Option<String>)]) {
    let scored: Vec<u8> = results
        .iter()
        .filter_map(|(_, _, r, _)| r.as_ref().ok().copied())
        .collect();

    println!("\n{}", format!("📊 SCORES ({} participants)", results.len()).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
    if !scored.is_empty() {
        let mean = scored.iter().map(|&s| s as f64).sum::<f64>() / scored.len() as f64;
        println!(
            "{} {} scored, mean {:.1}\n",
            "📈 Overall:".bold(),
            scored.len().to_string().green(),
            mean
        );
    }

    let rows: Vec<SummaryRow> = results
        .iter()
        .enumerate()
        .map(|(idx, (champion, patch, result, core))| SummaryRow {
            number: format!("{}", idx + 1),
            champion: champion.clone(),
            patch: patch.clone(),
            score: match result {
                Ok(score) => colored_score(*score).to_string(),
                Err(reason) => format!("{} ({})", "unscored".red(), reason),
            },
            core: core.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}\n", table);
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
