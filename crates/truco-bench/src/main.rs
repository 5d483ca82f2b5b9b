mod runner;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use truco_bot::Archetype;

use runner::{MatchConfig, run_match};

/// Deterministic self-play harness for the truco engine.
#[derive(Debug, Parser)]
#[command(
    name = "truco-bench",
    author,
    version,
    about = "Archetype-vs-archetype truco self-play"
)]
struct Cli {
    /// Number of games to play.
    #[arg(long, default_value_t = 200)]
    games: usize,

    /// RNG seed for deals and both policies.
    #[arg(long, default_value_t = 20240817)]
    seed: u64,

    /// Archetype for the player seat.
    #[arg(long, value_parser = parse_archetype, default_value = "balanced")]
    player: Archetype,

    /// Archetype for the ai seat.
    #[arg(long, value_parser = parse_archetype, default_value = "aggressive")]
    ai: Archetype,

    /// Write the summary as JSON to this path.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn parse_archetype(raw: &str) -> Result<Archetype, String> {
    match raw.to_ascii_lowercase().as_str() {
        "balanced" => Ok(Archetype::Balanced),
        "aggressive" => Ok(Archetype::Aggressive),
        "cautious" => Ok(Archetype::Cautious),
        "deceptive" => Ok(Archetype::Deceptive),
        other => Err(format!(
            "unknown archetype '{other}' (expected balanced, aggressive, cautious, deceptive)"
        )),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MatchConfig {
        games: cli.games,
        seed: cli.seed,
        player_archetype: cli.player,
        ai_archetype: cli.ai,
    };

    let summary = run_match(&config)?;

    println!(
        "{} games, {} rounds | player ({:?}) {} wins, {} pts | ai ({:?}) {} wins, {} pts",
        summary.games,
        summary.rounds,
        cli.player,
        summary.wins[0],
        summary.points[0],
        cli.ai,
        summary.wins[1],
        summary.points[1],
    );
    println!(
        "envido: {} calls, {} accepted | truco: {} calls, {} folds | flor: {} declarations | {} cases kept",
        summary.envido_calls,
        summary.envido_accepts,
        summary.truco_calls,
        summary.truco_folds,
        summary.flor_declarations,
        summary.cases_retained,
    );

    if let Some(path) = cli.json {
        std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
        println!("summary written to {}", path.display());
    }

    Ok(())
}
