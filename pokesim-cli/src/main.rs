use anyhow::anyhow;
use std::env;

use pokesim_core::battle_log::LogRecord;
use pokesim_core::data::sample::SAMPLE_DEX;
use pokesim_core::engine::{BattleEngine, StepOutcome};
use pokesim_core::sim::state::{FormatDescriptor, PokemonBuild};

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("check-species") => {
            let name = args
                .next()
                .ok_or_else(|| anyhow!("Usage: pokesim-cli check-species <species>"))?;
            check_species(&name)
        }
        Some("check-move") => {
            let name = args
                .next()
                .ok_or_else(|| anyhow!("Usage: pokesim-cli check-move <move>"))?;
            check_move(&name)
        }
        Some("demo") => {
            let seed = args
                .next()
                .map(|s| s.parse::<u32>())
                .transpose()?
                .unwrap_or(42);
            demo_battle(seed)
        }
        Some("replay-check") => {
            let seed = args
                .next()
                .map(|s| s.parse::<u32>())
                .transpose()?
                .unwrap_or(42);
            replay_check(seed)
        }
        _ => {
            eprintln!("Usage: pokesim-cli <check-species|check-move|demo|replay-check> [...]");
            std::process::exit(1);
        }
    }
}

fn check_species(name: &str) -> anyhow::Result<()> {
    let dex = &*SAMPLE_DEX;
    let id = dex.species_id(name)?;
    let species = dex.species(id);
    println!("{}", serde_json::to_string_pretty(species)?);
    Ok(())
}

fn check_move(name: &str) -> anyhow::Result<()> {
    let dex = &*SAMPLE_DEX;
    let id = dex.move_id(name)?;
    let data = dex.mov(id);
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

fn demo_teams() -> (Vec<PokemonBuild>, Vec<PokemonBuild>) {
    (
        vec![
            PokemonBuild::simple("Gyarados", 50, "Intimidate", &["Aqua Jet", "Crunch"]),
            PokemonBuild::simple("Kingambit", 50, "Supreme Overlord", &["Kowtow Cleave", "Sucker Punch"]),
        ],
        vec![
            PokemonBuild::simple("Charizard", 50, "Blaze", &["Flamethrower", "Protect"]),
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle", "Recover"]),
        ],
    )
}

/// Play out a short scripted battle and print every log record.
fn demo_battle(seed: u32) -> anyhow::Result<()> {
    let dex = &*SAMPLE_DEX;
    let (team_a, team_b) = demo_teams();
    let mut engine = BattleEngine::new(dex, seed, FormatDescriptor::singles(), &team_a, &team_b)?;
    for counter in 0..30usize {
        let mut actions = Vec::new();
        for side in 0..2 {
            let legal = engine.legal_actions(side);
            if legal.is_empty() {
                continue;
            }
            actions.push((side, legal[counter % legal.len()]));
        }
        if actions.is_empty() {
            break;
        }
        if matches!(engine.step(&actions)?, StepOutcome::Ended { .. }) {
            break;
        }
    }
    for record in engine.state().log.records() {
        println!("{}", render(record));
    }
    Ok(())
}

/// Run the same battle twice and confirm the logs match byte for byte.
fn replay_check(seed: u32) -> anyhow::Result<()> {
    let first = capture_log(seed)?;
    let second = capture_log(seed)?;
    if first == second {
        println!("replay ok: {} records, seed {seed}", first.len());
        Ok(())
    } else {
        Err(anyhow!("replay mismatch at seed {seed}"))
    }
}

fn capture_log(seed: u32) -> anyhow::Result<Vec<String>> {
    let dex = &*SAMPLE_DEX;
    let (team_a, team_b) = demo_teams();
    let mut engine = BattleEngine::new(dex, seed, FormatDescriptor::singles(), &team_a, &team_b)?;
    for counter in 0..30usize {
        let mut actions = Vec::new();
        for side in 0..2 {
            let legal = engine.legal_actions(side);
            if legal.is_empty() {
                continue;
            }
            actions.push((side, legal[counter % legal.len()]));
        }
        if actions.is_empty() {
            break;
        }
        if matches!(engine.step(&actions)?, StepOutcome::Ended { .. }) {
            break;
        }
    }
    Ok(engine
        .state()
        .log
        .records()
        .iter()
        .map(|r| serde_json::to_string(r).unwrap_or_default())
        .collect())
}

fn render(record: &LogRecord) -> String {
    serde_json::to_string(record).unwrap_or_else(|_| format!("{record:?}"))
}
