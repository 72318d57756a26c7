//! Parallel battle runner.
//!
//! Drives many seeded battles against one shared registry, each on its own
//! thread via rayon. The engine itself is single-threaded per battle; the
//! runner exists to exercise throughput and to verify the replay contract
//! over whole games.

use anyhow::{bail, Context, Result};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pokesim_core::data::sample::SAMPLE_DEX;
use pokesim_core::data::Dex;
use pokesim_core::engine::{BattleEngine, StepOutcome};
use pokesim_core::sim::battle::Action;
use pokesim_core::sim::state::{FormatDescriptor, PokemonBuild};

#[derive(Clone, Debug)]
pub struct RunnerOptions {
    pub battles: u32,
    pub base_seed: u32,
    pub max_turns: u32,
    pub doubles: bool,
    pub verify_replays: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            battles: 100,
            base_seed: 1,
            max_turns: 200,
            doubles: false,
            verify_replays: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Summary {
    pub battles: u32,
    pub side_a_wins: u32,
    pub side_b_wins: u32,
    pub draws: u32,
    pub unfinished: u32,
    pub total_turns: u64,
    pub replay_mismatches: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct BattleResult {
    seed: u32,
    winner: Option<usize>,
    finished: bool,
    turns: u32,
    log_digest: String,
}

fn demo_team_a() -> Vec<PokemonBuild> {
    vec![
        PokemonBuild::simple(
            "Garchomp",
            50,
            "Rough Skin",
            &["Earthquake", "Dragon Claw", "Swords Dance", "Stealth Rock"],
        ),
        PokemonBuild::simple("Pelipper", 50, "Drizzle", &["Surf", "U-turn", "Tailwind"]),
        PokemonBuild::simple(
            "Kingambit",
            50,
            "Supreme Overlord",
            &["Kowtow Cleave", "Sucker Punch", "Iron Head"],
        )
        .with_item("Leftovers"),
    ]
}

fn demo_team_b() -> Vec<PokemonBuild> {
    vec![
        PokemonBuild::simple(
            "Charizard",
            50,
            "Blaze",
            &["Flamethrower", "Will-O-Wisp", "Protect"],
        )
        .with_item("Heavy-Duty Boots"),
        PokemonBuild::simple("Jolteon", 50, "Volt Absorb", &["Thunderbolt", "Thunder Wave"]),
        PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle", "Recover", "Toxic"]),
    ]
}

/// Run one battle to completion (or the turn cap) with a seeded random
/// policy. The policy RNG is separate from the engine's stream; only the
/// engine seed and the chosen actions matter for replay.
fn play_one(dex: &Dex, seed: u32, max_turns: u32, doubles: bool) -> Result<BattleResult> {
    let format = if doubles {
        FormatDescriptor::doubles()
    } else {
        FormatDescriptor::singles()
    };
    let mut engine = BattleEngine::new(dex, seed, format, &demo_team_a(), &demo_team_b())
        .context("building battle")?;
    let mut policy = SmallRng::seed_from_u64(seed as u64);
    let mut turns = 0;
    let mut finished = false;
    let mut winner = None;

    while turns < max_turns {
        let mut actions = Vec::new();
        for side in 0..2 {
            let legal = engine.legal_actions(side);
            if legal.is_empty() {
                continue;
            }
            // One action per required slot: group the options and pick one
            // for each slot that must act. Two slots may not claim the same
            // switch reserve.
            let mut claimed: Vec<usize> = Vec::new();
            let mut slots: Vec<usize> = legal.iter().map(|a| a.slot()).collect();
            slots.sort_unstable();
            slots.dedup();
            for slot in slots {
                let options: Vec<_> = legal
                    .iter()
                    .filter(|a| a.slot() == slot)
                    .filter(|a| match a {
                        Action::Switch { team_slot, .. } => !claimed.contains(team_slot),
                        _ => true,
                    })
                    .collect();
                if options.is_empty() {
                    continue;
                }
                let pick = options[policy.gen_range(0..options.len())];
                if let Action::Switch { team_slot, .. } = pick {
                    claimed.push(*team_slot);
                }
                actions.push((side, *pick));
            }
        }
        if actions.is_empty() {
            break;
        }
        match engine.step(&actions).context("stepping battle")? {
            StepOutcome::Ended { winner: w } => {
                winner = w;
                finished = true;
                break;
            }
            StepOutcome::AwaitingActions => turns += 1,
            StepOutcome::AwaitingForcedSwitches(_) => {}
        }
    }

    Ok(BattleResult {
        seed,
        winner,
        finished,
        turns,
        log_digest: serde_json::to_string(engine.state().log.records())?,
    })
}

/// Replay verification: a second run with the same seed must reproduce the
/// exact log stream.
fn verify_replay(dex: &Dex, result: &BattleResult, max_turns: u32, doubles: bool) -> Result<bool> {
    let again = play_one(dex, result.seed, max_turns, doubles)?;
    Ok(again.log_digest == result.log_digest)
}

pub fn run(options: &RunnerOptions) -> Result<Summary> {
    if options.battles == 0 {
        bail!("need at least one battle");
    }
    let dex = &*SAMPLE_DEX;
    tracing::info!(battles = options.battles, seed = options.base_seed, "starting batch");

    let results: Vec<Result<(BattleResult, bool)>> = (0..options.battles)
        .into_par_iter()
        .map(|i| {
            let seed = options.base_seed.wrapping_add(i);
            let result = play_one(dex, seed, options.max_turns, options.doubles)?;
            let replay_ok = if options.verify_replays {
                verify_replay(dex, &result, options.max_turns, options.doubles)?
            } else {
                true
            };
            Ok((result, replay_ok))
        })
        .collect();

    let mut summary = Summary {
        battles: options.battles,
        ..Summary::default()
    };
    for item in results {
        let (result, replay_ok) = item?;
        if !replay_ok {
            summary.replay_mismatches += 1;
            tracing::warn!(seed = result.seed, "replay mismatch");
        }
        summary.total_turns += result.turns as u64;
        if !result.finished {
            summary.unfinished += 1;
            continue;
        }
        match result.winner {
            Some(0) => summary.side_a_wins += 1,
            Some(1) => summary.side_b_wins += 1,
            _ => summary.draws += 1,
        }
    }
    tracing::info!(?summary, "batch complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_batch_completes() {
        let summary = run(&RunnerOptions {
            battles: 4,
            base_seed: 10,
            max_turns: 60,
            doubles: false,
            verify_replays: true,
        })
        .unwrap();
        assert_eq!(summary.battles, 4);
        assert_eq!(summary.replay_mismatches, 0);
    }

    #[test]
    fn zero_battles_is_an_error() {
        assert!(run(&RunnerOptions {
            battles: 0,
            ..RunnerOptions::default()
        })
        .is_err());
    }

    #[test]
    fn same_base_seed_same_outcomes() {
        let options = RunnerOptions {
            battles: 3,
            base_seed: 5,
            max_turns: 40,
            doubles: false,
            verify_replays: false,
        };
        let a = run(&options).unwrap();
        let b = run(&options).unwrap();
        assert_eq!(a.side_a_wins, b.side_a_wins);
        assert_eq!(a.side_b_wins, b.side_b_wins);
        assert_eq!(a.total_turns, b.total_turns);
    }
}
