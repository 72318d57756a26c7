//! Faint processing and battle-end detection.

use crate::data::Dex;
use crate::sim::events;
use crate::sim::state::{BattleState, MonRef};

/// Drain the faint queue: fire `on_faint` handlers (which may queue further
/// faints, e.g. Aftermath), bump the side counters and drop the fainted
/// Pokemon's handlers. Active slots stay pointed at the fainted Pokemon
/// until the forced-switch phase restores them.
pub fn process_faints(state: &mut BattleState, dex: &Dex, source: Option<(MonRef, bool)>) {
    let mut processed: Vec<MonRef> = Vec::new();
    while let Some(m) = pop_front(state) {
        if processed.contains(&m) {
            continue;
        }
        processed.push(m);
        events::run_faint(state, dex, m, source);
        state.record_faint(m);
        events::unregister_mon(state, m);
    }
}

fn pop_front(state: &mut BattleState) -> Option<MonRef> {
    if state.faint_queue.is_empty() {
        None
    } else {
        Some(state.faint_queue.remove(0))
    }
}

/// `None` while the battle continues; `Some(None)` for a draw, `Some(side)`
/// for a winner. The battle ends the instant any side is wiped.
pub fn battle_outcome(state: &BattleState) -> Option<Option<usize>> {
    let wiped: Vec<bool> = (0..state.format.num_sides)
        .map(|side| state.side_wiped(side))
        .collect();
    let standing: Vec<usize> = wiped
        .iter()
        .enumerate()
        .filter(|(_, &w)| !w)
        .map(|(i, _)| i)
        .collect();
    match standing.len() {
        0 => Some(None),
        1 if wiped.iter().any(|&w| w) => Some(Some(standing[0])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle_log::Cause;
    use crate::data::sample::SAMPLE_DEX;
    use crate::sim::state::{FormatDescriptor, PokemonBuild};

    fn one_v_one() -> BattleState {
        let dex = &*SAMPLE_DEX;
        let mut state = BattleState::new(FormatDescriptor::singles(), 9);
        state
            .load_team(dex, 0, &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])])
            .unwrap();
        state
            .load_team(dex, 1, &[PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle"])])
            .unwrap();
        state.set_active(0, 0, Some(0));
        state.set_active(1, 0, Some(0));
        state
    }

    #[test]
    fn outcome_none_while_both_stand() {
        let state = one_v_one();
        assert_eq!(battle_outcome(&state), None);
    }

    #[test]
    fn wiping_one_side_ends_the_battle() {
        let dex = &*SAMPLE_DEX;
        let mut state = one_v_one();
        let pikachu = MonRef::new(0, 0);
        state.damage(pikachu, 9999, Cause::Struggle);
        process_faints(&mut state, dex, None);
        assert_eq!(state.fainted_count(0), 1);
        assert_eq!(battle_outcome(&state), Some(Some(1)));
    }

    #[test]
    fn double_wipe_is_a_draw() {
        let dex = &*SAMPLE_DEX;
        let mut state = one_v_one();
        state.damage(MonRef::new(0, 0), 9999, Cause::Struggle);
        state.damage(MonRef::new(1, 0), 9999, Cause::Struggle);
        process_faints(&mut state, dex, None);
        assert_eq!(battle_outcome(&state), Some(None));
    }

    #[test]
    fn faint_counter_is_monotone() {
        let dex = &*SAMPLE_DEX;
        let mut state = one_v_one();
        state.damage(MonRef::new(1, 0), 9999, Cause::Struggle);
        process_faints(&mut state, dex, None);
        let after_first = state.fainted_count(1);
        process_faints(&mut state, dex, None);
        assert_eq!(state.fainted_count(1), after_first);
    }
}
