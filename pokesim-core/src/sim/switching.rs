//! Switching.

use crate::battle_log::LogRecord;
use crate::data::effects::EffectId;
use crate::data::types::Type;
use crate::data::Dex;
use crate::sim::events;
use crate::sim::handlers;
use crate::sim::layout::*;
use crate::sim::state::{BattleState, MonRef};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchKind {
    Voluntary,
    Forced,
    /// Self-switch from a pivot move (U-turn class).
    Pivot,
}

/// Whether the active Pokemon may leave the field. Trapping never holds a
/// fainted Pokemon in, and Ghosts ignore it.
pub fn can_switch_out(state: &BattleState, m: MonRef, kind: SwitchKind) -> bool {
    if kind == SwitchKind::Forced {
        return true;
    }
    if state.has_volatile(m, Volatiles::TRAPPED) && !state.has_type(m, Type::Ghost) {
        return false;
    }
    true
}

/// Swap the occupant of an active slot. Handles the full lifecycle: the
/// outgoing Pokemon's volatiles, stages and handlers are dropped; the
/// incoming one takes hazards, then registers and fires its switch-in
/// behaviors.
pub fn perform_switch(
    state: &mut BattleState,
    dex: &Dex,
    side: usize,
    active_slot: usize,
    new_team_slot: usize,
) {
    if let Some(old_slot) = state.active_team_slot(side, active_slot) {
        let outgoing = MonRef::new(side, old_slot);
        let had_gas = state
            .active_ability(outgoing)
            .map(|id| dex.ability(id).effect == Some(EffectId::NeutralizingGas))
            .unwrap_or(false);
        state.reset_on_switch_out(outgoing);
        events::unregister_mon(state, outgoing);
        state.set_active(side, active_slot, None);
        if had_gas {
            handlers::abilities::neutralizing_gas_exit(state, dex, outgoing);
        }
    }

    place(state, dex, side, active_slot, new_team_slot);
    let incoming = MonRef::new(side, new_team_slot);
    if !state.is_fainted(incoming) {
        handlers::run_switch_in(state, dex, incoming);
    }
}

/// Put a Pokemon into an active slot: lanes, log, hazards and handler
/// registration, but without firing its switch-in behaviors. Battle start
/// places every lead first and then fires the behaviors in side/slot order,
/// so an Intimidate lead sees the opposing leads.
pub fn place(
    state: &mut BattleState,
    dex: &Dex,
    side: usize,
    active_slot: usize,
    new_team_slot: usize,
) {
    let incoming = MonRef::new(side, new_team_slot);
    state.set_active(side, active_slot, Some(new_team_slot));
    state.set(incoming, P_ENTERED_TURN, state.turn as i32);
    state.set(incoming, P_FALLEN_AT_ENTRY, state.fainted_count(side));
    state.log.push(LogRecord::Switch {
        side,
        slot: new_team_slot,
        species: state.get(incoming, P_SPECIES) as u16,
    });

    // The arriving side's registered hazards fire through the dispatcher,
    // in their fixed priority order. They draw no randomness.
    events::run_hazards_on_switch_in(state, dex, incoming);

    if !state.is_fainted(incoming) {
        events::register_mon(state, dex, incoming);
        // An active Neutralizing Gas suppresses arrivals too.
        let gas_up = state.all_active().into_iter().any(|(_, _, other)| {
            other != incoming
                && state
                    .active_ability(other)
                    .map(|id| dex.ability(id).effect == Some(EffectId::NeutralizingGas))
                    .unwrap_or(false)
        });
        if gas_up {
            state.set(incoming, P_ABILITY_SUPPRESSED, 1);
            events::unregister_ability(state, incoming);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::SAMPLE_DEX;
    use crate::sim::handlers::conditions;
    use crate::sim::state::{FormatDescriptor, PokemonBuild};
    use crate::sim::stats::BoostAxis;

    fn two_mon_side() -> BattleState {
        let dex = &*SAMPLE_DEX;
        let mut state = BattleState::new(FormatDescriptor::singles(), 5);
        state
            .load_team(
                dex,
                0,
                &[
                    PokemonBuild::simple("Garchomp", 50, "Rough Skin", &["Earthquake"]),
                    PokemonBuild::simple("Charizard", 50, "Blaze", &["Flamethrower"]),
                ],
            )
            .unwrap();
        state
            .load_team(dex, 1, &[PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"])])
            .unwrap();
        state.set_active(0, 0, Some(0));
        state.set_active(1, 0, Some(0));
        state
    }

    #[test]
    fn stealth_rock_scales_with_rock_weakness() {
        let dex = &*SAMPLE_DEX;
        let mut state = two_mon_side();
        assert!(conditions::try_start_side(&mut state, dex, 0, SideCondition::StealthRock));
        // Charizard (Fire/Flying) takes 4x Rock: half its max HP.
        perform_switch(&mut state, dex, 0, 0, 1);
        let charizard = MonRef::new(0, 1);
        assert_eq!(state.hp(charizard), state.max_hp(charizard) - state.max_hp(charizard) / 2);
    }

    #[test]
    fn spikes_skip_flyers_and_web_slows_grounded() {
        let dex = &*SAMPLE_DEX;
        let mut state = two_mon_side();
        assert!(conditions::try_start_side(&mut state, dex, 0, SideCondition::Spikes));
        assert!(conditions::try_start_side(&mut state, dex, 0, SideCondition::StickyWeb));
        // Charizard flies over both.
        perform_switch(&mut state, dex, 0, 0, 1);
        let charizard = MonRef::new(0, 1);
        assert_eq!(state.hp(charizard), state.max_hp(charizard));
        assert_eq!(state.stage(charizard, BoostAxis::Spe), 0);
        // Garchomp is grounded: eighth damage plus the Speed drop.
        perform_switch(&mut state, dex, 0, 0, 0);
        let garchomp = MonRef::new(0, 0);
        assert_eq!(state.hp(garchomp), state.max_hp(garchomp) - state.max_hp(garchomp) / 8);
        assert_eq!(state.stage(garchomp, BoostAxis::Spe), -1);
    }

    #[test]
    fn levitating_poison_type_ignores_toxic_spikes() {
        let dex = &*SAMPLE_DEX;
        let mut state = BattleState::new(FormatDescriptor::singles(), 5);
        state
            .load_team(dex, 0, &[PokemonBuild::simple("Primarina", 50, "Torrent", &["Surf"])])
            .unwrap();
        state
            .load_team(dex, 1, &[PokemonBuild::simple("Gengar", 50, "Levitate", &["Shadow Ball"])])
            .unwrap();
        state.set_active(0, 0, Some(0));
        assert!(conditions::try_start_side(&mut state, dex, 1, SideCondition::ToxicSpikes));
        assert!(conditions::try_start_side(&mut state, dex, 1, SideCondition::ToxicSpikes));
        // Gengar levitates over them: no absorption, no poison.
        perform_switch(&mut state, dex, 1, 0, 0);
        assert_eq!(state.side_condition(1, SideCondition::ToxicSpikes), 2);
        assert_eq!(state.status(MonRef::new(1, 0)), StatusKind::None);
    }

    #[test]
    fn switch_out_clears_and_switch_in_registers() {
        let dex = &*SAMPLE_DEX;
        let mut state = two_mon_side();
        let garchomp = MonRef::new(0, 0);
        state.boost(garchomp, BoostAxis::Atk, 2);
        perform_switch(&mut state, dex, 0, 0, 1);
        assert_eq!(state.stage(garchomp, BoostAxis::Atk), 0);
        assert!(!state.is_active(garchomp));
        assert_eq!(state.active_team_slot(0, 0), Some(1));
    }
}
