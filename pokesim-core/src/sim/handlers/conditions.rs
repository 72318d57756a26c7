//! Side- and field-condition behaviors.
//!
//! Conditions live in the packed side/field arrays, but their behavior runs
//! through the dispatcher like every other effect: `try_start_*` installs
//! the value, registers the handlers and fires the start hook; the residual
//! hooks tick the counters (and deal weather damage / terrain healing); the
//! end hooks clear the value and announce it, after which the entries are
//! dropped.

use crate::battle_log::{Cause, LogRecord};
use crate::data::effects::EffectId;
use crate::data::types::{self, Type};
use crate::data::Dex;
use crate::sim::damage::try_apply_status;
use crate::sim::events;
use crate::sim::layout::*;
use crate::sim::state::{BattleState, MonRef};
use crate::sim::stats::BoostAxis;

// --- Side conditions ---------------------------------------------------------

/// Install a side condition (or add a hazard layer). Returns false when it
/// cannot take effect: a timed condition already up, a hazard at its layer
/// cap, or Aurora Veil without snow.
pub fn try_start_side(state: &mut BattleState, dex: &Dex, side: usize, sc: SideCondition) -> bool {
    let current = state.side_condition(side, sc);
    if sc.is_hazard() {
        if current >= sc.cap_or_duration() {
            return false;
        }
        state.set_side_condition(side, sc, current + 1);
        if current == 0 {
            events::register_side_condition(state, sc, side);
        }
    } else {
        if current > 0 {
            return false;
        }
        if sc == SideCondition::AuroraVeil && state.weather() != Weather::Snow {
            return false;
        }
        state.set_side_condition(side, sc, sc.cap_or_duration());
        events::register_side_condition(state, sc, side);
    }
    events::run_side_start(state, dex, side, sc);
    true
}

/// Terminate a side condition: announce the end, then drop its handlers.
pub fn end_side(state: &mut BattleState, dex: &Dex, side: usize, sc: SideCondition) {
    events::run_side_end(state, dex, side, sc);
    events::unregister_side_condition(state, sc, side);
}

/// `on_side_start`: announce the fresh value (turns left, or layer count).
pub fn side_start(state: &mut BattleState, side: usize, sc: SideCondition) {
    state.log.push(LogRecord::SideStart {
        side,
        condition: sc,
        value: state.side_condition(side, sc),
    });
}

/// `on_side_residual`: timed conditions count down and end at zero.
pub fn side_residual(state: &mut BattleState, dex: &Dex, side: usize, sc: SideCondition) {
    let left = state.side_condition(side, sc);
    if left <= 0 {
        return;
    }
    state.set_side_condition(side, sc, left - 1);
    if left == 1 {
        end_side(state, dex, side, sc);
    }
}

/// `on_side_end`: clear the column and announce.
pub fn side_end(state: &mut BattleState, side: usize, sc: SideCondition) {
    state.set_side_condition(side, sc, 0);
    state.log.push(LogRecord::SideEnd { side, condition: sc });
}

/// Entry hazards, fired from the switch-in hook of the arriving side.
/// Deterministic given layer counts and the target; they draw no randomness.
pub fn hazard_switch_in(state: &mut BattleState, dex: &Dex, sc: SideCondition, m: MonRef) {
    if state.has_item_effect(dex, m, EffectId::HeavyDutyBoots) {
        return;
    }
    let side = m.side;
    match sc {
        SideCondition::StealthRock => {
            let (t1, t2, tera) = state.defending_types(m);
            let quarters = types::effectiveness_packed(Type::Rock, t1, t2, tera);
            if quarters > 0 {
                let damage = (state.max_hp(m) * quarters as i32 / 32).max(1);
                state.damage(m, damage, Cause::SideCondition(sc));
            }
        }
        SideCondition::Spikes => {
            if !state.is_grounded(dex, m) {
                return;
            }
            let divisor = match state.side_condition(side, sc) {
                1 => 8,
                2 => 6,
                _ => 4,
            };
            let damage = (state.max_hp(m) / divisor).max(1);
            state.damage(m, damage, Cause::SideCondition(sc));
        }
        SideCondition::ToxicSpikes => {
            if !state.is_grounded(dex, m) {
                return;
            }
            if state.has_type(m, Type::Poison) {
                end_side(state, dex, side, sc);
            } else {
                let status = if state.side_condition(side, sc) >= 2 {
                    StatusKind::Toxic
                } else {
                    StatusKind::Poison
                };
                try_apply_status(state, m, status, true);
            }
        }
        SideCondition::StickyWeb => {
            if state.is_grounded(dex, m) {
                state.boost(m, BoostAxis::Spe, -1);
            }
        }
        _ => {}
    }
}

// --- Field conditions --------------------------------------------------------

fn room_lane(kind: FieldKind) -> Option<usize> {
    match kind {
        FieldKind::TrickRoom => Some(F_TRICK_ROOM),
        FieldKind::MagicRoom => Some(F_MAGIC_ROOM),
        FieldKind::WonderRoom => Some(F_WONDER_ROOM),
        _ => None,
    }
}

/// Install a field condition. Setting a weather or terrain ends the one it
/// replaces; re-setting the identical condition fails.
pub fn try_start_field(state: &mut BattleState, dex: &Dex, kind: FieldKind, turns: i32) -> bool {
    match kind {
        FieldKind::Weather(weather) => {
            if state.weather() == weather {
                return false;
            }
            let old = state.weather();
            if old != Weather::None {
                end_field(state, dex, FieldKind::Weather(old));
            }
            state.set_field(F_WEATHER, weather.id());
            state.set_field(F_WEATHER_TURNS, turns);
        }
        FieldKind::Terrain(terrain) => {
            if state.terrain() == terrain {
                return false;
            }
            let old = state.terrain();
            if old != Terrain::None {
                end_field(state, dex, FieldKind::Terrain(old));
            }
            state.set_field(F_TERRAIN, terrain.id());
            state.set_field(F_TERRAIN_TURNS, turns);
        }
        _ => {
            let lane = room_lane(kind).unwrap();
            if state.field(lane) > 0 {
                return false;
            }
            state.set_field(lane, turns);
        }
    }
    events::register_field_condition(state, kind);
    events::run_field_start(state, dex, kind);
    true
}

/// Terminate a field condition: announce the end, then drop its handlers.
pub fn end_field(state: &mut BattleState, dex: &Dex, kind: FieldKind) {
    events::run_field_end(state, dex, kind);
    events::unregister_field_condition(state, kind);
}

pub fn field_active(state: &BattleState, kind: FieldKind) -> bool {
    match kind {
        FieldKind::Weather(weather) => state.weather() == weather,
        FieldKind::Terrain(terrain) => state.terrain() == terrain,
        _ => state.field(room_lane(kind).unwrap()) > 0,
    }
}

/// `on_field_start`: announce the condition with its remaining turns.
pub fn field_start(state: &mut BattleState, kind: FieldKind) {
    let turns = match kind {
        FieldKind::Weather(_) => state.field(F_WEATHER_TURNS),
        FieldKind::Terrain(_) => state.field(F_TERRAIN_TURNS),
        _ => state.field(room_lane(kind).unwrap()),
    };
    state.log.push(LogRecord::FieldStart {
        kind: kind.name().to_string(),
        turns,
    });
}

/// `on_field_residual`: weather deals its chip damage and terrain heals
/// before the duration ticks; every field condition ends at zero turns.
pub fn field_residual(state: &mut BattleState, dex: &Dex, kind: FieldKind) {
    if !field_active(state, kind) {
        return;
    }
    match kind {
        FieldKind::Weather(weather) => {
            if weather == Weather::Sand {
                for m in events::residual_order(state, dex) {
                    if state.is_fainted(m) {
                        continue;
                    }
                    if state.has_type(m, Type::Rock)
                        || state.has_type(m, Type::Ground)
                        || state.has_type(m, Type::Steel)
                    {
                        continue;
                    }
                    let amount = (state.max_hp(m) / 16).max(1);
                    state.damage(m, amount, Cause::Weather(weather));
                }
            }
            tick_field(state, dex, kind, F_WEATHER_TURNS);
        }
        FieldKind::Terrain(terrain) => {
            if terrain == Terrain::Grassy {
                for m in events::residual_order(state, dex) {
                    if !state.is_fainted(m) && state.is_grounded(dex, m) {
                        let amount = (state.max_hp(m) / 16).max(1);
                        state.heal(m, amount, Cause::Terrain(terrain));
                    }
                }
            }
            tick_field(state, dex, kind, F_TERRAIN_TURNS);
        }
        _ => {
            let lane = room_lane(kind).unwrap();
            tick_field(state, dex, kind, lane);
        }
    }
}

fn tick_field(state: &mut BattleState, dex: &Dex, kind: FieldKind, lane: usize) {
    let left = state.field(lane);
    if left > 0 {
        state.set_field(lane, left - 1);
        if left == 1 {
            end_field(state, dex, kind);
        }
    }
}

/// `on_field_end`: clear the lanes and announce.
pub fn field_end(state: &mut BattleState, kind: FieldKind) {
    match kind {
        FieldKind::Weather(_) => {
            state.set_field(F_WEATHER, Weather::None.id());
            state.set_field(F_WEATHER_TURNS, 0);
        }
        FieldKind::Terrain(_) => {
            state.set_field(F_TERRAIN, Terrain::None.id());
            state.set_field(F_TERRAIN_TURNS, 0);
        }
        _ => {
            state.set_field(room_lane(kind).unwrap(), 0);
        }
    }
    state.log.push(LogRecord::FieldEnd {
        kind: kind.name().to_string(),
    });
}

// --- Volatiles ---------------------------------------------------------------

/// Leech Seed's residual drain: an eighth of the holder's max HP, fed to the
/// first live opposing active.
pub fn leech_seed(state: &mut BattleState, m: MonRef) {
    if state.is_fainted(m) || !state.has_volatile(m, Volatiles::LEECH_SEED) {
        return;
    }
    let amount = (state.max_hp(m) / 8).max(1);
    let drained = state.damage(m, amount, Cause::LeechSeed);
    if drained > 0 {
        if let Some(receiver) = first_live_foe(state, m.side) {
            state.heal(receiver, drained, Cause::LeechSeed);
        }
    }
}

fn first_live_foe(state: &BattleState, side: usize) -> Option<MonRef> {
    for foe_side in 0..state.format.num_sides {
        if foe_side == side {
            continue;
        }
        for a in 0..state.format.active_slots {
            if let Some(slot) = state.active_team_slot(foe_side, a) {
                let m = MonRef::new(foe_side, slot);
                if !state.is_fainted(m) {
                    return Some(m);
                }
            }
        }
    }
    None
}
