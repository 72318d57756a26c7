//! Ability behaviors.

use crate::battle_log::{Cause, LogRecord};
use crate::data::effects::EffectId;
use crate::data::moves::MoveCategory;
use crate::data::types::Type;
use crate::data::Dex;
use crate::sim::events::{self, MoveCtx};
use crate::sim::handlers::conditions;
use crate::sim::layout::{
    FieldKind, StatusKind, Weather, P_ABILITY_SUPPRESSED, P_FALLEN_AT_ENTRY, P_FLASH_FIRE,
    P_STAT_DEF, P_STAT_SPD,
};
use crate::sim::state::{BattleState, MonRef};
use crate::sim::stats::BoostAxis;

fn ability_cause(state: &BattleState, holder: MonRef) -> Cause {
    Cause::Ability(state.active_ability(holder).unwrap_or(0))
}

fn log_activation(state: &mut BattleState, holder: MonRef) {
    if let Some(ability) = state.active_ability(holder) {
        state.log.push(LogRecord::AbilityActivate {
            side: holder.side,
            slot: holder.slot,
            ability,
        });
    }
}

// --- Switch-in --------------------------------------------------------------

/// Lowers every adjacent foe's Attack one stage, foe slot order. Draws no RNG.
pub fn intimidate(state: &mut BattleState, m: MonRef) {
    log_activation(state, m);
    for foe_side in 0..state.format.num_sides {
        if foe_side == m.side {
            continue;
        }
        for a in 0..state.format.active_slots {
            if let Some(slot) = state.active_team_slot(foe_side, a) {
                let foe = MonRef::new(foe_side, slot);
                if !state.is_fainted(foe) {
                    state.boost(foe, BoostAxis::Atk, -1);
                }
            }
        }
    }
}

/// Raises Atk or SpA by comparing the foes' summed Def and SpD.
pub fn download(state: &mut BattleState, m: MonRef) {
    let mut def_total = 0;
    let mut spd_total = 0;
    for foe_side in 0..state.format.num_sides {
        if foe_side == m.side {
            continue;
        }
        for a in 0..state.format.active_slots {
            if let Some(slot) = state.active_team_slot(foe_side, a) {
                let foe = MonRef::new(foe_side, slot);
                if !state.is_fainted(foe) {
                    def_total += state.get(foe, P_STAT_DEF);
                    spd_total += state.get(foe, P_STAT_SPD);
                }
            }
        }
    }
    log_activation(state, m);
    if spd_total < def_total {
        state.boost(m, BoostAxis::Spa, 1);
    } else {
        state.boost(m, BoostAxis::Atk, 1);
    }
}

/// Drizzle/Drought/Sand Stream/Snow Warning: five turns of weather unless it
/// is already up. Goes through the field-condition lifecycle so the weather
/// registers its own residual handlers.
pub fn set_entry_weather(state: &mut BattleState, dex: &Dex, m: MonRef, weather: Weather) {
    if state.weather() == weather {
        return;
    }
    log_activation(state, m);
    conditions::try_start_field(state, dex, FieldKind::Weather(weather), 5);
}

/// Suppresses every other active ability while the holder stays in.
pub fn neutralizing_gas_enter(state: &mut BattleState, m: MonRef) {
    log_activation(state, m);
    for (_, _, other) in state.all_active() {
        if other != m {
            state.set(other, P_ABILITY_SUPPRESSED, 1);
            events::unregister_ability(state, other);
        }
    }
}

/// When the Neutralizing Gas holder leaves, suppressed abilities come back
/// and re-register.
pub fn neutralizing_gas_exit(state: &mut BattleState, dex: &Dex, departed: MonRef) {
    for (_, _, other) in state.all_active() {
        if other == departed {
            continue;
        }
        if state.get(other, P_ABILITY_SUPPRESSED) != 0 {
            state.set(other, P_ABILITY_SUPPRESSED, 0);
            events::register_ability(state, dex, other);
        }
    }
}

// --- on_try_hit -------------------------------------------------------------

/// Blocks status moves from anyone else.
pub fn good_as_gold(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) -> Option<Cause> {
    if ctx.category == MoveCategory::Status && ctx.attacker != holder {
        log_activation(state, holder);
        return Some(ability_cause(state, holder));
    }
    None
}

/// Absorbs Fire moves and primes the holder's own Fire attacks.
pub fn flash_fire(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) -> Option<Cause> {
    if ctx.move_type == Type::Fire && ctx.attacker != holder {
        log_activation(state, holder);
        state.set(holder, P_FLASH_FIRE, 1);
        return Some(ability_cause(state, holder));
    }
    None
}

/// Volt/Water Absorb: heal a quarter instead of taking the hit.
pub fn absorb(
    state: &mut BattleState,
    holder: MonRef,
    ctx: &MoveCtx,
    absorbed: Type,
) -> Option<Cause> {
    if ctx.move_type == absorbed && ctx.attacker != holder {
        log_activation(state, holder);
        let amount = state.max_hp(holder) / 4;
        let cause = ability_cause(state, holder);
        state.heal(holder, amount, cause);
        return Some(cause);
    }
    None
}

/// Ground immunity, unless an Iron Ball keeps the holder down.
pub fn levitate(
    state: &mut BattleState,
    dex: &Dex,
    holder: MonRef,
    ctx: &MoveCtx,
) -> Option<Cause> {
    if ctx.move_type == Type::Ground
        && ctx.category != MoveCategory::Status
        && !state.has_item_effect(dex, holder, EffectId::IronBall)
    {
        log_activation(state, holder);
        return Some(ability_cause(state, holder));
    }
    None
}

// --- Stat / power modifiers -------------------------------------------------

pub fn guts_atk(state: &BattleState, holder: MonRef) -> Option<u32> {
    match state.status(holder) {
        StatusKind::None | StatusKind::Fainted => None,
        _ => Some(6144),
    }
}

pub fn technician(ctx: &MoveCtx) -> Option<u32> {
    if ctx.base_power > 0 && ctx.base_power <= 60 {
        Some(6144)
    } else {
        None
    }
}

/// Base-power boost per fallen ally recorded at switch-in:
/// 4096/4506/4915/5325/5734/6144 for 0..=5.
pub fn supreme_overlord(state: &BattleState, holder: MonRef) -> Option<u32> {
    const POWER_MODS: [u32; 6] = [4096, 4506, 4915, 5325, 5734, 6144];
    let fallen = state.get(holder, P_FALLEN_AT_ENTRY).clamp(0, 5) as usize;
    if fallen == 0 {
        None
    } else {
        Some(POWER_MODS[fallen])
    }
}

/// 5325/4096 on moves with a secondary; the pipeline drops those secondaries.
pub fn sheer_force(ctx: &MoveCtx, dex: &Dex) -> Option<u32> {
    match dex.get_move(ctx.move_id) {
        Some(data) if !data.secondaries.is_empty() => Some(5325),
        _ => None,
    }
}

// --- on_damaging_hit --------------------------------------------------------

/// Contact attackers lose an eighth of their max HP.
pub fn rough_skin(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) {
    if !ctx.contact || state.is_fainted(ctx.attacker) {
        return;
    }
    log_activation(state, holder);
    let amount = (state.max_hp(ctx.attacker) / 8).max(1);
    let cause = ability_cause(state, holder);
    state.damage(ctx.attacker, amount, cause);
}

/// 30% to paralyze a contact attacker. Always draws exactly one roll per
/// contact hit so the stream stays aligned.
pub fn static_contact(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) {
    if !ctx.contact || state.is_fainted(ctx.attacker) {
        return;
    }
    let triggered = state.prng.chance(30, 100);
    if !triggered {
        return;
    }
    let attacker = ctx.attacker;
    if state.status(attacker) != StatusKind::None {
        return;
    }
    if crate::sim::damage::status_type_immune(state, attacker, StatusKind::Paralysis) {
        return;
    }
    log_activation(state, holder);
    state.set_status(attacker, StatusKind::Paralysis, 0);
}

/// Hit by Fire or Water: Speed jumps to +6.
pub fn steam_engine(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) {
    if ctx.move_type == Type::Fire || ctx.move_type == Type::Water {
        log_activation(state, holder);
        state.boost(holder, BoostAxis::Spe, 6);
    }
}

// --- on_faint ---------------------------------------------------------------

/// Contact knockouts cost the attacker a quarter of its max HP.
pub fn aftermath(state: &mut BattleState, holder: MonRef, source: Option<(MonRef, bool)>) {
    let Some((attacker, contact)) = source else {
        return;
    };
    if !contact || state.is_fainted(attacker) {
        return;
    }
    log_activation(state, holder);
    let amount = (state.max_hp(attacker) / 4).max(1);
    let cause = ability_cause(state, holder);
    state.damage(attacker, amount, cause);
}
