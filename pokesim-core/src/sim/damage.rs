//! Damage and accuracy pipeline.
//!
//! Integer arithmetic end to end. Burn halves the attack stat itself; the
//! multiplicative modifiers are 4096ths fixed-point values applied in the
//! documented sequence: spread, weather, crit, random factor, STAB, type
//! effectiveness, screens, then the remaining `on_modify_damage` handlers.

use crate::battle_log::{Cause, LogRecord};
use crate::data::effects::EffectId;
use crate::data::moves::{MoveCategory, PowerRule};
use crate::data::types::{self, Type};
use crate::data::Dex;
use crate::sim::events::{self, Hook, MoveCtx, NEUTRAL};
use crate::sim::layout::*;
use crate::sim::state::{BattleState, MonRef};
use crate::sim::stats::{self, BoostAxis};

#[derive(Clone, Copy, Debug, Default)]
pub struct DamageOutcome {
    pub damage: i32,
    pub crit: bool,
    /// Type effectiveness in quarters; 0 means immune.
    pub quarters: u32,
}

// --- Status application -----------------------------------------------------

/// Type-chart immunities to primary statuses.
pub fn status_type_immune(state: &BattleState, m: MonRef, status: StatusKind) -> bool {
    match status {
        StatusKind::Burn => state.has_type(m, Type::Fire),
        StatusKind::Paralysis => state.has_type(m, Type::Electric),
        StatusKind::Poison | StatusKind::Toxic => {
            state.has_type(m, Type::Poison) || state.has_type(m, Type::Steel)
        }
        StatusKind::Freeze => state.has_type(m, Type::Ice),
        _ => false,
    }
}

/// Apply a primary status honoring type immunity and, for externally
/// inflicted statuses, Safeguard. Sleep draws its duration here.
pub fn try_apply_status(
    state: &mut BattleState,
    target: MonRef,
    status: StatusKind,
    external: bool,
) -> bool {
    if state.status(target) != StatusKind::None {
        return false;
    }
    if status_type_immune(state, target, status) {
        return false;
    }
    if external && state.side_condition(target.side, SideCondition::Safeguard) > 0 {
        return false;
    }
    let counter = match status {
        // 1-3 turns of sleep.
        StatusKind::Sleep => state.prng.range(1, 3) as i32,
        _ => 0,
    };
    state.set_status(target, status, counter)
}

/// Confusion lasts 2-5 turns; reapplication fails.
pub fn try_confuse(state: &mut BattleState, target: MonRef) -> bool {
    if state.has_volatile(target, Volatiles::CONFUSION) {
        return false;
    }
    let turns = state.prng.range(2, 5) as i32;
    state.set_volatile(target, Volatiles::CONFUSION);
    state.set(target, P_CONFUSION_TURNS, turns);
    true
}

// --- Accuracy ---------------------------------------------------------------

/// One uniform draw against the effective accuracy threshold. Always-hit
/// moves never reach here.
pub fn accuracy_roll(state: &mut BattleState, dex: &Dex, ctx: &MoveCtx, accuracy: u8) -> bool {
    let stage =
        (state.stage(ctx.attacker, BoostAxis::Acc) - state.stage(ctx.target, BoostAxis::Eva))
            .clamp(-6, 6);
    let (num, den) = stats::acc_eva_pair(stage);
    let mut threshold = accuracy as u32 * num / den;
    let chain = events::modify_chain(state, dex, Hook::ModifyAccuracy, ctx.attacker, ctx);
    if chain != NEUTRAL {
        threshold = events::apply_mod(threshold, chain);
    }
    let roll = state.prng.next(100);
    roll < threshold
}

// --- Criticals --------------------------------------------------------------

/// Crit denominators by stage: 1/24, 1/8, 1/2, always.
const CRIT_DENOMINATORS: [u32; 4] = [24, 8, 2, 1];

/// One draw per target per hit, regardless of stage, so the stream never
/// depends on crit modifiers.
pub fn crit_roll(state: &mut BattleState, crit_ratio: u8) -> bool {
    let stage = (crit_ratio.saturating_sub(1) as usize).min(3);
    let den = CRIT_DENOMINATORS[stage];
    state.prng.chance(1, den)
}

// --- Base power -------------------------------------------------------------

/// Declared or computed base power, before `on_base_power` handlers. Also
/// applies the Tera floor: a terastallized attacker's matching-type moves
/// with power below 60 are raised to 60.
pub fn compute_power(
    state: &mut BattleState,
    dex: &Dex,
    attacker: MonRef,
    target: MonRef,
    move_id: u16,
) -> u16 {
    let data = dex.mov(move_id);
    let mut power = match data.power_rule {
        None => data.base_power,
        Some(PowerRule::HpScaled { max_power }) => {
            let max_hp = state.max_hp(attacker).max(1);
            (max_power as i32 * state.hp(attacker) / max_hp).max(1) as u16
        }
        Some(PowerRule::LowHpThresholds) => {
            let ratio = (state.hp(attacker) * 48 / state.max_hp(attacker).max(1)).max(1);
            match ratio {
                1 => 200,
                2..=4 => 150,
                5..=9 => 100,
                10..=16 => 80,
                17..=32 => 40,
                _ => 20,
            }
        }
        Some(PowerRule::InverseSpeedRatio) => {
            let user = state.effective_speed(dex, attacker).max(1);
            let target_spe = state.effective_speed(dex, target);
            ((25 * target_spe / user) + 1).min(150) as u16
        }
        Some(PowerRule::SpeedRatio) => {
            let user = state.effective_speed(dex, attacker);
            let target_spe = state.effective_speed(dex, target).max(1);
            match (user / target_spe).min(4) {
                0 => 40,
                1 => 60,
                2 => 80,
                3 => 120,
                _ => 150,
            }
        }
        Some(PowerRule::TargetWeight) => {
            let weight = dex.species(state.get(target, P_SPECIES) as u16).weight_hg;
            match weight {
                0..=99 => 20,
                100..=249 => 40,
                250..=499 => 60,
                500..=999 => 80,
                1000..=1999 => 100,
                _ => 120,
            }
        }
        Some(PowerRule::FallenAllies { base, per }) => {
            let fallen = state.fainted_count(attacker.side).clamp(0, 100) as u16;
            base.saturating_add(per.saturating_mul(fallen.min(5)))
        }
    };
    if state.get(attacker, P_TERASTALLIZED) != 0
        && state.get(attacker, P_TERA_TYPE) == dex.mov(move_id).move_type.id() as i32
        && power > 0
        && power < 60
    {
        power = 60;
    }
    power
}

// --- STAB -------------------------------------------------------------------

/// STAB in 4096ths. Terastallization keeps the original types eligible; a
/// Tera type matching an original type upgrades the bonus to exactly 2x, as
/// does Adaptability.
pub fn stab_modifier(state: &BattleState, dex: &Dex, attacker: MonRef, move_type: Type) -> u32 {
    let original = state.original_types_include(attacker, move_type);
    let tera_match = state.get(attacker, P_TERASTALLIZED) != 0
        && state.get(attacker, P_TERA_TYPE) == move_type.id() as i32;
    if !original && !tera_match {
        return NEUTRAL;
    }
    if state.has_ability_effect(dex, attacker, EffectId::Adaptability) {
        return 8192;
    }
    if original && tera_match {
        return 8192;
    }
    6144
}

// --- Weather ----------------------------------------------------------------

fn weather_modifier(weather: Weather, move_type: Type) -> u32 {
    match (weather, move_type) {
        (Weather::Sun, Type::Fire) | (Weather::Rain, Type::Water) => 6144,
        (Weather::Sun, Type::Water) | (Weather::Rain, Type::Fire) => 2048,
        _ => NEUTRAL,
    }
}

// --- Screens ----------------------------------------------------------------

fn screen_modifier(state: &BattleState, dex: &Dex, ctx: &MoveCtx) -> u32 {
    if state.has_ability_effect(dex, ctx.attacker, EffectId::Infiltrator) {
        return NEUTRAL;
    }
    let side = ctx.target.side;
    let screened = state.side_condition(side, SideCondition::AuroraVeil) > 0
        || match ctx.category {
            MoveCategory::Physical => state.side_condition(side, SideCondition::Reflect) > 0,
            MoveCategory::Special => state.side_condition(side, SideCondition::LightScreen) > 0,
            MoveCategory::Status => false,
        };
    if !screened {
        return NEUTRAL;
    }
    if state.format.active_slots > 1 && !state.format.classic_screens {
        2732
    } else {
        2048
    }
}

// --- Main pipeline ----------------------------------------------------------

/// Compute one hit's damage. Draws the crit roll and then the random factor;
/// fixed-damage moves draw neither. `power` is the post-`on_base_power`
/// value. `typeless` hits (Struggle) are neutral against everything and
/// never get STAB.
pub fn compute_damage(
    state: &mut BattleState,
    dex: &Dex,
    ctx: &MoveCtx,
    data: &crate::data::moves::MoveData,
    power: u16,
    spread_hit: bool,
    typeless: bool,
) -> DamageOutcome {
    let quarters = if typeless {
        4
    } else {
        let (t1, t2, tera) = state.defending_types(ctx.target);
        types::effectiveness_packed(ctx.move_type, t1, t2, tera)
    };

    if let Some(rule) = data.fixed_damage {
        if quarters == 0 {
            return DamageOutcome { damage: 0, crit: false, quarters };
        }
        use crate::data::moves::FixedDamage;
        let damage = match rule {
            FixedDamage::Level => state.get(ctx.attacker, P_LEVEL),
            FixedDamage::HalfTargetHp => (state.hp(ctx.target) / 2).max(1),
            FixedDamage::Flat(v) => v as i32,
            FixedDamage::Endeavor => (state.hp(ctx.target) - state.hp(ctx.attacker)).max(0),
        };
        return DamageOutcome { damage, crit: false, quarters };
    }

    let crit = crit_roll(state, data.crit_ratio);
    let random = state.prng.range(85, 100);

    if quarters == 0 || power == 0 {
        return DamageOutcome { damage: 0, crit, quarters };
    }

    // Offensive and defensive stats with stage rules; crits ignore the
    // attacker's drops and the defender's raises.
    let physical = ctx.category == MoveCategory::Physical;
    let (atk_lane, atk_axis, atk_hook) = if physical {
        (P_STAT_ATK, BoostAxis::Atk, Hook::ModifyAtk)
    } else {
        (P_STAT_SPA, BoostAxis::Spa, Hook::ModifySpa)
    };
    // Wonder Room swaps the raw defensive stats, not the stages.
    let (def_lane, def_axis, def_hook) = match (physical, state.wonder_room_active()) {
        (true, false) => (P_STAT_DEF, BoostAxis::Def, Hook::ModifyDef),
        (true, true) => (P_STAT_SPD, BoostAxis::Def, Hook::ModifyDef),
        (false, false) => (P_STAT_SPD, BoostAxis::Spd, Hook::ModifySpd),
        (false, true) => (P_STAT_DEF, BoostAxis::Spd, Hook::ModifySpd),
    };

    let mut atk_stage = state.stage(ctx.attacker, atk_axis);
    let mut def_stage = state.stage(ctx.target, def_axis);
    if crit {
        atk_stage = atk_stage.max(0);
        def_stage = def_stage.min(0);
    }

    let mut attack = stats::apply_stage(state.get(ctx.attacker, atk_lane) as u32, atk_stage);
    let mut defense = stats::apply_stage(state.get(ctx.target, def_lane) as u32, def_stage);

    let atk_chain = events::modify_chain(state, dex, atk_hook, ctx.attacker, ctx);
    if atk_chain != NEUTRAL {
        attack = events::apply_mod(attack, atk_chain);
    }
    let def_chain = events::modify_chain(state, dex, def_hook, ctx.target, ctx);
    if def_chain != NEUTRAL {
        defense = events::apply_mod(defense, def_chain);
    }

    // Sand raises Rock-type special bulk by half.
    if !physical
        && state.weather() == Weather::Sand
        && state.has_type(ctx.target, Type::Rock)
    {
        defense = defense * 3 / 2;
    }

    // Burn halves physical attack unless the attacker's ability shrugs it off.
    if physical
        && state.status(ctx.attacker) == StatusKind::Burn
        && !state.has_ability_effect(dex, ctx.attacker, EffectId::Guts)
    {
        attack /= 2;
    }

    let attack = attack.max(1);
    let defense = defense.max(1);

    let level = state.get(ctx.attacker, P_LEVEL) as u32;
    let mut damage = (2 * level / 5 + 2)
        .saturating_mul(power as u32)
        .saturating_mul(attack)
        / defense
        / 50
        + 2;

    if spread_hit {
        damage = events::apply_mod(damage, 3072);
    }
    let w = weather_modifier(state.weather(), ctx.move_type);
    if w != NEUTRAL {
        damage = events::apply_mod(damage, w);
    }
    if crit {
        damage = events::apply_mod(damage, 6144);
    }
    damage = damage * random / 100;
    if !typeless {
        let mut stab = stab_modifier(state, dex, ctx.attacker, ctx.move_type);
        let stab_chain = events::modify_chain(state, dex, Hook::ModifyStab, ctx.attacker, ctx);
        if stab_chain != NEUTRAL {
            stab = events::chain(stab, stab_chain);
        }
        if stab != NEUTRAL {
            damage = events::apply_mod(damage, stab);
        }
    }
    damage = damage * quarters / 4;
    let screens = screen_modifier(state, dex, ctx);
    if screens != NEUTRAL && !crit {
        damage = events::apply_mod(damage, screens);
    }
    let final_chain = events::modify_chain(state, dex, Hook::ModifyDamage, ctx.attacker, ctx);
    if final_chain != NEUTRAL {
        damage = events::apply_mod(damage, final_chain);
    }

    DamageOutcome {
        damage: damage.max(1) as i32,
        crit,
        quarters,
    }
}

/// Confusion's self-hit: a typeless 40-power physical strike with none of
/// the usual modifiers and no randomness.
pub fn confusion_damage(state: &BattleState, m: MonRef) -> i32 {
    let attack = stats::apply_stage(
        state.get(m, P_STAT_ATK) as u32,
        state.stage(m, BoostAxis::Atk),
    )
    .max(1);
    let defense = stats::apply_stage(
        state.get(m, P_STAT_DEF) as u32,
        state.stage(m, BoostAxis::Def),
    )
    .max(1);
    let level = state.get(m, P_LEVEL) as u32;
    let damage = (2 * level / 5 + 2) * 40 * attack / defense / 50 + 2;
    damage.max(1) as i32
}

/// Log the non-neutral effectiveness and crit flags for a resolved hit.
pub fn log_hit_details(state: &mut BattleState, ctx: &MoveCtx, outcome: &DamageOutcome) {
    if outcome.crit {
        state.log.push(LogRecord::Crit {
            side: ctx.target.side,
            slot: ctx.target.slot,
        });
    }
    if outcome.quarters != 4 && outcome.quarters != 0 {
        state.log.push(LogRecord::Effectiveness {
            side: ctx.target.side,
            slot: ctx.target.slot,
            quarters: outcome.quarters,
        });
    }
}

/// Immunity log record shared by type and ability immunities.
pub fn log_immune(state: &mut BattleState, target: MonRef, cause: Cause) {
    state.log.push(LogRecord::Immune {
        side: target.side,
        slot: target.slot,
        cause,
    });
}
