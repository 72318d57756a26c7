//! Handler dispatch tables.
//!
//! Maps each `EffectId` to the hooks it registers on and routes dispatched
//! events to the concrete behavior in `abilities`/`items`/`conditions`.

pub mod abilities;
pub mod conditions;
pub mod items;

use crate::battle_log::Cause;
use crate::data::effects::EffectId;
use crate::data::moves::MoveCategory;
use crate::data::types::Type;
use crate::data::Dex;
use crate::sim::events::{Hook, MoveCtx};
use crate::sim::layout::{SideCondition, Weather};
use crate::sim::state::{BattleState, MonRef};

/// Hooks a Pokemon-held effect registers on while its holder is active.
/// Switch-in behaviors are not listed; `run_switch_in` fires them directly.
/// Condition effects register through `events::register_side_condition` /
/// `register_field_condition` / `register_volatile` instead.
pub fn effect_hooks(effect: EffectId) -> &'static [Hook] {
    use EffectId::*;
    match effect {
        GoodAsGold | FlashFire | VoltAbsorb | WaterAbsorb | Levitate => &[Hook::TryHit],
        LiquidVoice => &[Hook::ModifyType],
        Prankster => &[Hook::ModifyPriority],
        Guts => &[Hook::ModifyAtk],
        ChoiceBand => &[Hook::ModifyAtk],
        ChoiceSpecs => &[Hook::ModifySpa],
        Technician | SupremeOverlord | SheerForce | TypeBoostItem => &[Hook::BasePower],
        LifeOrb => &[Hook::ModifyDamage, Hook::AfterMove],
        RoughSkin | Static | SteamEngine => &[Hook::DamagingHit],
        AirBalloon => &[Hook::DamagingHit],
        Leftovers => &[Hook::Residual],
        Aftermath => &[Hook::Faint],
        // Switch-in only, or consulted inline by the pipeline.
        Intimidate | Download | Drizzle | Drought | SandStream | SnowWarning
        | NeutralizingGas | Adaptability | SkillLink | Infiltrator | CovertCloak
        | HeavyDutyBoots | IronBall | LoadedDice | ChoiceScarf | Chlorophyll | SwiftSwim => &[],
        // Not registered through register_mon.
        SideCondition(_) | FieldCondition(_) | LeechSeeded => &[],
    }
}

/// Handler priority within a hook. Hazards carry distinct priorities so
/// their switch-in order is pinned: Stealth Rock, Spikes, Toxic Spikes,
/// Sticky Web. Everything else runs at the default bracket.
pub fn priority(effect: EffectId, hook: Hook) -> i8 {
    match (effect, hook) {
        (EffectId::SideCondition(SideCondition::StealthRock), Hook::SwitchIn) => 3,
        (EffectId::SideCondition(SideCondition::Spikes), Hook::SwitchIn) => 2,
        (EffectId::SideCondition(SideCondition::ToxicSpikes), Hook::SwitchIn) => 1,
        (EffectId::SideCondition(SideCondition::StickyWeb), Hook::SwitchIn) => 0,
        _ => 0,
    }
}

/// Switch-in behaviors, fired for the entering Pokemon in entry order.
pub fn run_switch_in(state: &mut BattleState, dex: &Dex, m: MonRef) {
    let effect = state.ability_effect(dex, m);
    match effect {
        Some(EffectId::Intimidate) => abilities::intimidate(state, m),
        Some(EffectId::Download) => abilities::download(state, m),
        Some(EffectId::Drizzle) => abilities::set_entry_weather(state, dex, m, Weather::Rain),
        Some(EffectId::Drought) => abilities::set_entry_weather(state, dex, m, Weather::Sun),
        Some(EffectId::SandStream) => abilities::set_entry_weather(state, dex, m, Weather::Sand),
        Some(EffectId::SnowWarning) => abilities::set_entry_weather(state, dex, m, Weather::Snow),
        Some(EffectId::NeutralizingGas) => abilities::neutralizing_gas_enter(state, m),
        _ => {}
    }
}

/// Multiplier-returning hooks, in 4096ths. `None` means the handler does not
/// apply to this event.
pub fn modifier(
    effect: EffectId,
    hook: Hook,
    holder: MonRef,
    ctx: &MoveCtx,
    state: &mut BattleState,
    dex: &Dex,
) -> Option<u32> {
    match (effect, hook) {
        (EffectId::Guts, Hook::ModifyAtk) => abilities::guts_atk(state, holder),
        (EffectId::ChoiceBand, Hook::ModifyAtk) => Some(6144),
        (EffectId::ChoiceSpecs, Hook::ModifySpa) => Some(6144),
        (EffectId::Technician, Hook::BasePower) => abilities::technician(ctx),
        (EffectId::SupremeOverlord, Hook::BasePower) => abilities::supreme_overlord(state, holder),
        (EffectId::SheerForce, Hook::BasePower) => abilities::sheer_force(ctx, dex),
        (EffectId::TypeBoostItem, Hook::BasePower) => items::type_boost(state, dex, holder, ctx),
        (EffectId::LifeOrb, Hook::ModifyDamage) => Some(5324),
        _ => None,
    }
}

/// `on_try_hit` blockers/absorbers held by the target.
pub fn try_hit_block(
    effect: EffectId,
    holder: MonRef,
    ctx: &MoveCtx,
    state: &mut BattleState,
    dex: &Dex,
) -> Option<Cause> {
    match effect {
        EffectId::GoodAsGold => abilities::good_as_gold(state, holder, ctx),
        EffectId::FlashFire => abilities::flash_fire(state, holder, ctx),
        EffectId::VoltAbsorb => abilities::absorb(state, holder, ctx, Type::Electric),
        EffectId::WaterAbsorb => abilities::absorb(state, holder, ctx, Type::Water),
        EffectId::Levitate => abilities::levitate(state, dex, holder, ctx),
        _ => None,
    }
}

/// `on_modify_type` retyping. `_current` is the type as modified so far;
/// nothing registered today chains off it.
pub fn modify_type(effect: EffectId, ctx: &MoveCtx, _current: Type) -> Option<Type> {
    match effect {
        EffectId::LiquidVoice if ctx.sound => Some(Type::Water),
        _ => None,
    }
}

/// `on_modify_priority` delta.
pub fn priority_delta(effect: EffectId, category: MoveCategory) -> i8 {
    match effect {
        EffectId::Prankster if category == MoveCategory::Status => 1,
        _ => 0,
    }
}

pub fn on_damaging_hit(
    effect: EffectId,
    holder: MonRef,
    ctx: &MoveCtx,
    state: &mut BattleState,
    _dex: &Dex,
) {
    match effect {
        EffectId::RoughSkin => abilities::rough_skin(state, holder, ctx),
        EffectId::Static => abilities::static_contact(state, holder, ctx),
        EffectId::SteamEngine => abilities::steam_engine(state, holder, ctx),
        EffectId::AirBalloon => items::pop_air_balloon(state, holder),
        _ => {}
    }
}

pub fn on_after_move(
    effect: EffectId,
    holder: MonRef,
    ctx: &MoveCtx,
    state: &mut BattleState,
    _dex: &Dex,
) {
    if effect == EffectId::LifeOrb {
        items::life_orb_recoil(state, holder, ctx);
    }
}

pub fn on_residual(effect: EffectId, holder: MonRef, state: &mut BattleState, _dex: &Dex) {
    match effect {
        EffectId::Leftovers => items::leftovers(state, holder),
        EffectId::LeechSeeded => conditions::leech_seed(state, holder),
        _ => {}
    }
}

pub fn on_faint(
    effect: EffectId,
    holder: MonRef,
    source: Option<(MonRef, bool)>,
    state: &mut BattleState,
    _dex: &Dex,
) {
    if effect == EffectId::Aftermath {
        abilities::aftermath(state, holder, source);
    }
}

// --- Side/field routing ------------------------------------------------------

pub fn on_side_start(effect: EffectId, side: usize, state: &mut BattleState, _dex: &Dex) {
    if let EffectId::SideCondition(sc) = effect {
        conditions::side_start(state, side, sc);
    }
}

pub fn on_side_residual(effect: EffectId, side: usize, state: &mut BattleState, dex: &Dex) {
    if let EffectId::SideCondition(sc) = effect {
        conditions::side_residual(state, dex, side, sc);
    }
}

pub fn on_side_end(effect: EffectId, side: usize, state: &mut BattleState, _dex: &Dex) {
    if let EffectId::SideCondition(sc) = effect {
        conditions::side_end(state, side, sc);
    }
}

pub fn on_hazard_switch_in(effect: EffectId, m: MonRef, state: &mut BattleState, dex: &Dex) {
    if let EffectId::SideCondition(sc) = effect {
        conditions::hazard_switch_in(state, dex, sc, m);
    }
}

pub fn on_field_start(effect: EffectId, state: &mut BattleState, _dex: &Dex) {
    if let EffectId::FieldCondition(kind) = effect {
        conditions::field_start(state, kind);
    }
}

pub fn on_field_residual(effect: EffectId, state: &mut BattleState, dex: &Dex) {
    if let EffectId::FieldCondition(kind) = effect {
        conditions::field_residual(state, dex, kind);
    }
}

pub fn on_field_end(effect: EffectId, state: &mut BattleState, _dex: &Dex) {
    if let EffectId::FieldCondition(kind) = effect {
        conditions::field_end(state, kind);
    }
}
