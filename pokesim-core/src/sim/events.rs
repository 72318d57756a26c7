//! Event dispatcher.
//!
//! Every effect - an ability, an item, a volatile, a side condition, a field
//! condition - is a set of handlers bound to named hooks. The registry
//! stores plain `(hook, effect, source kind, scope, priority)` tuples; the
//! concrete behavior is looked up by `EffectId`, so no closures are captured
//! and the whole table is serializable state. Abilities and items register
//! on switch-in; side conditions on `side_start`; field conditions on
//! `field_start`; volatiles when they are inflicted. Each unregisters when
//! its source goes away.
//!
//! Run order within one hook is fully deterministic: handler priority
//! descending, then source kind (ability > item > volatile > side > field),
//! then the holder's current effective Speed descending, then scope
//! position (side, slot).

use serde::{Deserialize, Serialize};

use crate::battle_log::Cause;
use crate::data::effects::EffectId;
use crate::data::moves::MoveCategory;
use crate::data::types::Type;
use crate::data::Dex;
use crate::sim::handlers;
use crate::sim::layout::{FieldKind, SideCondition};
use crate::sim::state::{BattleState, MonRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hook {
    SwitchIn,
    TryHit,
    ModifyType,
    ModifyPriority,
    ModifyAtk,
    ModifyDef,
    ModifySpa,
    ModifySpd,
    ModifyAccuracy,
    BasePower,
    ModifyStab,
    ModifyDamage,
    DamagingHit,
    AfterMove,
    Residual,
    Faint,
    SideStart,
    SideResidual,
    SideEnd,
    FieldStart,
    FieldResidual,
    FieldEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceKind {
    Ability = 0,
    Item,
    Volatile,
    Side,
    Field,
}

/// What a handler is attached to. Stored instead of direct references so the
/// registry is plain data (see the `(effect_id, scope, target_id)` shape in
/// the design notes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    Mon(MonRef),
    Side(usize),
    Field,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerEntry {
    pub hook: Hook,
    pub effect: EffectId,
    pub kind: SourceKind,
    pub scope: Scope,
    pub priority: i8,
}

/// Context for one move-related dispatch.
#[derive(Clone, Copy, Debug)]
pub struct MoveCtx {
    pub attacker: MonRef,
    pub target: MonRef,
    pub move_id: u16,
    /// Resolved move type (after `ModifyType`).
    pub move_type: Type,
    pub category: MoveCategory,
    /// Declared base power before `BasePower` handlers (Technician reads it).
    pub base_power: u16,
    pub contact: bool,
    pub sound: bool,
    /// Damage dealt, for `DamagingHit`/`AfterMove`.
    pub damage: i32,
}

// --- 4096ths fixed-point chaining -------------------------------------------

pub const NEUTRAL: u32 = 4096;

/// Chain two modifiers with round-half-up, keeping products exact in
/// integer space.
pub fn chain(previous: u32, next: u32) -> u32 {
    ((previous as u64 * next as u64 + 2048) >> 12) as u32
}

/// Apply a chained modifier to a value, truncating: `floor(value * m / 4096)`.
pub fn apply_mod(value: u32, modifier: u32) -> u32 {
    if modifier == NEUTRAL {
        return value;
    }
    ((value as u64 * modifier as u64) >> 12) as u32
}

// --- Registration ------------------------------------------------------------

/// Register the active ability and item handlers for a Pokemon entering the
/// field. Switch-in behaviors themselves (Intimidate and friends) fire
/// separately via `run_switch_in`.
pub fn register_mon(state: &mut BattleState, dex: &Dex, m: MonRef) {
    register_ability(state, dex, m);
    register_item(state, dex, m);
}

/// Ability handlers only; suppression ending re-registers through here.
pub fn register_ability(state: &mut BattleState, dex: &Dex, m: MonRef) {
    if let Some(effect) = state.ability_effect(dex, m) {
        for &hook in handlers::effect_hooks(effect) {
            state.handlers.push(HandlerEntry {
                hook,
                effect,
                kind: SourceKind::Ability,
                scope: Scope::Mon(m),
                priority: handlers::priority(effect, hook),
            });
        }
    }
}

pub fn register_item(state: &mut BattleState, dex: &Dex, m: MonRef) {
    if let Some(effect) = state.item_effect(dex, m) {
        for &hook in handlers::effect_hooks(effect) {
            state.handlers.push(HandlerEntry {
                hook,
                effect,
                kind: SourceKind::Item,
                scope: Scope::Mon(m),
                priority: handlers::priority(effect, hook),
            });
        }
    }
}

/// Register a volatile-sourced handler (Leech Seed's residual drain). It
/// drops with the rest of the holder's entries on switch-out and faint.
pub fn register_volatile(state: &mut BattleState, m: MonRef, effect: EffectId, hook: Hook) {
    state.handlers.push(HandlerEntry {
        hook,
        effect,
        kind: SourceKind::Volatile,
        scope: Scope::Mon(m),
        priority: handlers::priority(effect, hook),
    });
}

/// Side conditions register on `side_start`: hazards listen for switch-ins,
/// timed conditions tick at side-residual time, and both announce their end.
pub fn register_side_condition(state: &mut BattleState, sc: SideCondition, side: usize) {
    let effect = EffectId::SideCondition(sc);
    let hooks: &[Hook] = if sc.is_hazard() {
        &[Hook::SideStart, Hook::SwitchIn, Hook::SideEnd]
    } else {
        &[Hook::SideStart, Hook::SideResidual, Hook::SideEnd]
    };
    for &hook in hooks {
        state.handlers.push(HandlerEntry {
            hook,
            effect,
            kind: SourceKind::Side,
            scope: Scope::Side(side),
            priority: handlers::priority(effect, hook),
        });
    }
}

pub fn unregister_side_condition(state: &mut BattleState, sc: SideCondition, side: usize) {
    let effect = EffectId::SideCondition(sc);
    state
        .handlers
        .retain(|e| !(e.effect == effect && e.scope == Scope::Side(side)));
}

/// Field conditions register on `field_start` and drop on `field_end`.
pub fn register_field_condition(state: &mut BattleState, kind: FieldKind) {
    let effect = EffectId::FieldCondition(kind);
    for hook in [Hook::FieldStart, Hook::FieldResidual, Hook::FieldEnd] {
        state.handlers.push(HandlerEntry {
            hook,
            effect,
            kind: SourceKind::Field,
            scope: Scope::Field,
            priority: handlers::priority(effect, hook),
        });
    }
}

pub fn unregister_field_condition(state: &mut BattleState, kind: FieldKind) {
    let effect = EffectId::FieldCondition(kind);
    state.handlers.retain(|e| e.effect != effect);
}

/// Drop every handler a Pokemon carries; used on switch-out and faint.
/// Side- and field-scoped entries are untouched.
pub fn unregister_mon(state: &mut BattleState, m: MonRef) {
    state.handlers.retain(|e| e.scope != Scope::Mon(m));
}

/// Drop only item handlers (Knock Off, balloon pop, consumed berry).
pub fn unregister_item(state: &mut BattleState, m: MonRef) {
    state
        .handlers
        .retain(|e| e.scope != Scope::Mon(m) || e.kind != SourceKind::Item);
}

/// Drop only ability handlers (suppression).
pub fn unregister_ability(state: &mut BattleState, m: MonRef) {
    state
        .handlers
        .retain(|e| e.scope != Scope::Mon(m) || e.kind != SourceKind::Ability);
}

fn collect_sorted(state: &BattleState, dex: &Dex, hook: Hook) -> Vec<HandlerEntry> {
    let mut entries: Vec<HandlerEntry> = state
        .handlers
        .iter()
        .filter(|e| e.hook == hook)
        .copied()
        .collect();
    let speed_of = |e: &HandlerEntry| match e.scope {
        Scope::Mon(m) => state.effective_speed(dex, m),
        Scope::Side(_) | Scope::Field => 0,
    };
    let position_of = |e: &HandlerEntry| match e.scope {
        Scope::Mon(m) => (m.side, m.slot),
        Scope::Side(side) => (side, 0),
        Scope::Field => (0, 0),
    };
    entries.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.kind.cmp(&b.kind))
            .then_with(|| speed_of(b).cmp(&speed_of(a)))
            .then_with(|| position_of(a).cmp(&position_of(b)))
    });
    entries
}

// --- Deterministic residual ordering -----------------------------------------

/// Actives in residual order: speed descending, inverted under Trick Room,
/// (side, slot) breaking exact ties deterministically. Weather damage,
/// terrain healing and the per-Pokemon residual hooks all walk this order.
pub fn residual_order(state: &BattleState, dex: &Dex) -> Vec<MonRef> {
    let mut mons: Vec<(i32, usize, usize, MonRef)> = state
        .all_active()
        .into_iter()
        .filter(|(_, _, m)| !state.is_fainted(*m))
        .map(|(side, slot, m)| {
            let speed = state.effective_speed(dex, m);
            let tier = if state.trick_room_active() { -speed } else { speed };
            (tier, side, slot, m)
        })
        .collect();
    mons.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    mons.into_iter().map(|(_, _, _, m)| m).collect()
}

// --- Move-event dispatch ------------------------------------------------------

/// Fold every multiplier-returning handler for a hook into one 4096ths
/// modifier. Only handlers held by `relevant` (attacker for offense hooks,
/// target for defense hooks) participate.
pub fn modify_chain(
    state: &mut BattleState,
    dex: &Dex,
    hook: Hook,
    relevant: MonRef,
    ctx: &MoveCtx,
) -> u32 {
    let mut total = NEUTRAL;
    for entry in collect_sorted(state, dex, hook) {
        if entry.scope != Scope::Mon(relevant) {
            continue;
        }
        if let Some(m) = handlers::modifier(entry.effect, hook, relevant, ctx, state, dex) {
            total = chain(total, m);
        }
    }
    total
}

/// Evaluate `on_try_hit` for the target's handlers. `Some(cause)` means the
/// move is blocked or absorbed; absorption side effects have already been
/// applied by the handler.
pub fn run_try_hit(state: &mut BattleState, dex: &Dex, ctx: &MoveCtx) -> Option<Cause> {
    for entry in collect_sorted(state, dex, Hook::TryHit) {
        if entry.scope != Scope::Mon(ctx.target) {
            continue;
        }
        if let Some(cause) = handlers::try_hit_block(entry.effect, ctx.target, ctx, state, dex) {
            return Some(cause);
        }
    }
    None
}

/// `on_modify_type`: the attacker's handlers may retype the move.
pub fn run_modify_type(state: &mut BattleState, dex: &Dex, ctx: &MoveCtx) -> Type {
    let mut move_type = ctx.move_type;
    for entry in collect_sorted(state, dex, Hook::ModifyType) {
        if entry.scope != Scope::Mon(ctx.attacker) {
            continue;
        }
        if let Some(t) = handlers::modify_type(entry.effect, ctx, move_type) {
            move_type = t;
        }
    }
    move_type
}

/// `on_modify_priority`: summed priority delta from the attacker's handlers.
pub fn run_modify_priority(
    state: &BattleState,
    dex: &Dex,
    attacker: MonRef,
    category: MoveCategory,
) -> i8 {
    let mut delta = 0;
    for entry in collect_sorted(state, dex, Hook::ModifyPriority) {
        if entry.scope != Scope::Mon(attacker) {
            continue;
        }
        delta += handlers::priority_delta(entry.effect, category);
    }
    delta
}

/// `on_damaging_hit`: fires the target-held handlers after damage lands.
pub fn run_damaging_hit(state: &mut BattleState, dex: &Dex, ctx: &MoveCtx) {
    for entry in collect_sorted(state, dex, Hook::DamagingHit) {
        if entry.scope != Scope::Mon(ctx.target) {
            continue;
        }
        handlers::on_damaging_hit(entry.effect, ctx.target, ctx, state, dex);
    }
}

/// `on_after_move`: attacker-held cleanup once all targets resolved.
pub fn run_after_move(state: &mut BattleState, dex: &Dex, ctx: &MoveCtx) {
    for entry in collect_sorted(state, dex, Hook::AfterMove) {
        if entry.scope != Scope::Mon(ctx.attacker) {
            continue;
        }
        handlers::on_after_move(entry.effect, ctx.attacker, ctx, state, dex);
    }
}

/// Per-Pokemon residual handlers: item residuals (Leftovers) run before
/// volatile residuals (Leech Seed) through the source-kind ordering.
pub fn run_residual(state: &mut BattleState, dex: &Dex, m: MonRef) {
    for entry in collect_sorted(state, dex, Hook::Residual) {
        if entry.scope != Scope::Mon(m) {
            continue;
        }
        handlers::on_residual(entry.effect, m, state, dex);
    }
}

/// `on_faint` for the fainting Pokemon's handlers. `source` names the
/// attacker and whether the killing move made contact.
pub fn run_faint(state: &mut BattleState, dex: &Dex, m: MonRef, source: Option<(MonRef, bool)>) {
    for entry in collect_sorted(state, dex, Hook::Faint) {
        if entry.scope != Scope::Mon(m) {
            continue;
        }
        handlers::on_faint(entry.effect, m, source, state, dex);
    }
}

// --- Side/field dispatch ------------------------------------------------------

/// `on_side_start` for one freshly installed (or layered) condition.
pub fn run_side_start(state: &mut BattleState, dex: &Dex, side: usize, sc: SideCondition) {
    for entry in collect_sorted(state, dex, Hook::SideStart) {
        if entry.scope == Scope::Side(side) && entry.effect == EffectId::SideCondition(sc) {
            handlers::on_side_start(entry.effect, side, state, dex);
        }
    }
}

/// `on_side_end` for one expiring condition; the caller unregisters after.
pub fn run_side_end(state: &mut BattleState, dex: &Dex, side: usize, sc: SideCondition) {
    for entry in collect_sorted(state, dex, Hook::SideEnd) {
        if entry.scope == Scope::Side(side) && entry.effect == EffectId::SideCondition(sc) {
            handlers::on_side_end(entry.effect, side, state, dex);
        }
    }
}

/// `on_side_residual` across every registered side condition.
pub fn run_side_residuals(state: &mut BattleState, dex: &Dex) {
    for entry in collect_sorted(state, dex, Hook::SideResidual) {
        if let Scope::Side(side) = entry.scope {
            handlers::on_side_residual(entry.effect, side, state, dex);
        }
    }
}

/// Entry hazards on the arriving Pokemon's side, in their fixed order.
pub fn run_hazards_on_switch_in(state: &mut BattleState, dex: &Dex, m: MonRef) {
    for entry in collect_sorted(state, dex, Hook::SwitchIn) {
        if state.is_fainted(m) {
            break;
        }
        if entry.scope == Scope::Side(m.side) {
            handlers::on_hazard_switch_in(entry.effect, m, state, dex);
        }
    }
}

/// `on_field_start` for one freshly installed field condition.
pub fn run_field_start(state: &mut BattleState, dex: &Dex, kind: FieldKind) {
    for entry in collect_sorted(state, dex, Hook::FieldStart) {
        if entry.effect == EffectId::FieldCondition(kind) {
            handlers::on_field_start(entry.effect, state, dex);
        }
    }
}

/// `on_field_end` for one expiring field condition.
pub fn run_field_end(state: &mut BattleState, dex: &Dex, kind: FieldKind) {
    for entry in collect_sorted(state, dex, Hook::FieldEnd) {
        if entry.effect == EffectId::FieldCondition(kind) {
            handlers::on_field_end(entry.effect, state, dex);
        }
    }
}

/// `on_field_residual` across every registered field condition.
pub fn run_field_residuals(state: &mut BattleState, dex: &Dex) {
    for entry in collect_sorted(state, dex, Hook::FieldResidual) {
        handlers::on_field_residual(entry.effect, state, dex);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_is_exact_at_neutral() {
        assert_eq!(chain(NEUTRAL, NEUTRAL), NEUTRAL);
        assert_eq!(chain(NEUTRAL, 6144), 6144);
    }

    #[test]
    fn chain_rounds_half_up() {
        // 1.5 * 1.5 = 2.25 -> 9216.
        assert_eq!(chain(6144, 6144), 9216);
        // 0.5 * 0.5 = 0.25 -> 1024.
        assert_eq!(chain(2048, 2048), 1024);
    }

    #[test]
    fn apply_mod_truncates() {
        // floor(100 * 5325 / 4096) = 129, the Supreme Overlord fallen=3 case.
        assert_eq!(apply_mod(100, 5325), 129);
        assert_eq!(apply_mod(100, 6144), 150);
        assert_eq!(apply_mod(77, NEUTRAL), 77);
    }

    #[test]
    fn source_kind_order() {
        assert!(SourceKind::Ability < SourceKind::Item);
        assert!(SourceKind::Item < SourceKind::Volatile);
        assert!(SourceKind::Volatile < SourceKind::Side);
        assert!(SourceKind::Side < SourceKind::Field);
    }

    #[test]
    fn side_registration_round_trip() {
        use crate::sim::state::{BattleState, FormatDescriptor};
        let mut state = BattleState::new(FormatDescriptor::singles(), 1);
        register_side_condition(&mut state, SideCondition::Reflect, 0);
        assert_eq!(state.handlers.len(), 3);
        assert!(state
            .handlers
            .iter()
            .all(|e| e.kind == SourceKind::Side && e.scope == Scope::Side(0)));
        // A different side or condition is untouched by unregistration.
        register_side_condition(&mut state, SideCondition::Spikes, 1);
        unregister_side_condition(&mut state, SideCondition::Reflect, 0);
        assert!(state
            .handlers
            .iter()
            .all(|e| e.effect == EffectId::SideCondition(SideCondition::Spikes)));
    }

    #[test]
    fn field_registration_round_trip() {
        use crate::sim::layout::Weather;
        use crate::sim::state::{BattleState, FormatDescriptor};
        let mut state = BattleState::new(FormatDescriptor::singles(), 1);
        register_field_condition(&mut state, FieldKind::Weather(Weather::Rain));
        assert_eq!(state.handlers.len(), 3);
        assert!(state.handlers.iter().all(|e| e.kind == SourceKind::Field));
        unregister_field_condition(&mut state, FieldKind::Weather(Weather::Rain));
        assert!(state.handlers.is_empty());
    }
}
