//! Turn scheduler.
//!
//! Orders the submitted actions, drives the hook sequence for one atomic
//! turn and leaves the state in the next await point. RNG draws follow the
//! documented order: pre-move rolls per attacker in move order; accuracy,
//! then per-target crit / random factor / secondary rolls per move; speed-tie
//! coins on demand while ordering; residual rolls last. Hazards draw nothing.

use serde::{Deserialize, Serialize};

use crate::battle_log::{Activation, Cause, LogRecord};
use crate::data::effects::EffectId;
use crate::data::items::ItemCategory;
use crate::data::moves::{
    self as movedata, AppliedEffect, HitCount, MoveData, MoveFlags, MoveTarget, PreCheck,
    STRUGGLE_SLOT,
};
use crate::data::types::{Type, TYPE_NONE};
use crate::data::Dex;
use crate::error::ActionError;
use crate::sim::damage::{self, try_apply_status, try_confuse};
use crate::sim::events::{self, Hook, MoveCtx, NEUTRAL};
use crate::sim::faint_handler::{battle_outcome, process_faints};
use crate::sim::handlers::conditions;
use crate::sim::layout::*;
use crate::sim::state::{BattleState, MonRef};
use crate::sim::stats::ALL_BOOST_AXES;
use crate::sim::switching::{self, SwitchKind};

/// Where a move points, from the acting side's perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRef {
    User,
    Ally(usize),
    Foe(usize),
    RandomFoe,
    AllAdjacentFoes,
    AllOthers,
    UserSide,
    FoeSide,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Move {
        slot: usize,
        move_slot: usize,
        target: TargetRef,
        tera: bool,
    },
    Switch {
        slot: usize,
        team_slot: usize,
    },
    Pass {
        slot: usize,
    },
}

impl Action {
    pub fn slot(&self) -> usize {
        match *self {
            Action::Move { slot, .. } | Action::Switch { slot, .. } | Action::Pass { slot } => slot,
        }
    }
}

/// One queued move with its ordering key.
#[derive(Clone, Copy, Debug)]
struct QueuedMove {
    attacker: MonRef,
    move_slot: usize,
    target: TargetRef,
    priority: i32,
    speed_tier: i32,
}

// --- Validation -------------------------------------------------------------

fn move_data_for(dex: &Dex, state: &BattleState, m: MonRef, move_slot: usize) -> Option<MoveData> {
    if move_slot == STRUGGLE_SLOT {
        return Some(movedata::struggle());
    }
    let id = state.move_id(m, move_slot)?;
    Some(dex.mov(id).clone())
}

/// Move slots a Pokemon may select this turn, honoring PP, Disable, Taunt,
/// Encore and choice lock.
pub fn selectable_move_slots(state: &BattleState, dex: &Dex, m: MonRef) -> Vec<usize> {
    let mut out = Vec::new();
    let encore_slot = if state.get(m, P_ENCORE_TURNS) > 0 {
        state.get(m, P_ENCORE_SLOT)
    } else {
        -1
    };
    let choice_slot = if state
        .item(m)
        .map(|id| dex.item(id).category == ItemCategory::Choice)
        .unwrap_or(false)
    {
        state.get(m, P_CHOICE_SLOT)
    } else {
        -1
    };
    for slot in 0..MOVE_SLOTS {
        let Some(id) = state.move_id(m, slot) else {
            continue;
        };
        if state.pp(m, slot) <= 0 {
            continue;
        }
        if state.get(m, P_DISABLE_SLOT) == slot as i32 {
            continue;
        }
        if state.get(m, P_TAUNT_TURNS) > 0 && dex.mov(id).is_status() {
            continue;
        }
        if encore_slot >= 0 && encore_slot != slot as i32 {
            continue;
        }
        if choice_slot >= 0 && choice_slot != slot as i32 {
            continue;
        }
        out.push(slot);
    }
    out
}

pub fn validate_action(
    state: &BattleState,
    dex: &Dex,
    side: usize,
    action: &Action,
) -> Result<(), ActionError> {
    if side >= state.format.num_sides {
        return Err(ActionError::BadSide { side });
    }
    let slot = action.slot();
    if slot >= state.format.active_slots {
        return Err(ActionError::BadSlot { slot });
    }
    let Some(team_slot) = state.active_team_slot(side, slot) else {
        return Err(ActionError::BadSlot { slot });
    };
    let m = MonRef::new(side, team_slot);

    match *action {
        Action::Pass { .. } => Err(ActionError::IllegalPass { side, slot }),
        Action::Switch { team_slot: to, .. } => {
            if !switching::can_switch_out(state, m, SwitchKind::Voluntary) {
                return Err(ActionError::Trapped { side, slot });
            }
            if !state.available_switches(side).contains(&to) {
                return Err(ActionError::BadSwitchTarget {
                    side,
                    team_slot: to,
                });
            }
            Ok(())
        }
        Action::Move {
            move_slot,
            target,
            tera,
            ..
        } => {
            let selectable = selectable_move_slots(state, dex, m);
            if move_slot == STRUGGLE_SLOT {
                if !selectable.is_empty() {
                    return Err(ActionError::EmptyMoveSlot {
                        side,
                        slot,
                        move_slot,
                    });
                }
            } else {
                if move_slot >= MOVE_SLOTS || state.move_id(m, move_slot).is_none() {
                    return Err(ActionError::EmptyMoveSlot {
                        side,
                        slot,
                        move_slot,
                    });
                }
                if state.pp(m, move_slot) <= 0 {
                    return Err(ActionError::NoPp {
                        side,
                        slot,
                        move_slot,
                    });
                }
                if state.get(m, P_DISABLE_SLOT) == move_slot as i32 {
                    return Err(ActionError::MoveDisabled {
                        side,
                        slot,
                        move_slot,
                    });
                }
                if !selectable.contains(&move_slot) {
                    // Distinguish the lock kind for the caller.
                    let id = state.move_id(m, move_slot).unwrap();
                    if state.get(m, P_TAUNT_TURNS) > 0 && dex.mov(id).is_status() {
                        return Err(ActionError::Taunted { side, slot });
                    }
                    if state.get(m, P_ENCORE_TURNS) > 0 {
                        return Err(ActionError::EncoreLocked { side, slot });
                    }
                    return Err(ActionError::ChoiceLocked { side, slot });
                }
            }
            if tera && (!state.tera_available(side) || state.get(m, P_TERA_TYPE) == TYPE_NONE) {
                return Err(ActionError::TeraUnavailable { side, slot });
            }
            let data = move_data_for(dex, state, m, move_slot).unwrap();
            if !target_matches(&data, target, state.format.active_slots) {
                return Err(ActionError::BadTarget { side, slot });
            }
            Ok(())
        }
    }
}

fn target_matches(data: &MoveData, target: TargetRef, active_slots: usize) -> bool {
    match data.target {
        MoveTarget::User => matches!(target, TargetRef::User),
        MoveTarget::Normal => match target {
            TargetRef::Foe(i) => i < active_slots,
            TargetRef::RandomFoe => true,
            TargetRef::Ally(i) => i < active_slots,
            _ => false,
        },
        MoveTarget::AllAdjacentFoes => matches!(target, TargetRef::AllAdjacentFoes),
        MoveTarget::AllOthers => matches!(target, TargetRef::AllOthers),
        MoveTarget::UserSide => matches!(target, TargetRef::UserSide),
        MoveTarget::FoeSide => matches!(target, TargetRef::FoeSide),
        MoveTarget::All => matches!(target, TargetRef::All),
    }
}

/// Enumerate every selectable action for a side, one list entry per legal
/// choice across its active slots.
pub fn legal_actions(state: &BattleState, dex: &Dex, side: usize) -> Vec<Action> {
    let mut out = Vec::new();
    for slot in 0..state.format.active_slots {
        let Some(team_slot) = state.active_team_slot(side, slot) else {
            continue;
        };
        let m = MonRef::new(side, team_slot);
        if state.is_fainted(m) {
            continue;
        }
        let selectable = selectable_move_slots(state, dex, m);
        if selectable.is_empty() {
            out.push(Action::Move {
                slot,
                move_slot: STRUGGLE_SLOT,
                target: TargetRef::Foe(0),
                tera: false,
            });
        }
        for move_slot in selectable {
            let id = state.move_id(m, move_slot).unwrap();
            let data = dex.mov(id);
            match data.target {
                MoveTarget::User => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::User,
                    tera: false,
                }),
                MoveTarget::Normal => {
                    for foe_slot in 0..state.format.active_slots {
                        for foe_side in 0..state.format.num_sides {
                            if foe_side == side {
                                continue;
                            }
                            if let Some(ts) = state.active_team_slot(foe_side, foe_slot) {
                                if !state.is_fainted(MonRef::new(foe_side, ts)) {
                                    out.push(Action::Move {
                                        slot,
                                        move_slot,
                                        target: TargetRef::Foe(foe_slot),
                                        tera: false,
                                    });
                                }
                            }
                        }
                    }
                }
                MoveTarget::AllAdjacentFoes => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::AllAdjacentFoes,
                    tera: false,
                }),
                MoveTarget::AllOthers => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::AllOthers,
                    tera: false,
                }),
                MoveTarget::UserSide => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::UserSide,
                    tera: false,
                }),
                MoveTarget::FoeSide => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::FoeSide,
                    tera: false,
                }),
                MoveTarget::All => out.push(Action::Move {
                    slot,
                    move_slot,
                    target: TargetRef::All,
                    tera: false,
                }),
            }
        }
        if switching::can_switch_out(state, m, SwitchKind::Voluntary) {
            for team_slot in state.available_switches(side) {
                out.push(Action::Switch { slot, team_slot });
            }
        }
    }
    out
}

// --- Turn driver ------------------------------------------------------------

/// Execute one full turn from validated actions. The caller has already
/// rejected anything illegal; this function never partially applies an
/// invalid action.
pub fn run_turn(state: &mut BattleState, dex: &Dex, actions: &[(usize, Action)]) {
    state.turn += 1;
    state.log.push(LogRecord::TurnStart { turn: state.turn });

    // Phase 2: voluntary switches, side order then slot index.
    let mut sorted: Vec<&(usize, Action)> = actions.iter().collect();
    sorted.sort_by_key(|(side, action)| (*side, action.slot()));
    for (side, action) in &sorted {
        if let Action::Switch { slot, team_slot } = action {
            switching::perform_switch(state, dex, *side, *slot, *team_slot);
            process_faints(state, dex, None);
            if end_if_over(state) {
                return;
            }
        }
    }

    // Terastallization resolves before any move, in side/slot order.
    for (side, action) in &sorted {
        if let Action::Move { slot, tera: true, .. } = action {
            if let Some(team_slot) = state.active_team_slot(*side, *slot) {
                let m = MonRef::new(*side, team_slot);
                if !state.is_fainted(m) {
                    state.terastallize(m);
                }
            }
        }
    }

    // Phase 3: ordering keys for move actions.
    let mut queue: Vec<QueuedMove> = Vec::new();
    for (side, action) in &sorted {
        if let Action::Move {
            slot,
            move_slot,
            target,
            ..
        } = action
        {
            let Some(team_slot) = state.active_team_slot(*side, *slot) else {
                continue;
            };
            let attacker = MonRef::new(*side, team_slot);
            if state.is_fainted(attacker) {
                continue;
            }
            let data = move_data_for(dex, state, attacker, *move_slot).unwrap();
            let mut priority = data.priority as i32;
            if let Some((terrain, bonus)) = data.terrain_priority {
                if state.terrain() == terrain && state.is_grounded(dex, attacker) {
                    priority += bonus as i32;
                }
            }
            priority += events::run_modify_priority(state, dex, attacker, data.category) as i32;
            let speed = state.effective_speed(dex, attacker);
            let speed_tier = if state.trick_room_active() { -speed } else { speed };
            queue.push(QueuedMove {
                attacker,
                move_slot: *move_slot,
                target: *target,
                priority,
                speed_tier,
            });
        }
    }

    // Pending damaging actions, for Sucker Punch's pre-check.
    let mut queued_attacks: Vec<MonRef> = queue
        .iter()
        .filter(|q| {
            move_data_for(dex, state, q.attacker, q.move_slot)
                .map(|d| !d.is_status())
                .unwrap_or(false)
        })
        .map(|q| q.attacker)
        .collect();

    // Phase 4: selection-sort execution; the speed-tie coin is drawn fresh
    // each time a tie actually occurs.
    while !queue.is_empty() {
        let mut best = 0;
        let mut ties = vec![0usize];
        for i in 1..queue.len() {
            let a = &queue[i];
            let b = &queue[best];
            let ord = (a.priority, a.speed_tier).cmp(&(b.priority, b.speed_tier));
            match ord {
                std::cmp::Ordering::Greater => {
                    best = i;
                    ties = vec![i];
                }
                std::cmp::Ordering::Equal => ties.push(i),
                std::cmp::Ordering::Less => {}
            }
        }
        let chosen_idx = if ties.len() > 1 {
            ties[state.prng.next(ties.len() as u32) as usize]
        } else {
            best
        };
        let q = queue.remove(chosen_idx);
        queued_attacks.retain(|&m| m != q.attacker);
        let mut faint_source = None;
        if !state.is_fainted(q.attacker) {
            faint_source = execute_move(state, dex, &q, &queued_attacks);
        }
        process_faints(state, dex, faint_source);
        if end_if_over(state) {
            return;
        }
    }

    // Phase 5: residuals.
    run_residuals(state, dex);
    process_faints(state, dex, None);
    if end_if_over(state) {
        return;
    }

    // Phase 8: turn bookkeeping.
    turn_bookkeeping(state);
}

fn end_if_over(state: &mut BattleState) -> bool {
    if let Some(winner) = battle_outcome(state) {
        state.log.push(LogRecord::Ended { winner });
        true
    } else {
        false
    }
}

// --- Move execution ---------------------------------------------------------

/// Returns the faint source to attribute to this action: the attacker and
/// whether its move made contact (Aftermath cares).
fn execute_move(
    state: &mut BattleState,
    dex: &Dex,
    q: &QueuedMove,
    queued_attacks: &[MonRef],
) -> Option<(MonRef, bool)> {
    let attacker = q.attacker;

    // Pre-move rolls, in the documented order.
    if !before_move(state, attacker) {
        return None;
    }

    let data = move_data_for(dex, state, attacker, q.move_slot).unwrap();
    let move_id = if q.move_slot == STRUGGLE_SLOT {
        None
    } else {
        state.move_id(attacker, q.move_slot)
    };

    // The move is attempted from here on: PP is spent even if it fails.
    if let Some(slot) = (q.move_slot != STRUGGLE_SLOT).then_some(q.move_slot) {
        state.dec_pp(attacker, slot);
        if state
            .item(attacker)
            .map(|id| dex.item(id).category == ItemCategory::Choice)
            .unwrap_or(false)
            && state.get(attacker, P_CHOICE_SLOT) < 0
        {
            state.set(attacker, P_CHOICE_SLOT, slot as i32);
        }
    }
    state.set(attacker, P_LAST_MOVE, move_id.map_or(-1, |id| id as i32));
    if !data.protect_self {
        state.set(attacker, P_PROTECT_STREAK, 0);
    }

    let log_id = move_id.unwrap_or(u16::MAX);

    // Execution-time pre-checks (Sucker Punch, Fake Out).
    match data.pre_check {
        Some(PreCheck::TargetAttackQueued) => {
            let target_ok = resolve_single_target(state, q)
                .map(|t| queued_attacks.contains(&t))
                .unwrap_or(false);
            if !target_ok {
                state.log.push(LogRecord::Fail {
                    side: attacker.side,
                    slot: attacker.slot,
                    move_id: log_id,
                });
                return None;
            }
        }
        Some(PreCheck::FirstTurnOut) => {
            // Legal only on the first turn after entering the field.
            if state.get(attacker, P_ENTERED_TURN) + 1 != state.turn as i32 {
                state.log.push(LogRecord::Fail {
                    side: attacker.side,
                    slot: attacker.slot,
                    move_id: log_id,
                });
                return None;
            }
        }
        None => {}
    }

    // Side- and field-targeting moves skip the per-target pipeline.
    if data.targets_field() {
        let targets = field_targets(state, attacker, q.target);
        state.log.push(LogRecord::Move {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
            targets: Vec::new(),
        });
        apply_field_move(state, dex, attacker, &data, log_id, targets);
        return None;
    }

    // Self-targeting moves.
    if data.target == MoveTarget::User {
        state.log.push(LogRecord::Move {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
            targets: vec![(attacker.side, attacker.slot)],
        });
        apply_self_move(state, attacker, &data, log_id);
        return None;
    }

    // Targeted moves: resolve at execution time.
    let targets = resolve_targets(state, q);
    state.log.push(LogRecord::Move {
        side: attacker.side,
        slot: attacker.slot,
        move_id: log_id,
        targets: targets.iter().map(|t| (t.side, t.slot)).collect(),
    });
    if targets.is_empty() {
        state.log.push(LogRecord::Fail {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
        });
        return None;
    }

    let live_targets = targets.iter().filter(|t| !state.is_fainted(**t)).count();
    let spread_hit = live_targets > 1;
    let mut total_damage = 0i32;
    let mut connected = false;

    for target in targets {
        if state.is_fainted(target) || state.is_fainted(attacker) {
            continue;
        }
        let dealt = run_pipeline_for_target(
            state,
            dex,
            attacker,
            target,
            &data,
            log_id,
            q.move_slot == STRUGGLE_SLOT,
            spread_hit,
        );
        if let Some(dealt) = dealt {
            connected = true;
            total_damage += dealt;
        }
    }

    if connected {
        // Self stat drops/raises from a successful hit (Close Combat).
        if let Some(self_boosts) = data.self_boosts {
            if !state.is_fainted(attacker) {
                for (i, &delta) in self_boosts.iter().enumerate() {
                    if delta != 0 {
                        state.boost(attacker, ALL_BOOST_AXES[i], delta as i32);
                    }
                }
            }
        }
        let ctx = MoveCtx {
            attacker,
            target: attacker,
            move_id: log_id,
            move_type: data.move_type,
            category: data.category,
            base_power: data.base_power,
            contact: data.flags.contains(MoveFlags::CONTACT),
            sound: data.flags.contains(MoveFlags::SOUND),
            damage: total_damage,
        };
        events::run_after_move(state, dex, &ctx);
        // Pivot switch on a successful hit only, to the first reserve.
        if data.self_switch && !state.is_fainted(attacker) {
            if let Some(&reserve) = state.available_switches(attacker.side).first() {
                if let Some(active_slot) = state.active_slot_of(attacker) {
                    switching::perform_switch(state, dex, attacker.side, active_slot, reserve);
                }
            }
        }
    }
    Some((attacker, data.flags.contains(MoveFlags::CONTACT)))
}

/// Pre-move status gate. Sleep, freeze, paralysis, confusion, then flinch.
/// Returns false when the Pokemon cannot act; none of these consume PP.
fn before_move(state: &mut BattleState, m: MonRef) -> bool {
    match state.status(m) {
        StatusKind::Sleep => {
            let counter = state.get(m, P_STATUS_COUNTER);
            if counter > 0 {
                state.set(m, P_STATUS_COUNTER, counter - 1);
                return false;
            }
            state.cure_status(m);
        }
        StatusKind::Freeze => {
            if state.prng.chance(20, 100) {
                state.cure_status(m);
            } else {
                return false;
            }
        }
        StatusKind::Paralysis => {
            if state.prng.chance(25, 100) {
                return false;
            }
        }
        _ => {}
    }
    if state.has_volatile(m, Volatiles::CONFUSION) {
        let turns = state.get(m, P_CONFUSION_TURNS) - 1;
        state.set(m, P_CONFUSION_TURNS, turns.max(0));
        if turns <= 0 {
            state.clear_volatile(m, Volatiles::CONFUSION);
        } else if state.prng.chance(33, 100) {
            state.log.push(LogRecord::Activate {
                side: m.side,
                slot: m.slot,
                what: Activation::Confusion,
            });
            let self_hit = damage::confusion_damage(state, m);
            state.damage(m, self_hit, Cause::Confusion);
            return false;
        }
    }
    if state.has_volatile(m, Volatiles::FLINCH) {
        return false;
    }
    true
}

/// The per-target damaging/status pipeline. Returns `Some(dealt)` when the
/// move connected with this target (0 for connecting status moves).
#[allow(clippy::too_many_arguments)]
fn run_pipeline_for_target(
    state: &mut BattleState,
    dex: &Dex,
    attacker: MonRef,
    target: MonRef,
    data: &MoveData,
    log_id: u16,
    is_struggle: bool,
    spread_hit: bool,
) -> Option<i32> {
    // Protection comes before anything else the target would do.
    if state.has_volatile(target, Volatiles::PROTECT)
        && data.flags.contains(MoveFlags::PROTECT)
        && attacker != target
    {
        state.log.push(LogRecord::Activate {
            side: target.side,
            slot: target.slot,
            what: Activation::Protect,
        });
        return None;
    }

    let mut ctx = MoveCtx {
        attacker,
        target,
        move_id: log_id,
        move_type: data.move_type,
        category: data.category,
        base_power: data.base_power,
        contact: data.flags.contains(MoveFlags::CONTACT),
        sound: data.flags.contains(MoveFlags::SOUND),
        damage: 0,
    };

    // Step 2: type resolution.
    ctx.move_type = events::run_modify_type(state, dex, &ctx);

    // Step 3: accuracy.
    if let Some(accuracy) = data.accuracy {
        if data.ohko {
            // Level-gated OHKO accuracy; higher-leveled targets are safe.
            let attacker_level = state.get(attacker, P_LEVEL);
            let target_level = state.get(target, P_LEVEL);
            if target_level > attacker_level {
                state.log.push(LogRecord::Fail {
                    side: attacker.side,
                    slot: attacker.slot,
                    move_id: log_id,
                });
                return None;
            }
            let threshold = (accuracy as i32 + attacker_level - target_level).max(0) as u32;
            if state.prng.next(100) >= threshold {
                state.log.push(LogRecord::Miss {
                    side: attacker.side,
                    slot: attacker.slot,
                });
                return None;
            }
            let hp = state.hp(target);
            state.damage(target, hp, Cause::Move(log_id));
            return Some(hp);
        }
        if !damage::accuracy_roll(state, dex, &ctx, accuracy) {
            state.log.push(LogRecord::Miss {
                side: attacker.side,
                slot: attacker.slot,
            });
            return None;
        }
    }

    // Step 4: ability immunities and absorption.
    if let Some(cause) = events::run_try_hit(state, dex, &ctx) {
        damage::log_immune(state, target, cause);
        return None;
    }

    // Powder moves cannot touch Grass types.
    if data.flags.contains(MoveFlags::POWDER) && state.has_type(target, Type::Grass) {
        damage::log_immune(state, target, Cause::Move(log_id));
        return None;
    }

    if data.is_status() {
        // A Substitute blocks targeted status moves unless sound or a
        // bypassing flag gets through.
        if state.has_volatile(target, Volatiles::SUBSTITUTE)
            && !data.flags.contains(MoveFlags::BYPASS_SUB)
            && !data.flags.contains(MoveFlags::SOUND)
            && attacker != target
        {
            state.log.push(LogRecord::Fail {
                side: attacker.side,
                slot: attacker.slot,
                move_id: log_id,
            });
            return None;
        }
        return apply_status_move(state, dex, attacker, target, data, log_id);
    }

    // Steps 5-9: damaging move, hit loop.
    if !is_struggle {
        ctx.base_power = damage::compute_power(state, dex, attacker, target, ctx.move_id);
    }

    let hits = match data.hit_count {
        None => 1,
        Some(HitCount::Fixed(n)) => n,
        Some(HitCount::Range(_, _)) => {
            let roll = state.prng.next(20);
            if state.has_ability_effect(dex, attacker, EffectId::SkillLink) {
                5
            } else if state.has_item_effect(dex, attacker, EffectId::LoadedDice) {
                4 + (roll % 2) as u8
            } else {
                match roll {
                    0..=6 => 2,
                    7..=13 => 3,
                    14..=16 => 4,
                    _ => 5,
                }
            }
        }
    };

    let sheer_force = state.has_ability_effect(dex, attacker, EffectId::SheerForce);
    let mut total = 0i32;
    let mut landed = false;

    for _hit in 0..hits {
        if state.is_fainted(target) || state.is_fainted(attacker) {
            break;
        }
        // Base power hooks run per hit; Flash Fire's stored boost applies to
        // the holder's own Fire moves.
        let mut power = ctx.base_power as u32;
        let chain = events::modify_chain(state, dex, Hook::BasePower, attacker, &ctx);
        if chain != NEUTRAL {
            power = events::apply_mod(power, chain);
        }
        if ctx.move_type == Type::Fire && state.get(attacker, P_FLASH_FIRE) != 0 {
            power = events::apply_mod(power, 6144);
        }

        let outcome = damage::compute_damage(
            state,
            dex,
            &ctx,
            data,
            power.min(u16::MAX as u32) as u16,
            spread_hit,
            is_struggle,
        );
        if outcome.quarters == 0 {
            damage::log_immune(state, target, Cause::Move(log_id));
            return if landed { Some(total) } else { None };
        }
        landed = true;

        // Substitute soaks hits that do not bypass it.
        let behind_sub = state.has_volatile(target, Volatiles::SUBSTITUTE)
            && !data.flags.contains(MoveFlags::BYPASS_SUB)
            && attacker != target;
        let dealt;
        if behind_sub {
            let sub_hp = state.get(target, P_SUB_HP);
            dealt = outcome.damage.min(sub_hp);
            let remaining = sub_hp - dealt;
            if remaining <= 0 {
                state.set(target, P_SUB_HP, 0);
                state.clear_volatile(target, Volatiles::SUBSTITUTE);
                state.log.push(LogRecord::Activate {
                    side: target.side,
                    slot: target.slot,
                    what: Activation::SubstituteFaded,
                });
            } else {
                state.set(target, P_SUB_HP, remaining);
            }
            damage::log_hit_details(state, &ctx, &outcome);
        } else {
            dealt = state.damage(target, outcome.damage, Cause::Move(log_id));
            damage::log_hit_details(state, &ctx, &outcome);
            ctx.damage = dealt;
            // Step 9: contact/on-hit abilities, then recoil and drain.
            events::run_damaging_hit(state, dex, &ctx);
        }
        total += dealt;

        if is_struggle && dealt > 0 {
            let recoil = (state.max_hp(attacker) / 4).max(1);
            state.damage(attacker, recoil, Cause::Struggle);
        }
        if let Some((num, den)) = data.recoil {
            if dealt > 0 {
                let recoil =
                    ((dealt as u32 * num as u32 + den as u32 / 2) / den as u32).max(1) as i32;
                state.damage(attacker, recoil, Cause::Recoil);
            }
        }
        if let Some((num, den)) = data.drain {
            if dealt > 0 && !behind_sub {
                let heal = ((dealt as u32 * num as u32 + den as u32 / 2) / den as u32).max(1) as i32;
                state.heal(attacker, heal, Cause::Drain);
            }
        }

        // Secondary rolls, in declared order. The roll always happens; the
        // shield checks come after so the stream stays stable.
        for secondary in &data.secondaries {
            let rolled = state.prng.chance(secondary.chance as u32, 100);
            if !rolled || sheer_force {
                continue;
            }
            if behind_sub || state.is_fainted(target) {
                continue;
            }
            if state.has_item_effect(dex, target, EffectId::CovertCloak) {
                continue;
            }
            if let Some(status) = secondary.status {
                try_apply_status(state, target, status, true);
            }
            if secondary.flinch {
                state.set_volatile(target, Volatiles::FLINCH);
            }
            if secondary.confusion {
                try_confuse(state, target);
            }
            if let Some(boosts) = secondary.boosts {
                apply_external_boosts(state, target, &boosts);
            }
        }
    }

    if landed {
        Some(total)
    } else {
        None
    }
}

/// Negative external stat changes respect Mist.
fn apply_external_boosts(state: &mut BattleState, target: MonRef, boosts: &[i8; 7]) {
    let mist = state.side_condition(target.side, SideCondition::Mist) > 0;
    for (i, &delta) in boosts.iter().enumerate() {
        if delta == 0 {
            continue;
        }
        if delta < 0 && mist {
            continue;
        }
        state.boost(target, ALL_BOOST_AXES[i], delta as i32);
    }
}

fn apply_status_move(
    state: &mut BattleState,
    dex: &Dex,
    attacker: MonRef,
    target: MonRef,
    data: &MoveData,
    log_id: u16,
) -> Option<i32> {
    let mut did_anything = false;

    if let Some(status) = data.status {
        if try_apply_status(state, target, status, attacker != target) {
            did_anything = true;
        }
    }
    if let Some(boosts) = data.boosts {
        let before = state.log.len();
        if attacker == target {
            for (i, &delta) in boosts.iter().enumerate() {
                if delta != 0 {
                    state.boost(target, ALL_BOOST_AXES[i], delta as i32);
                }
            }
        } else {
            apply_external_boosts(state, target, &boosts);
        }
        if state.log.len() > before {
            did_anything = true;
        }
    }
    if let Some(applied) = data.applies {
        did_anything |= apply_volatile(state, attacker, target, applied);
    }

    if did_anything {
        Some(0)
    } else {
        state.log.push(LogRecord::Fail {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
        });
        None
    }
}

fn apply_volatile(
    state: &mut BattleState,
    _attacker: MonRef,
    target: MonRef,
    applied: AppliedEffect,
) -> bool {
    let activate = |state: &mut BattleState, what| {
        state.log.push(LogRecord::Activate {
            side: target.side,
            slot: target.slot,
            what,
        });
    };
    match applied {
        AppliedEffect::Taunt => {
            if state.get(target, P_TAUNT_TURNS) > 0 {
                return false;
            }
            state.set(target, P_TAUNT_TURNS, 3);
            activate(state, Activation::Taunt);
            true
        }
        AppliedEffect::Encore => {
            if state.get(target, P_ENCORE_TURNS) > 0 {
                return false;
            }
            let last = state.get(target, P_LAST_MOVE);
            if last < 0 {
                return false;
            }
            let Some(slot) = (0..MOVE_SLOTS)
                .find(|&s| state.move_id(target, s) == Some(last as u16))
            else {
                return false;
            };
            state.set(target, P_ENCORE_TURNS, 3);
            state.set(target, P_ENCORE_SLOT, slot as i32);
            activate(state, Activation::Encore);
            true
        }
        AppliedEffect::Disable => {
            if state.get(target, P_DISABLE_SLOT) >= 0 {
                return false;
            }
            let last = state.get(target, P_LAST_MOVE);
            if last < 0 {
                return false;
            }
            let Some(slot) = (0..MOVE_SLOTS)
                .find(|&s| state.move_id(target, s) == Some(last as u16))
            else {
                return false;
            };
            state.set(target, P_DISABLE_SLOT, slot as i32);
            state.set(target, P_DISABLE_TURNS, 4);
            activate(state, Activation::Disable);
            true
        }
        AppliedEffect::LeechSeed => {
            if state.has_volatile(target, Volatiles::LEECH_SEED)
                || state.has_type(target, Type::Grass)
            {
                return false;
            }
            state.set_volatile(target, Volatiles::LEECH_SEED);
            events::register_volatile(state, target, EffectId::LeechSeeded, Hook::Residual);
            activate(state, Activation::LeechSeed);
            true
        }
        AppliedEffect::Substitute => {
            let quarter = state.max_hp(target) / 4;
            if state.has_volatile(target, Volatiles::SUBSTITUTE) || state.hp(target) <= quarter {
                return false;
            }
            state.damage(target, quarter, Cause::Substitute);
            state.set_volatile(target, Volatiles::SUBSTITUTE);
            state.set(target, P_SUB_HP, quarter);
            activate(state, Activation::Substitute);
            true
        }
        AppliedEffect::Confuse => {
            if try_confuse(state, target) {
                activate(state, Activation::Confusion);
                true
            } else {
                false
            }
        }
        AppliedEffect::Trap => {
            if state.has_volatile(target, Volatiles::TRAPPED) {
                return false;
            }
            state.set_volatile(target, Volatiles::TRAPPED);
            activate(state, Activation::Trap);
            true
        }
    }
}

/// Self-targeting status moves: Protect, heals, self-boosts, Substitute.
fn apply_self_move(
    state: &mut BattleState,
    attacker: MonRef,
    data: &MoveData,
    log_id: u16,
) {
    if data.protect_self {
        let streak = state.get(attacker, P_PROTECT_STREAK);
        let succeeded = if streak == 0 {
            true
        } else {
            // Consecutive protects decay at 1/3 per prior success.
            let denominator = 3u32.saturating_pow(streak.min(6) as u32);
            state.prng.chance(1, denominator)
        };
        if succeeded {
            state.set_volatile(attacker, Volatiles::PROTECT);
            state.set(attacker, P_PROTECT_STREAK, streak + 1);
            state.log.push(LogRecord::Activate {
                side: attacker.side,
                slot: attacker.slot,
                what: Activation::Protect,
            });
        } else {
            state.set(attacker, P_PROTECT_STREAK, 0);
            state.log.push(LogRecord::Fail {
                side: attacker.side,
                slot: attacker.slot,
                move_id: log_id,
            });
        }
        return;
    }

    let mut did_anything = false;
    if let Some((num, den)) = data.heal {
        let amount = (state.max_hp(attacker) as u32 * num as u32 / den as u32) as i32;
        if state.heal(attacker, amount, Cause::Move(log_id)) > 0 {
            did_anything = true;
        }
    }
    if let Some(boosts) = data.boosts {
        for (i, &delta) in boosts.iter().enumerate() {
            if delta != 0 && state.boost(attacker, ALL_BOOST_AXES[i], delta as i32) != 0 {
                did_anything = true;
            }
        }
    }
    if let Some(applied) = data.applies {
        did_anything |= apply_volatile(state, attacker, attacker, applied);
    }
    if !did_anything && data.heal.is_some() {
        state.log.push(LogRecord::Fail {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
        });
    }
}

/// Side- and field-installing moves. The conditions own their lifecycle:
/// `try_start_*` sets the value, registers the handlers and fires the start
/// hook; rooms toggle off through the end hook.
fn apply_field_move(
    state: &mut BattleState,
    dex: &Dex,
    attacker: MonRef,
    data: &MoveData,
    log_id: u16,
    target_side: Option<usize>,
) {
    let fail = |state: &mut BattleState| {
        state.log.push(LogRecord::Fail {
            side: attacker.side,
            slot: attacker.slot,
            move_id: log_id,
        });
    };

    if let Some(condition) = data.side_condition {
        let side = target_side.unwrap_or(attacker.side);
        if !conditions::try_start_side(state, dex, side, condition) {
            fail(state);
        }
        return;
    }

    if let Some(rule) = data.field_effect {
        // Rooms toggle: reusing the move while active ends it early.
        let toggles = matches!(
            rule.kind,
            FieldKind::TrickRoom | FieldKind::MagicRoom | FieldKind::WonderRoom
        );
        if toggles && conditions::field_active(state, rule.kind) {
            conditions::end_field(state, dex, rule.kind);
            return;
        }
        if !conditions::try_start_field(state, dex, rule.kind, rule.turns as i32) {
            fail(state);
        }
    }
}

// --- Target resolution ------------------------------------------------------

fn foes_of(state: &BattleState, side: usize) -> Vec<MonRef> {
    let mut out = Vec::new();
    for foe_side in 0..state.format.num_sides {
        if foe_side == side {
            continue;
        }
        for a in 0..state.format.active_slots {
            if let Some(slot) = state.active_team_slot(foe_side, a) {
                let m = MonRef::new(foe_side, slot);
                if !state.is_fainted(m) {
                    out.push(m);
                }
            }
        }
    }
    out
}

fn resolve_single_target(state: &mut BattleState, q: &QueuedMove) -> Option<MonRef> {
    match q.target {
        TargetRef::User => Some(q.attacker),
        TargetRef::Ally(slot) => {
            let ts = state.active_team_slot(q.attacker.side, slot)?;
            Some(MonRef::new(q.attacker.side, ts))
        }
        TargetRef::Foe(slot) => {
            // Execution-time retargeting: a fainted chosen target redirects
            // to the first live foe.
            let foe_side = (0..state.format.num_sides).find(|&s| s != q.attacker.side)?;
            if let Some(ts) = state.active_team_slot(foe_side, slot) {
                let m = MonRef::new(foe_side, ts);
                if !state.is_fainted(m) {
                    return Some(m);
                }
            }
            foes_of(state, q.attacker.side).first().copied()
        }
        TargetRef::RandomFoe => {
            let foes = foes_of(state, q.attacker.side);
            if foes.is_empty() {
                None
            } else {
                let idx = state.prng.next(foes.len() as u32) as usize;
                Some(foes[idx])
            }
        }
        _ => None,
    }
}

fn resolve_targets(state: &mut BattleState, q: &QueuedMove) -> Vec<MonRef> {
    match q.target {
        TargetRef::AllAdjacentFoes => foes_of(state, q.attacker.side),
        TargetRef::AllOthers => {
            let mut out = Vec::new();
            for (_, _, m) in state.all_active() {
                if m != q.attacker && !state.is_fainted(m) {
                    out.push(m);
                }
            }
            out
        }
        _ => resolve_single_target(state, q).into_iter().collect(),
    }
}

fn field_targets(state: &BattleState, attacker: MonRef, target: TargetRef) -> Option<usize> {
    match target {
        TargetRef::UserSide => Some(attacker.side),
        TargetRef::FoeSide => (0..state.format.num_sides).find(|&s| s != attacker.side),
        _ => None,
    }
}

// --- Residual phase ---------------------------------------------------------

/// End-of-turn effects, grouped by scope: field conditions first (weather
/// damage, terrain healing, duration ticks), then side conditions, then the
/// per-Pokemon residuals in speed order - item residuals before the Leech
/// Seed volatile through the dispatcher's source-kind ordering, status
/// damage last.
pub fn run_residuals(state: &mut BattleState, dex: &Dex) {
    events::run_field_residuals(state, dex);
    events::run_side_residuals(state, dex);

    for m in events::residual_order(state, dex) {
        if !state.is_fainted(m) {
            events::run_residual(state, dex, m);
        }
    }

    // Status damage.
    for m in events::residual_order(state, dex) {
        if state.is_fainted(m) {
            continue;
        }
        match state.status(m) {
            StatusKind::Burn => {
                let amount = (state.max_hp(m) / 16).max(1);
                state.damage(m, amount, Cause::Status(StatusKind::Burn));
            }
            StatusKind::Poison => {
                let amount = (state.max_hp(m) / 8).max(1);
                state.damage(m, amount, Cause::Status(StatusKind::Poison));
            }
            StatusKind::Toxic => {
                let counter = state.get(m, P_STATUS_COUNTER) + 1;
                state.set(m, P_STATUS_COUNTER, counter);
                let amount = (state.max_hp(m) * counter / 16).max(1);
                state.damage(m, amount, Cause::Status(StatusKind::Toxic));
            }
            _ => {}
        }
    }
}

/// Phase 8: clear single-turn volatiles, tick multi-turn volatile counters,
/// count active turns.
fn turn_bookkeeping(state: &mut BattleState) {
    for (_, _, m) in state.all_active() {
        state.clear_volatile(m, TURN_CLEARED_VOLATILES);
        let taunt = state.get(m, P_TAUNT_TURNS);
        if taunt > 0 {
            state.set(m, P_TAUNT_TURNS, taunt - 1);
        }
        let encore = state.get(m, P_ENCORE_TURNS);
        if encore > 0 {
            state.set(m, P_ENCORE_TURNS, encore - 1);
            if encore == 1 {
                state.set(m, P_ENCORE_SLOT, -1);
            }
        }
        let disable = state.get(m, P_DISABLE_TURNS);
        if disable > 0 {
            state.set(m, P_DISABLE_TURNS, disable - 1);
            if disable == 1 {
                state.set(m, P_DISABLE_SLOT, -1);
            }
        }
    }
}

/// Active slots vacated by faints that the side can still refill. A side
/// with fewer reserves than vacancies is only asked to fill what it has;
/// the rest of its slots stay empty.
pub fn forced_switch_requirements(state: &BattleState) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    for side in 0..state.format.num_sides {
        let mut reserves = state.available_switches(side).len();
        for a in 0..state.format.active_slots {
            if reserves == 0 {
                break;
            }
            if let Some(slot) = state.active_team_slot(side, a) {
                if state.is_fainted(MonRef::new(side, slot)) {
                    out.push((side, a));
                    reserves -= 1;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::SAMPLE_DEX;
    use crate::sim::state::{FormatDescriptor, PokemonBuild};
    use crate::sim::switching::place;

    fn singles_state(a: PokemonBuild, b: PokemonBuild) -> BattleState {
        let dex = &*SAMPLE_DEX;
        let mut state = BattleState::new(FormatDescriptor::singles(), 77);
        state.load_team(dex, 0, &[a]).unwrap();
        state.load_team(dex, 1, &[b]).unwrap();
        place(&mut state, dex, 0, 0, 0);
        place(&mut state, dex, 1, 0, 0);
        state
    }

    #[test]
    fn taunt_filters_status_moves_from_selection() {
        let dex = &*SAMPLE_DEX;
        let mut state = singles_state(
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle", "Recover"]),
            PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"]),
        );
        let m = MonRef::new(0, 0);
        assert_eq!(selectable_move_slots(&state, dex, m), vec![0, 1]);
        state.set(m, P_TAUNT_TURNS, 3);
        assert_eq!(selectable_move_slots(&state, dex, m), vec![0]);
    }

    #[test]
    fn encore_locks_to_one_slot() {
        let dex = &*SAMPLE_DEX;
        let mut state = singles_state(
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle", "Recover"]),
            PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"]),
        );
        let m = MonRef::new(0, 0);
        state.set(m, P_ENCORE_TURNS, 2);
        state.set(m, P_ENCORE_SLOT, 1);
        assert_eq!(selectable_move_slots(&state, dex, m), vec![1]);
    }

    #[test]
    fn validate_rejects_empty_and_wrong_targets() {
        let dex = &*SAMPLE_DEX;
        let state = singles_state(
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Tackle"]),
            PokemonBuild::simple("Pikachu", 50, "Static", &["Thunderbolt"]),
        );
        let empty = Action::Move {
            slot: 0,
            move_slot: 2,
            target: TargetRef::Foe(0),
            tera: false,
        };
        assert!(matches!(
            validate_action(&state, dex, 0, &empty),
            Err(crate::error::ActionError::EmptyMoveSlot { .. })
        ));
        let wrong_target = Action::Move {
            slot: 0,
            move_slot: 0,
            target: TargetRef::UserSide,
            tera: false,
        };
        assert!(matches!(
            validate_action(&state, dex, 0, &wrong_target),
            Err(crate::error::ActionError::BadTarget { .. })
        ));
    }

    #[test]
    fn speed_tie_draws_exactly_one_coin() {
        let dex = &*SAMPLE_DEX;
        // Mirror Pikachu vs Pikachu: same speed, same move, priority tie.
        let mut state = singles_state(
            PokemonBuild::simple("Pikachu", 50, "Static", &["Splash"]),
            PokemonBuild::simple("Pikachu", 50, "Static", &["Splash"]),
        );
        let actions = [
            (0usize, Action::Move { slot: 0, move_slot: 0, target: TargetRef::User, tera: false }),
            (1usize, Action::Move { slot: 0, move_slot: 0, target: TargetRef::User, tera: false }),
        ];
        let before = state.prng.clone();
        run_turn(&mut state, dex, &actions);
        // Splash draws nothing itself, so the only consumption is the tie coin.
        let mut expected = before;
        expected.next(2);
        assert_eq!(state.prng.state(), expected.state());
    }

    #[test]
    fn trick_room_negates_the_speed_tier() {
        let dex = &*SAMPLE_DEX;
        let mut state = singles_state(
            PokemonBuild::simple("Jolteon", 50, "Volt Absorb", &["Splash"]),
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Splash"]),
        );
        state.set_field(F_TRICK_ROOM, 5);
        let actions = [
            (0usize, Action::Move { slot: 0, move_slot: 0, target: TargetRef::User, tera: false }),
            (1usize, Action::Move { slot: 0, move_slot: 0, target: TargetRef::User, tera: false }),
        ];
        run_turn(&mut state, dex, &actions);
        let movers: Vec<usize> = state
            .log
            .records()
            .iter()
            .filter_map(|r| match r {
                LogRecord::Move { side, .. } => Some(*side),
                _ => None,
            })
            .collect();
        assert_eq!(movers, vec![1, 0]);
    }

    #[test]
    fn residuals_tick_toxic_upward() {
        let dex = &*SAMPLE_DEX;
        let mut state = singles_state(
            PokemonBuild::simple("Snorlax", 50, "Inner Focus", &["Splash"]),
            PokemonBuild::simple("Pikachu", 50, "Static", &["Splash"]),
        );
        let m = MonRef::new(0, 0);
        state.set_status(m, StatusKind::Toxic, 0);
        let max = state.max_hp(m);
        run_residuals(&mut state, dex);
        assert_eq!(state.hp(m), max - max / 16);
        run_residuals(&mut state, dex);
        assert_eq!(state.hp(m), max - max / 16 - max * 2 / 16);
        assert_eq!(state.get(m, P_STATUS_COUNTER), 2);
    }
}
