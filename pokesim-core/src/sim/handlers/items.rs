//! Held-item behaviors.

use crate::battle_log::Cause;
use crate::data::Dex;
use crate::sim::events::{self, MoveCtx};
use crate::sim::state::{BattleState, MonRef};

fn item_cause(state: &BattleState, holder: MonRef) -> Cause {
    Cause::Item(state.item(holder).unwrap_or(0))
}

/// 4915/4096 when the move's resolved type matches the item's boosted type.
pub fn type_boost(state: &BattleState, dex: &Dex, holder: MonRef, ctx: &MoveCtx) -> Option<u32> {
    let item = dex.item(state.item(holder)?);
    if item.type_boost == Some(ctx.move_type) {
        Some(4915)
    } else {
        None
    }
}

/// Life Orb takes a tenth of max HP after a successful damaging move.
pub fn life_orb_recoil(state: &mut BattleState, holder: MonRef, ctx: &MoveCtx) {
    if ctx.damage > 0 && !state.is_fainted(holder) {
        let cause = item_cause(state, holder);
        let amount = (state.max_hp(holder) / 10).max(1);
        state.damage(holder, amount, cause);
    }
}

/// Leftovers restores a sixteenth at residual time.
pub fn leftovers(state: &mut BattleState, holder: MonRef) {
    if state.is_fainted(holder) {
        return;
    }
    let cause = item_cause(state, holder);
    let amount = (state.max_hp(holder) / 16).max(1);
    state.heal(holder, amount, cause);
}

/// The balloon pops on the first hit that connects.
pub fn pop_air_balloon(state: &mut BattleState, holder: MonRef) {
    state.remove_item(holder);
    events::unregister_item(state, holder);
}
