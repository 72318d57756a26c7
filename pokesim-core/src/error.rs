//! Typed caller errors.
//!
//! Rule-driven failures (a miss, a blocked move) are not errors; they produce
//! log records and consume the action. These enums cover the cases where the
//! caller handed the engine something it cannot act on, reported
//! synchronously with no partial state change.

use thiserror::Error;

/// Errors while assembling the static data registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DexError {
    #[error("duplicate {kind} key '{key}'")]
    DuplicateKey { kind: &'static str, key: String },
    #[error("unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u16 },
    #[error("unknown {kind} key '{key}'")]
    UnknownKey { kind: &'static str, key: String },
}

/// Errors while building a battle from team rosters.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("side {side} has {got} Pokemon, format allows 1..={max}")]
    BadTeamSize { side: usize, got: usize, max: usize },
    #[error("side {side} slot {slot}: {source}")]
    BadMember {
        side: usize,
        slot: usize,
        source: DexError,
    },
    #[error("side {side} slot {slot}: no moves")]
    NoMoves { side: usize, slot: usize },
    #[error("side {side} slot {slot}: {got} moves, at most 4 allowed")]
    TooManyMoves { side: usize, slot: usize, got: usize },
    #[error("side {side} slot {slot}: level {level} out of range 1..=100")]
    BadLevel { side: usize, slot: usize, level: u8 },
    #[error("side {side} slot {slot}: '{ability}' is not in the species' ability pool")]
    IllegalAbility {
        side: usize,
        slot: usize,
        ability: String,
    },
}

/// Errors for an action the scheduler refuses to execute.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("battle already ended")]
    BattleEnded,
    #[error("side {side} out of range")]
    BadSide { side: usize },
    #[error("active slot {slot} out of range")]
    BadSlot { slot: usize },
    #[error("side {side} slot {slot}: missing action")]
    MissingAction { side: usize, slot: usize },
    #[error("side {side} slot {slot}: more than one action submitted")]
    DuplicateAction { side: usize, slot: usize },
    #[error("side {side} slot {slot}: move slot {move_slot} is empty")]
    EmptyMoveSlot {
        side: usize,
        slot: usize,
        move_slot: usize,
    },
    #[error("side {side} slot {slot}: move slot {move_slot} has no PP")]
    NoPp {
        side: usize,
        slot: usize,
        move_slot: usize,
    },
    #[error("side {side} slot {slot}: move slot {move_slot} is disabled")]
    MoveDisabled {
        side: usize,
        slot: usize,
        move_slot: usize,
    },
    #[error("side {side} slot {slot}: taunt forbids status moves")]
    Taunted { side: usize, slot: usize },
    #[error("side {side} slot {slot}: encore locks a different move")]
    EncoreLocked { side: usize, slot: usize },
    #[error("side {side} slot {slot}: choice item locks a different move")]
    ChoiceLocked { side: usize, slot: usize },
    #[error("side {side} slot {slot}: illegal target for this move")]
    BadTarget { side: usize, slot: usize },
    #[error("side {side} slot {slot}: Tera already used this battle")]
    TeraUnavailable { side: usize, slot: usize },
    #[error("side {side}: switch target {team_slot} is not selectable")]
    BadSwitchTarget { side: usize, team_slot: usize },
    #[error("side {side} slot {slot}: trapped, cannot switch")]
    Trapped { side: usize, slot: usize },
    #[error("side {side} slot {slot}: pass is only legal when forced")]
    IllegalPass { side: usize, slot: usize },
    #[error("forced switch phase: only switch actions for the vacated slots are accepted")]
    ForcedSwitchExpected,
}
