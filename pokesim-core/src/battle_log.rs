//! Typed, ordered battle log.
//!
//! The engine narrates every observable state change as a `LogRecord`
//! appended in event order. Replay equality is defined over this stream:
//! same seed, same actions, byte-identical serialized log. Consumers that
//! want a textual protocol render these records themselves.

use serde::{Deserialize, Serialize};

use crate::sim::layout::{SideCondition, StatusKind, Terrain, Weather};
use crate::sim::stats::BoostAxis;

/// What caused a damage/heal/status record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cause {
    Move(u16),
    Ability(u16),
    Item(u16),
    SideCondition(SideCondition),
    Status(StatusKind),
    Weather(Weather),
    Terrain(Terrain),
    LeechSeed,
    Recoil,
    Confusion,
    Struggle,
    Drain,
    Substitute,
}

/// Volatile effects announced with an `Activate` record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Protect,
    Substitute,
    SubstituteFaded,
    Taunt,
    Encore,
    Disable,
    LeechSeed,
    Confusion,
    Trap,
    Struggle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogRecord {
    TurnStart {
        turn: u32,
    },
    Activate {
        side: usize,
        slot: usize,
        what: Activation,
    },
    Switch {
        side: usize,
        slot: usize,
        species: u16,
    },
    Move {
        side: usize,
        slot: usize,
        move_id: u16,
        targets: Vec<(usize, usize)>,
    },
    Damage {
        side: usize,
        slot: usize,
        new_hp: i32,
        max_hp: i32,
        cause: Cause,
    },
    Heal {
        side: usize,
        slot: usize,
        new_hp: i32,
        max_hp: i32,
        cause: Cause,
    },
    Status {
        side: usize,
        slot: usize,
        status: StatusKind,
    },
    Cure {
        side: usize,
        slot: usize,
        status: StatusKind,
    },
    Boost {
        side: usize,
        slot: usize,
        axis: BoostAxis,
        delta: i32,
        stage: i32,
    },
    Faint {
        side: usize,
        slot: usize,
    },
    SideStart {
        side: usize,
        condition: SideCondition,
        value: i32,
    },
    SideEnd {
        side: usize,
        condition: SideCondition,
    },
    FieldStart {
        kind: String,
        turns: i32,
    },
    FieldEnd {
        kind: String,
    },
    AbilityActivate {
        side: usize,
        slot: usize,
        ability: u16,
    },
    ItemEnd {
        side: usize,
        slot: usize,
        item: u16,
    },
    Immune {
        side: usize,
        slot: usize,
        cause: Cause,
    },
    Miss {
        side: usize,
        slot: usize,
    },
    Fail {
        side: usize,
        slot: usize,
        move_id: u16,
    },
    Crit {
        side: usize,
        slot: usize,
    },
    /// Type effectiveness in quarters (4 = neutral), logged for non-neutral hits.
    Effectiveness {
        side: usize,
        slot: usize,
        quarters: u32,
    },
    Terastallize {
        side: usize,
        slot: usize,
        tera_type: u8,
    },
    Ended {
        winner: Option<usize>,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleLog {
    records: Vec<LogRecord>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: LogRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&LogRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records appended since a previously observed length; callers use this
    /// to stream one turn's worth of output.
    pub fn since(&self, mark: usize) -> &[LogRecord] {
        &self.records[mark.min(self.records.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_returns_new_records() {
        let mut log = BattleLog::new();
        log.push(LogRecord::TurnStart { turn: 1 });
        let mark = log.len();
        log.push(LogRecord::Miss { side: 0, slot: 0 });
        assert_eq!(log.since(mark), &[LogRecord::Miss { side: 0, slot: 0 }]);
        assert_eq!(log.since(99), &[] as &[LogRecord]);
    }

    #[test]
    fn records_serialize_round_trip() {
        let mut log = BattleLog::new();
        log.push(LogRecord::Boost {
            side: 1,
            slot: 0,
            axis: BoostAxis::Atk,
            delta: -1,
            stage: -1,
        });
        let json = serde_json::to_string(&log).unwrap();
        let back: BattleLog = serde_json::from_str(&json).unwrap();
        assert_eq!(log, back);
    }
}
