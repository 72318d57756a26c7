//! Elemental types and the 18x18 effectiveness chart.
//!
//! Effectiveness is stored in quarters so the whole pipeline stays in integer
//! arithmetic: 0 = immune, 1 = 0.25x, 2 = 0.5x, 4 = 1x, 8 = 2x, 16 = 4x.

use serde::{Deserialize, Serialize};

pub const NUM_TYPES: usize = 18;

/// Sentinel for "no secondary type" / "no Tera type" lanes in packed state.
pub const TYPE_NONE: i32 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Type {
    Normal = 0,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl Type {
    pub fn from_id(id: i32) -> Option<Type> {
        if (0..NUM_TYPES as i32).contains(&id) {
            Some(ALL_TYPES[id as usize])
        } else {
            None
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        TYPE_NAMES[self as usize]
    }

    pub fn from_name(name: &str) -> Option<Type> {
        let idx = TYPE_NAMES
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))?;
        Some(ALL_TYPES[idx])
    }
}

pub const ALL_TYPES: [Type; NUM_TYPES] = [
    Type::Normal,
    Type::Fire,
    Type::Water,
    Type::Electric,
    Type::Grass,
    Type::Ice,
    Type::Fighting,
    Type::Poison,
    Type::Ground,
    Type::Flying,
    Type::Psychic,
    Type::Bug,
    Type::Rock,
    Type::Ghost,
    Type::Dragon,
    Type::Dark,
    Type::Steel,
    Type::Fairy,
];

const TYPE_NAMES: [&str; NUM_TYPES] = [
    "Normal", "Fire", "Water", "Electric", "Grass", "Ice", "Fighting", "Poison", "Ground",
    "Flying", "Psychic", "Bug", "Rock", "Ghost", "Dragon", "Dark", "Steel", "Fairy",
];

// Rows: attacking type. Columns: defending type, in enum order.
#[rustfmt::skip]
const CHART: [[u8; NUM_TYPES]; NUM_TYPES] = [
    // vs:  Nor Fir Wat Ele Gra Ice Fig Poi Gro Fly Psy Bug Roc Gho Dra Dar Ste Fai
    /*Nor*/ [4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  2,  0,  4,  4,  2,  4],
    /*Fir*/ [4,  2,  2,  4,  8,  8,  4,  4,  4,  4,  4,  8,  2,  4,  2,  4,  8,  4],
    /*Wat*/ [4,  8,  2,  4,  2,  4,  4,  4,  8,  4,  4,  4,  8,  4,  2,  4,  4,  4],
    /*Ele*/ [4,  4,  8,  2,  2,  4,  4,  4,  0,  8,  4,  4,  4,  4,  2,  4,  4,  4],
    /*Gra*/ [4,  2,  8,  4,  2,  4,  4,  2,  8,  2,  4,  2,  8,  4,  2,  4,  2,  4],
    /*Ice*/ [4,  2,  2,  4,  8,  2,  4,  4,  8,  8,  4,  4,  4,  4,  8,  4,  2,  4],
    /*Fig*/ [8,  4,  4,  4,  4,  8,  4,  2,  4,  2,  2,  2,  8,  0,  4,  8,  8,  2],
    /*Poi*/ [4,  4,  4,  4,  8,  4,  4,  2,  2,  4,  4,  4,  2,  2,  4,  4,  0,  8],
    /*Gro*/ [4,  8,  4,  8,  2,  4,  4,  8,  4,  0,  4,  2,  8,  4,  4,  4,  8,  4],
    /*Fly*/ [4,  4,  4,  2,  8,  4,  8,  4,  4,  4,  4,  8,  2,  4,  4,  4,  2,  4],
    /*Psy*/ [4,  4,  4,  4,  4,  4,  8,  8,  4,  4,  2,  4,  4,  4,  4,  0,  2,  4],
    /*Bug*/ [4,  2,  4,  4,  8,  4,  2,  2,  4,  2,  8,  4,  4,  2,  4,  8,  2,  2],
    /*Roc*/ [4,  8,  4,  4,  4,  8,  2,  4,  2,  8,  4,  8,  4,  4,  4,  4,  2,  4],
    /*Gho*/ [0,  4,  4,  4,  4,  4,  4,  4,  4,  4,  8,  4,  4,  8,  4,  2,  4,  4],
    /*Dra*/ [4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  4,  8,  4,  2,  0],
    /*Dar*/ [4,  4,  4,  4,  4,  4,  2,  4,  4,  4,  8,  4,  4,  8,  4,  2,  4,  2],
    /*Ste*/ [4,  2,  2,  2,  4,  8,  4,  4,  4,  4,  4,  4,  8,  4,  4,  4,  2,  8],
    /*Fai*/ [4,  2,  4,  4,  4,  4,  8,  2,  4,  4,  4,  4,  4,  4,  8,  8,  2,  4],
];

/// Effectiveness of one attacking type against one defending type, in
/// quarters (4 = neutral).
pub fn effectiveness(attack: Type, defend: Type) -> u8 {
    CHART[attack as usize][defend as usize]
}

/// Effectiveness against a defender described by packed type lanes, in
/// quarters. A terastallized defender is judged purely on its Tera type.
pub fn effectiveness_packed(attack: Type, type1: i32, type2: i32, tera: i32) -> u32 {
    if tera != TYPE_NONE {
        if let Some(t) = Type::from_id(tera) {
            return effectiveness(attack, t) as u32;
        }
    }
    let mut quarters = match Type::from_id(type1) {
        Some(t) => effectiveness(attack, t) as u32,
        None => 4,
    };
    if type2 != TYPE_NONE && type2 != type1 {
        if let Some(t) = Type::from_id(type2) {
            quarters = quarters * effectiveness(attack, t) as u32 / 4;
        }
    }
    quarters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_spot_checks() {
        assert_eq!(effectiveness(Type::Ice, Type::Dragon), 8);
        assert_eq!(effectiveness(Type::Electric, Type::Ground), 0);
        assert_eq!(effectiveness(Type::Ghost, Type::Normal), 0);
        assert_eq!(effectiveness(Type::Fairy, Type::Dragon), 8);
        assert_eq!(effectiveness(Type::Dragon, Type::Fairy), 0);
        assert_eq!(effectiveness(Type::Fire, Type::Water), 2);
    }

    #[test]
    fn dual_types_multiply() {
        // Ice vs Dragon/Flying is 4x.
        let q = effectiveness_packed(
            Type::Ice,
            Type::Dragon.id() as i32,
            Type::Flying.id() as i32,
            TYPE_NONE,
        );
        assert_eq!(q, 16);
        // Rock vs Fire/Flying is 4x.
        let q = effectiveness_packed(
            Type::Rock,
            Type::Fire.id() as i32,
            Type::Flying.id() as i32,
            TYPE_NONE,
        );
        assert_eq!(q, 16);
    }

    #[test]
    fn tera_replaces_defending_types() {
        // A Dragon/Flying defender terastallized to Steel takes 0.5x from Ice.
        let q = effectiveness_packed(
            Type::Ice,
            Type::Dragon.id() as i32,
            Type::Flying.id() as i32,
            Type::Steel.id() as i32,
        );
        assert_eq!(q, 2);
    }

    #[test]
    fn every_row_is_complete() {
        for row in CHART.iter() {
            for &q in row.iter() {
                assert!(q == 0 || q == 2 || q == 4 || q == 8);
            }
        }
    }

    #[test]
    fn name_round_trip() {
        for t in ALL_TYPES {
            assert_eq!(Type::from_name(t.name()), Some(t));
        }
        assert_eq!(Type::from_name("steel"), Some(Type::Steel));
        assert_eq!(Type::from_name("???"), None);
    }
}
