//! Natures and their stat modifiers.
//!
//! Nature modifiers are expressed as integer tenths (11/10, 10/10, 9/10) so
//! stat computation never touches floating point.

use serde::{Deserialize, Serialize};

use crate::sim::stats::StatAxis;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Nature {
    Hardy = 0,
    Lonely,
    Brave,
    Adamant,
    Naughty,
    Bold,
    Docile,
    Relaxed,
    Impish,
    Lax,
    Timid,
    Hasty,
    Serious,
    Jolly,
    Naive,
    Modest,
    Mild,
    Quiet,
    Bashful,
    Rash,
    Calm,
    Gentle,
    Sassy,
    Careful,
    Quirky,
}

pub const ALL_NATURES: [Nature; 25] = [
    Nature::Hardy,
    Nature::Lonely,
    Nature::Brave,
    Nature::Adamant,
    Nature::Naughty,
    Nature::Bold,
    Nature::Docile,
    Nature::Relaxed,
    Nature::Impish,
    Nature::Lax,
    Nature::Timid,
    Nature::Hasty,
    Nature::Serious,
    Nature::Jolly,
    Nature::Naive,
    Nature::Modest,
    Nature::Mild,
    Nature::Quiet,
    Nature::Bashful,
    Nature::Rash,
    Nature::Calm,
    Nature::Gentle,
    Nature::Sassy,
    Nature::Careful,
    Nature::Quirky,
];

impl Nature {
    pub fn from_id(id: i32) -> Option<Nature> {
        ALL_NATURES.get(usize::try_from(id).ok()?).copied()
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// (boosted, lowered) stat pair, or None for the five neutral natures.
    fn spread(self) -> Option<(StatAxis, StatAxis)> {
        use StatAxis::*;
        match self {
            Nature::Hardy
            | Nature::Docile
            | Nature::Serious
            | Nature::Bashful
            | Nature::Quirky => None,
            Nature::Lonely => Some((Atk, Def)),
            Nature::Brave => Some((Atk, Spe)),
            Nature::Adamant => Some((Atk, Spa)),
            Nature::Naughty => Some((Atk, Spd)),
            Nature::Bold => Some((Def, Atk)),
            Nature::Relaxed => Some((Def, Spe)),
            Nature::Impish => Some((Def, Spa)),
            Nature::Lax => Some((Def, Spd)),
            Nature::Timid => Some((Spe, Atk)),
            Nature::Hasty => Some((Spe, Def)),
            Nature::Jolly => Some((Spe, Spa)),
            Nature::Naive => Some((Spe, Spd)),
            Nature::Modest => Some((Spa, Atk)),
            Nature::Mild => Some((Spa, Def)),
            Nature::Quiet => Some((Spa, Spe)),
            Nature::Rash => Some((Spa, Spd)),
            Nature::Calm => Some((Spd, Atk)),
            Nature::Gentle => Some((Spd, Def)),
            Nature::Sassy => Some((Spd, Spe)),
            Nature::Careful => Some((Spd, Spa)),
        }
    }

    /// Modifier for a stat in tenths: 11, 10 or 9.
    pub fn modifier_tenths(self, stat: StatAxis) -> u32 {
        match self.spread() {
            Some((up, _)) if up == stat => 11,
            Some((_, down)) if down == stat => 9,
            _ => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stats::StatAxis;

    #[test]
    fn adamant_boosts_atk_lowers_spa() {
        assert_eq!(Nature::Adamant.modifier_tenths(StatAxis::Atk), 11);
        assert_eq!(Nature::Adamant.modifier_tenths(StatAxis::Spa), 9);
        assert_eq!(Nature::Adamant.modifier_tenths(StatAxis::Def), 10);
    }

    #[test]
    fn neutral_natures_touch_nothing() {
        for stat in [StatAxis::Atk, StatAxis::Def, StatAxis::Spa, StatAxis::Spd, StatAxis::Spe] {
            assert_eq!(Nature::Hardy.modifier_tenths(stat), 10);
        }
    }

    #[test]
    fn ids_round_trip() {
        for (i, n) in ALL_NATURES.iter().enumerate() {
            assert_eq!(Nature::from_id(i as i32), Some(*n));
        }
        assert_eq!(Nature::from_id(25), None);
    }
}
