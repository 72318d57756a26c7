//! Static move records.
//!
//! Moves that deviate from the plain damage formula do so through declarative
//! computation records (`PowerRule`, `FixedDamage`, `HitCount`, ...) that the
//! pipeline interprets. A move record never carries code.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::data::types::Type;
use crate::sim::layout::{FieldKind, SideCondition, StatusKind, Terrain};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Status,
    Physical,
    Special,
}

/// Targeting mode stored on the move itself. The per-action target
/// descriptor is validated against this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveTarget {
    /// One adjacent foe, chosen by the action.
    Normal,
    /// The user.
    User,
    /// Every adjacent foe (spread).
    AllAdjacentFoes,
    /// Every other active Pokemon, allies included (spread).
    AllOthers,
    /// The user's side of the field.
    UserSide,
    /// The opposing side of the field.
    FoeSide,
    /// The whole field.
    All,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MoveFlags: u32 {
        const CONTACT     = 1 << 0;
        const PROTECT     = 1 << 1;
        const MIRROR      = 1 << 2;
        const SOUND       = 1 << 3;
        const BULLET      = 1 << 4;
        const BITE        = 1 << 5;
        const PUNCH       = 1 << 6;
        const POWDER      = 1 << 7;
        const HEAL        = 1 << 8;
        const DEFROST     = 1 << 9;
        const BYPASS_SUB  = 1 << 10;
        const REFLECTABLE = 1 << 11;
        const SLICING     = 1 << 12;
        const WIND        = 1 << 13;
    }
}

/// Seven-axis boost table in `BoostAxis` order (atk..eva).
pub type BoostTable = [i8; 7];

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEffect {
    /// Percent chance in `[1, 100]`.
    pub chance: u8,
    pub status: Option<StatusKind>,
    pub flinch: bool,
    pub confusion: bool,
    /// Stat changes applied to the target.
    pub boosts: Option<BoostTable>,
}

impl SecondaryEffect {
    pub fn status(chance: u8, status: StatusKind) -> Self {
        Self {
            chance,
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn flinch(chance: u8) -> Self {
        Self {
            chance,
            flinch: true,
            ..Self::default()
        }
    }

    pub fn boost(chance: u8, boosts: BoostTable) -> Self {
        Self {
            chance,
            boosts: Some(boosts),
            ..Self::default()
        }
    }
}

/// Variable base-power rules interpreted by the damage pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerRule {
    /// `max_power * current_hp / max_hp` (Eruption, Water Spout).
    HpScaled { max_power: u16 },
    /// Reversal/Flail threshold table over `hp * 48 / max_hp`.
    LowHpThresholds,
    /// `25 * target_speed / user_speed + 1`, capped at 150 (Gyro Ball).
    InverseSpeedRatio,
    /// Bracketed `user_speed / target_speed` (Electro Ball).
    SpeedRatio,
    /// Bracketed target weight in hectograms (Grass Knot, Low Kick).
    TargetWeight,
    /// `base + per * fainted_allies` (Last Respects).
    FallenAllies { base: u16, per: u16 },
}

/// Damage that bypasses the formula entirely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedDamage {
    /// Damage equal to the user's level (Seismic Toss, Night Shade).
    Level,
    /// Half the target's current HP (Super Fang).
    HalfTargetHp,
    Flat(u16),
    /// Target HP minus user HP, failing when not positive (Endeavor).
    Endeavor,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitCount {
    Fixed(u8),
    /// Standard 2-5 distribution: 35/35/15/15.
    Range(u8, u8),
}

/// Volatile condition a status move inflicts on its target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppliedEffect {
    Taunt,
    Encore,
    Disable,
    LeechSeed,
    Substitute,
    Confuse,
    Trap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldEffectRule {
    pub kind: FieldKind,
    pub turns: u8,
}

/// Selection/usage pre-checks evaluated at execution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreCheck {
    /// Fails unless the target has a damaging move queued and has not moved
    /// yet this turn (Sucker Punch).
    TargetAttackQueued,
    /// Fails unless this is the user's first active turn (Fake Out).
    FirstTurnOut,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub move_type: Type,
    pub category: MoveCategory,
    pub base_power: u16,
    /// `None` means the move cannot miss.
    pub accuracy: Option<u8>,
    pub pp: u8,
    pub priority: i8,
    pub target: MoveTarget,
    pub flags: MoveFlags,
    /// 1 = normal crit stage, 2 = high-crit moves.
    pub crit_ratio: u8,
    /// Fraction of dealt damage taken as recoil.
    pub recoil: Option<(u8, u8)>,
    /// Fraction of dealt damage healed.
    pub drain: Option<(u8, u8)>,
    /// Fraction of max HP restored by a self-heal status move.
    pub heal: Option<(u8, u8)>,
    /// Primary status inflicted by a status move (Thunder Wave).
    pub status: Option<StatusKind>,
    /// Stat changes a status move applies to its target.
    pub boosts: Option<BoostTable>,
    /// Stat changes applied to the user after a successful hit
    /// (Close Combat's drops, Meteor Mash style raises roll as secondaries).
    pub self_boosts: Option<BoostTable>,
    pub secondaries: Vec<SecondaryEffect>,
    pub power_rule: Option<PowerRule>,
    pub fixed_damage: Option<FixedDamage>,
    pub hit_count: Option<HitCount>,
    /// U-turn class: switch out after a successful hit.
    pub self_switch: bool,
    pub ohko: bool,
    /// Protect/Detect.
    pub protect_self: bool,
    pub applies: Option<AppliedEffect>,
    pub side_condition: Option<SideCondition>,
    pub field_effect: Option<FieldEffectRule>,
    pub pre_check: Option<PreCheck>,
    /// Priority bonus while a terrain is up (Grassy Glide).
    pub terrain_priority: Option<(Terrain, i8)>,
}

impl MoveData {
    /// A plain record with everything optional switched off; sample data and
    /// loaders fill in the deviations with struct update syntax.
    pub fn base(
        name: &str,
        move_type: Type,
        category: MoveCategory,
        base_power: u16,
        accuracy: Option<u8>,
        pp: u8,
    ) -> Self {
        let flags = match category {
            MoveCategory::Physical => MoveFlags::CONTACT | MoveFlags::PROTECT | MoveFlags::MIRROR,
            MoveCategory::Special => MoveFlags::PROTECT | MoveFlags::MIRROR,
            MoveCategory::Status => MoveFlags::PROTECT | MoveFlags::REFLECTABLE,
        };
        Self {
            name: name.to_string(),
            move_type,
            category,
            base_power,
            accuracy,
            pp,
            priority: 0,
            target: MoveTarget::Normal,
            flags,
            crit_ratio: 1,
            recoil: None,
            drain: None,
            heal: None,
            status: None,
            boosts: None,
            self_boosts: None,
            secondaries: Vec::new(),
            power_rule: None,
            fixed_damage: None,
            hit_count: None,
            self_switch: false,
            ohko: false,
            protect_self: false,
            applies: None,
            side_condition: None,
            field_effect: None,
            pre_check: None,
            terrain_priority: None,
        }
    }

    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }

    pub fn is_spread(&self) -> bool {
        matches!(
            self.target,
            MoveTarget::AllAdjacentFoes | MoveTarget::AllOthers
        )
    }

    /// Side- or field-targeting moves skip the per-target pipeline.
    pub fn targets_field(&self) -> bool {
        matches!(
            self.target,
            MoveTarget::UserSide | MoveTarget::FoeSide | MoveTarget::All
        ) && (self.side_condition.is_some() || self.field_effect.is_some())
    }
}

/// Struggle is built in rather than registry data: it is selectable exactly
/// when nothing else is, typeless in effect (no STAB, neutral everywhere),
/// and costs the user a quarter of max HP.
pub fn struggle() -> MoveData {
    MoveData {
        flags: MoveFlags::CONTACT | MoveFlags::PROTECT,
        ..MoveData::base(
            "Struggle",
            Type::Normal,
            MoveCategory::Physical,
            50,
            None,
            1,
        )
    }
}

/// Move-slot index the scheduler reserves for Struggle.
pub const STRUGGLE_SLOT: usize = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_flags_follow_category() {
        let m = MoveData::base("Tackle", Type::Normal, MoveCategory::Physical, 40, Some(100), 35);
        assert!(m.flags.contains(MoveFlags::CONTACT));
        let m = MoveData::base("Swift", Type::Normal, MoveCategory::Special, 60, None, 20);
        assert!(!m.flags.contains(MoveFlags::CONTACT));
        assert!(m.flags.contains(MoveFlags::PROTECT));
    }

    #[test]
    fn struggle_always_hits() {
        let s = struggle();
        assert_eq!(s.accuracy, None);
        assert_eq!(s.base_power, 50);
    }

    #[test]
    fn spread_targets() {
        let mut m = MoveData::base("Rock Slide", Type::Rock, MoveCategory::Physical, 75, Some(90), 10);
        m.target = MoveTarget::AllAdjacentFoes;
        assert!(m.is_spread());
        assert!(!m.targets_field());
    }
}
