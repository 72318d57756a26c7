//! Packed battle-state layout.
//!
//! Single source of truth for every lane index in the dense per-Pokemon row,
//! the side-condition columns and the field array. No other module may read
//! Pokemon data except through these indices (via the `state` accessors).

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// --- Per-Pokemon row lanes -------------------------------------------------

// Identity.
pub const P_SPECIES: usize = 0;
pub const P_LEVEL: usize = 1;
pub const P_NATURE: usize = 2;
pub const P_ABILITY: usize = 3;
pub const P_ITEM: usize = 4; // -1 = none
pub const P_TYPE1: usize = 5;
pub const P_TYPE2: usize = 6; // -1 = single-typed
pub const P_TERA_TYPE: usize = 7; // -1 = no Tera type chosen

// Final computed stats.
pub const P_STAT_HP: usize = 8;
pub const P_STAT_ATK: usize = 9;
pub const P_STAT_DEF: usize = 10;
pub const P_STAT_SPA: usize = 11;
pub const P_STAT_SPD: usize = 12;
pub const P_STAT_SPE: usize = 13;

// Battle state.
pub const P_CURRENT_HP: usize = 14;
pub const P_STATUS: usize = 15;
pub const P_STATUS_COUNTER: usize = 16; // sleep turns left / toxic stage

// Stat stages, -6..=6.
pub const P_STAGE_ATK: usize = 17;
pub const P_STAGE_DEF: usize = 18;
pub const P_STAGE_SPA: usize = 19;
pub const P_STAGE_SPD: usize = 20;
pub const P_STAGE_SPE: usize = 21;
pub const P_STAGE_ACC: usize = 22;
pub const P_STAGE_EVA: usize = 23;

// Move slots, -1 = empty.
pub const P_MOVE1: usize = 24;
pub const P_MOVE2: usize = 25;
pub const P_MOVE3: usize = 26;
pub const P_MOVE4: usize = 27;

// Volatiles: one bit-mask lane plus counter lanes.
pub const P_VOLATILES: usize = 28;
pub const P_CONFUSION_TURNS: usize = 29;
pub const P_ENCORE_TURNS: usize = 30;
pub const P_ENCORE_SLOT: usize = 31; // move slot locked by encore, -1
pub const P_TAUNT_TURNS: usize = 32;
pub const P_DISABLE_SLOT: usize = 33; // -1 = nothing disabled
pub const P_DISABLE_TURNS: usize = 34;
pub const P_SUB_HP: usize = 35;
pub const P_CHOICE_SLOT: usize = 36; // move slot a choice item locked, -1
pub const P_LAST_MOVE: usize = 37; // move id, -1 before first move
pub const P_ENTERED_TURN: usize = 38; // turn counter value when it switched in
pub const P_PROTECT_STREAK: usize = 39; // consecutive successful protects
pub const P_TERASTALLIZED: usize = 40; // 0/1
pub const P_ABILITY_SUPPRESSED: usize = 41; // 0/1, does not alter P_ABILITY
pub const P_FLASH_FIRE: usize = 42; // 0/1 absorbed-a-fire-move boost
pub const P_FALLEN_AT_ENTRY: usize = 43; // side faint count at switch-in

pub const POKEMON_LANES: usize = 44;

pub const MOVE_SLOTS: usize = 4;

/// Stage lanes in `BoostAxis` order.
pub const STAGE_LANES: [usize; 7] = [
    P_STAGE_ATK,
    P_STAGE_DEF,
    P_STAGE_SPA,
    P_STAGE_SPD,
    P_STAGE_SPE,
    P_STAGE_ACC,
    P_STAGE_EVA,
];

/// Stat lanes in `StatAxis` order.
pub const STAT_LANES: [usize; 6] = [
    P_STAT_HP,
    P_STAT_ATK,
    P_STAT_DEF,
    P_STAT_SPA,
    P_STAT_SPD,
    P_STAT_SPE,
];

pub const MOVE_LANES: [usize; MOVE_SLOTS] = [P_MOVE1, P_MOVE2, P_MOVE3, P_MOVE4];

bitflags! {
    /// Single-bit volatiles packed into `P_VOLATILES`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Volatiles: u32 {
        const FLINCH     = 1 << 0;
        const PROTECT    = 1 << 1;
        const LEECH_SEED = 1 << 2;
        const SUBSTITUTE = 1 << 3;
        const TRAPPED    = 1 << 4;
        const CONFUSION  = 1 << 5;
    }
}

/// Volatiles cleared when the holder leaves the field.
pub const SWITCH_CLEARED_VOLATILES: Volatiles = Volatiles::all();

/// Volatiles cleared at end of turn (single-turn effects).
pub const TURN_CLEARED_VOLATILES: Volatiles = Volatiles::FLINCH.union(Volatiles::PROTECT);

// --- Primary status --------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StatusKind {
    None = 0,
    Burn,
    Freeze,
    Paralysis,
    Poison,
    Toxic,
    Sleep,
    Fainted,
}

impl StatusKind {
    pub fn from_id(id: i32) -> StatusKind {
        match id {
            1 => StatusKind::Burn,
            2 => StatusKind::Freeze,
            3 => StatusKind::Paralysis,
            4 => StatusKind::Poison,
            5 => StatusKind::Toxic,
            6 => StatusKind::Sleep,
            7 => StatusKind::Fainted,
            _ => StatusKind::None,
        }
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            StatusKind::None => "none",
            StatusKind::Burn => "brn",
            StatusKind::Freeze => "frz",
            StatusKind::Paralysis => "par",
            StatusKind::Poison => "psn",
            StatusKind::Toxic => "tox",
            StatusKind::Sleep => "slp",
            StatusKind::Fainted => "fnt",
        }
    }
}

// --- Side conditions -------------------------------------------------------

/// Columns of the per-side condition table. Screen/tailwind-class columns
/// hold remaining turns; hazard columns hold layer counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum SideCondition {
    Reflect = 0,
    LightScreen,
    AuroraVeil,
    Safeguard,
    Mist,
    Tailwind,
    Spikes,
    ToxicSpikes,
    StealthRock,
    StickyWeb,
}

pub const SIDE_CONDITION_COLUMNS: usize = 10;

pub const ALL_SIDE_CONDITIONS: [SideCondition; SIDE_CONDITION_COLUMNS] = [
    SideCondition::Reflect,
    SideCondition::LightScreen,
    SideCondition::AuroraVeil,
    SideCondition::Safeguard,
    SideCondition::Mist,
    SideCondition::Tailwind,
    SideCondition::Spikes,
    SideCondition::ToxicSpikes,
    SideCondition::StealthRock,
    SideCondition::StickyWeb,
];

impl SideCondition {
    pub fn column(self) -> usize {
        self as usize
    }

    pub fn is_hazard(self) -> bool {
        matches!(
            self,
            SideCondition::Spikes
                | SideCondition::ToxicSpikes
                | SideCondition::StealthRock
                | SideCondition::StickyWeb
        )
    }

    /// Maximum layer count for hazards, or the turn count a fresh
    /// application starts at for timed conditions.
    pub fn cap_or_duration(self) -> i32 {
        match self {
            SideCondition::Spikes => 3,
            SideCondition::ToxicSpikes => 2,
            SideCondition::StealthRock | SideCondition::StickyWeb => 1,
            SideCondition::Reflect | SideCondition::LightScreen | SideCondition::AuroraVeil => 5,
            SideCondition::Safeguard | SideCondition::Mist => 5,
            SideCondition::Tailwind => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SideCondition::Reflect => "reflect",
            SideCondition::LightScreen => "lightscreen",
            SideCondition::AuroraVeil => "auroraveil",
            SideCondition::Safeguard => "safeguard",
            SideCondition::Mist => "mist",
            SideCondition::Tailwind => "tailwind",
            SideCondition::Spikes => "spikes",
            SideCondition::ToxicSpikes => "toxicspikes",
            SideCondition::StealthRock => "stealthrock",
            SideCondition::StickyWeb => "stickyweb",
        }
    }
}

// --- Field -----------------------------------------------------------------

pub const F_WEATHER: usize = 0;
pub const F_WEATHER_TURNS: usize = 1;
pub const F_TERRAIN: usize = 2;
pub const F_TERRAIN_TURNS: usize = 3;
pub const F_TRICK_ROOM: usize = 4;
pub const F_MAGIC_ROOM: usize = 5;
pub const F_WONDER_ROOM: usize = 6;

pub const FIELD_LANES: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Weather {
    None = 0,
    Sun,
    Rain,
    Sand,
    Snow,
}

impl Weather {
    pub fn from_id(id: i32) -> Weather {
        match id {
            1 => Weather::Sun,
            2 => Weather::Rain,
            3 => Weather::Sand,
            4 => Weather::Snow,
            _ => Weather::None,
        }
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Weather::None => "none",
            Weather::Sun => "sun",
            Weather::Rain => "rain",
            Weather::Sand => "sand",
            Weather::Snow => "snow",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Terrain {
    None = 0,
    Electric,
    Grassy,
    Misty,
    Psychic,
}

impl Terrain {
    pub fn from_id(id: i32) -> Terrain {
        match id {
            1 => Terrain::Electric,
            2 => Terrain::Grassy,
            3 => Terrain::Misty,
            4 => Terrain::Psychic,
            _ => Terrain::None,
        }
    }

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            Terrain::None => "none",
            Terrain::Electric => "electric",
            Terrain::Grassy => "grassy",
            Terrain::Misty => "misty",
            Terrain::Psychic => "psychic",
        }
    }
}

/// Field-wide effects a move can install.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Weather(Weather),
    Terrain(Terrain),
    TrickRoom,
    MagicRoom,
    WonderRoom,
}

impl FieldKind {
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Weather(w) => w.name(),
            FieldKind::Terrain(t) => t.name(),
            FieldKind::TrickRoom => "trickroom",
            FieldKind::MagicRoom => "magicroom",
            FieldKind::WonderRoom => "wonderroom",
        }
    }
}
