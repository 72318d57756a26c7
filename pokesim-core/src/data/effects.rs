//! Effect identifiers.
//!
//! Every ability or item behavior the dispatcher can run is one of these
//! tags. The static registry binds records to an `EffectId`; the handler
//! table in `sim::handlers` maps each tag to hook registrations and code.
//! Adding a behavior means adding a variant and a match arm, never a
//! closure on the data record.

use serde::{Deserialize, Serialize};

use crate::sim::layout::{FieldKind, SideCondition};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectId {
    // Abilities.
    Intimidate,
    Download,
    Drizzle,
    Drought,
    SandStream,
    SnowWarning,
    GoodAsGold,
    FlashFire,
    VoltAbsorb,
    WaterAbsorb,
    Levitate,
    LiquidVoice,
    Prankster,
    Technician,
    SupremeOverlord,
    Adaptability,
    Guts,
    RoughSkin,
    Static,
    SteamEngine,
    SheerForce,
    Aftermath,
    SkillLink,
    Infiltrator,
    NeutralizingGas,
    Chlorophyll,
    SwiftSwim,

    // Items.
    Leftovers,
    LifeOrb,
    ChoiceBand,
    ChoiceSpecs,
    ChoiceScarf,
    TypeBoostItem,
    CovertCloak,
    HeavyDutyBoots,
    AirBalloon,
    IronBall,
    LoadedDice,

    // Conditions. Screens, hazards, weather, terrain and rooms register
    // their handlers when the condition starts and drop them when it ends;
    // the volatile below is registered when Leech Seed lands.
    SideCondition(SideCondition),
    FieldCondition(FieldKind),
    LeechSeeded,
}
