//! Built-in sample registry.
//!
//! A compact dex covering the mechanics the engine models, used by the test
//! suites and the demo binaries. Production data comes from the external
//! compile step; this table exists so the crate is exercisable on its own.

use once_cell::sync::Lazy;

use crate::data::abilities::AbilityData;
use crate::data::effects::EffectId;
use crate::data::items::{ItemCategory, ItemData};
use crate::data::moves::{
    AppliedEffect, FieldEffectRule, FixedDamage, HitCount, MoveCategory, MoveData, MoveFlags,
    MoveTarget, PowerRule, PreCheck, SecondaryEffect,
};
use crate::data::species::SpeciesData;
use crate::data::types::Type;
use crate::data::Dex;
use crate::sim::layout::{FieldKind, SideCondition, StatusKind, Terrain, Weather};

pub static SAMPLE_DEX: Lazy<Dex> = Lazy::new(|| build_sample_dex().expect("sample dex is valid"));

pub fn build_sample_dex() -> Result<Dex, crate::error::DexError> {
    Dex::from_tables(sample_species(), sample_moves(), sample_abilities(), sample_items())
}

fn sample_species() -> Vec<SpeciesData> {
    vec![
        SpeciesData::new("Garchomp", [108, 130, 95, 80, 85, 102], Type::Dragon, Some(Type::Ground), 950, 19),
        SpeciesData::new("Charizard", [78, 84, 78, 109, 85, 100], Type::Fire, Some(Type::Flying), 905, 17),
        SpeciesData::new("Pikachu", [35, 55, 40, 50, 50, 90], Type::Electric, None, 60, 4),
        SpeciesData::new("Gyarados", [95, 125, 79, 60, 100, 81], Type::Water, Some(Type::Flying), 2350, 65),
        SpeciesData::new("Kingambit", [100, 135, 120, 60, 85, 50], Type::Dark, Some(Type::Steel), 1200, 20),
        SpeciesData::new("Pelipper", [60, 50, 100, 95, 70, 65], Type::Water, Some(Type::Flying), 280, 12),
        SpeciesData::new("Rillaboom", [100, 125, 90, 60, 70, 85], Type::Grass, None, 900, 21),
        SpeciesData::new("Dragonite", [91, 134, 95, 100, 100, 80], Type::Dragon, Some(Type::Flying), 2100, 22),
        SpeciesData::new("Heatran", [91, 90, 106, 130, 106, 77], Type::Fire, Some(Type::Steel), 4300, 17),
        SpeciesData::new("Machamp", [90, 130, 80, 65, 85, 55], Type::Fighting, None, 1300, 16),
        SpeciesData::new("Gholdengo", [87, 60, 95, 133, 91, 84], Type::Steel, Some(Type::Ghost), 300, 12),
        SpeciesData::new("Jolteon", [65, 65, 60, 110, 95, 130], Type::Electric, None, 245, 8),
        SpeciesData::new("Vaporeon", [130, 65, 60, 110, 95, 65], Type::Water, None, 290, 10),
        SpeciesData::new("Whimsicott", [60, 67, 85, 77, 75, 116], Type::Grass, Some(Type::Fairy), 66, 7),
        SpeciesData::new("Scizor", [70, 130, 100, 55, 80, 65], Type::Bug, Some(Type::Steel), 1180, 18),
        SpeciesData::new("Dusclops", [40, 70, 130, 60, 130, 25], Type::Ghost, None, 306, 16),
        SpeciesData::new("Gengar", [60, 65, 60, 130, 75, 110], Type::Ghost, Some(Type::Poison), 405, 15),
        SpeciesData::new("Primarina", [80, 74, 74, 126, 116, 60], Type::Water, Some(Type::Fairy), 440, 18),
        SpeciesData::new("Porygon-Z", [85, 80, 70, 135, 75, 90], Type::Normal, None, 340, 9),
        SpeciesData::new("Snorlax", [160, 110, 65, 65, 110, 30], Type::Normal, None, 4600, 21),
        SpeciesData::new("Weavile", [70, 120, 65, 45, 85, 125], Type::Dark, Some(Type::Ice), 340, 11),
        SpeciesData::new("Ferrothorn", [74, 94, 131, 54, 116, 20], Type::Grass, Some(Type::Steel), 1100, 10),
    ]
}

fn sample_abilities() -> Vec<AbilityData> {
    vec![
        AbilityData::new("Blaze", 2.0, None),
        AbilityData::new("Overgrow", 2.0, None),
        AbilityData::new("Torrent", 2.0, None),
        AbilityData::new("Pressure", 2.5, None),
        AbilityData::new("Inner Focus", 1.0, None),
        AbilityData::new("Intimidate", 3.5, Some(EffectId::Intimidate)),
        AbilityData::new("Download", 3.5, Some(EffectId::Download)),
        AbilityData::new("Drizzle", 4.0, Some(EffectId::Drizzle)),
        AbilityData::new("Drought", 4.0, Some(EffectId::Drought)),
        AbilityData::new("Sand Stream", 4.0, Some(EffectId::SandStream)),
        AbilityData::new("Snow Warning", 3.5, Some(EffectId::SnowWarning)),
        AbilityData::new("Good as Gold", 5.0, Some(EffectId::GoodAsGold)),
        AbilityData::new("Flash Fire", 3.5, Some(EffectId::FlashFire)),
        AbilityData::new("Volt Absorb", 3.5, Some(EffectId::VoltAbsorb)),
        AbilityData::new("Water Absorb", 3.5, Some(EffectId::WaterAbsorb)),
        AbilityData::new("Levitate", 3.5, Some(EffectId::Levitate)),
        AbilityData::new("Liquid Voice", 1.5, Some(EffectId::LiquidVoice)),
        AbilityData::new("Prankster", 4.0, Some(EffectId::Prankster)),
        AbilityData::new("Technician", 3.5, Some(EffectId::Technician)),
        AbilityData::new("Supreme Overlord", 4.0, Some(EffectId::SupremeOverlord)),
        AbilityData::new("Adaptability", 4.0, Some(EffectId::Adaptability)),
        AbilityData::new("Guts", 3.5, Some(EffectId::Guts)),
        AbilityData::new("Rough Skin", 2.5, Some(EffectId::RoughSkin)),
        AbilityData::new("Static", 2.0, Some(EffectId::Static)),
        AbilityData::new("Steam Engine", 2.0, Some(EffectId::SteamEngine)),
        AbilityData::new("Sheer Force", 3.5, Some(EffectId::SheerForce)),
        AbilityData::new("Aftermath", 2.0, Some(EffectId::Aftermath)),
        AbilityData::new("Skill Link", 3.0, Some(EffectId::SkillLink)),
        AbilityData::new("Infiltrator", 2.5, Some(EffectId::Infiltrator)),
        AbilityData::new("Neutralizing Gas", 3.5, Some(EffectId::NeutralizingGas)),
        AbilityData::new("Chlorophyll", 3.0, Some(EffectId::Chlorophyll)),
        AbilityData::new("Swift Swim", 3.0, Some(EffectId::SwiftSwim)),
    ]
}

fn sample_items() -> Vec<ItemData> {
    vec![
        ItemData::new("Leftovers", ItemCategory::Held, Some(EffectId::Leftovers)),
        ItemData::new("Life Orb", ItemCategory::Held, Some(EffectId::LifeOrb)),
        ItemData::new("Choice Band", ItemCategory::Choice, Some(EffectId::ChoiceBand)),
        ItemData::new("Choice Specs", ItemCategory::Choice, Some(EffectId::ChoiceSpecs)),
        ItemData::new("Choice Scarf", ItemCategory::Choice, Some(EffectId::ChoiceScarf)),
        ItemData::type_boost("Charcoal", Type::Fire),
        ItemData::type_boost("Mystic Water", Type::Water),
        ItemData::new("Covert Cloak", ItemCategory::Held, Some(EffectId::CovertCloak)),
        ItemData::new("Heavy-Duty Boots", ItemCategory::Held, Some(EffectId::HeavyDutyBoots)),
        ItemData::new("Air Balloon", ItemCategory::Held, Some(EffectId::AirBalloon)),
        ItemData::new("Iron Ball", ItemCategory::Held, Some(EffectId::IronBall)),
        ItemData::new("Loaded Dice", ItemCategory::Held, Some(EffectId::LoadedDice)),
    ]
}

fn sample_moves() -> Vec<MoveData> {
    use MoveCategory::{Physical, Special, Status};

    vec![
        MoveData::base("Tackle", Type::Normal, Physical, 40, Some(100), 35),
        MoveData {
            secondaries: vec![SecondaryEffect::status(10, StatusKind::Paralysis)],
            ..MoveData::base("Thunderbolt", Type::Electric, Special, 90, Some(100), 15)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::status(10, StatusKind::Freeze)],
            ..MoveData::base("Ice Beam", Type::Ice, Special, 90, Some(100), 10)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::status(10, StatusKind::Burn)],
            ..MoveData::base("Flamethrower", Type::Fire, Special, 90, Some(100), 15)
        },
        MoveData {
            target: MoveTarget::AllOthers,
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR,
            ..MoveData::base("Earthquake", Type::Ground, Physical, 100, Some(100), 10)
        },
        MoveData {
            target: MoveTarget::AllAdjacentFoes,
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR,
            secondaries: vec![SecondaryEffect::flinch(30)],
            ..MoveData::base("Rock Slide", Type::Rock, Physical, 75, Some(90), 10)
        },
        MoveData {
            target: MoveTarget::AllOthers,
            ..MoveData::base("Surf", Type::Water, Special, 90, Some(100), 15)
        },
        MoveData {
            target: MoveTarget::User,
            priority: 4,
            protect_self: true,
            flags: MoveFlags::empty(),
            ..MoveData::base("Protect", Type::Normal, Status, 0, None, 10)
        },
        MoveData {
            self_switch: true,
            ..MoveData::base("U-turn", Type::Bug, Physical, 70, Some(100), 20)
        },
        MoveData {
            self_switch: true,
            ..MoveData::base("Volt Switch", Type::Electric, Special, 70, Some(100), 20)
        },
        MoveData {
            priority: 1,
            pre_check: Some(PreCheck::TargetAttackQueued),
            ..MoveData::base("Sucker Punch", Type::Dark, Physical, 70, Some(100), 5)
        },
        MoveData {
            priority: 3,
            pre_check: Some(PreCheck::FirstTurnOut),
            secondaries: vec![SecondaryEffect::flinch(100)],
            ..MoveData::base("Fake Out", Type::Normal, Physical, 40, Some(100), 10)
        },
        MoveData {
            target: MoveTarget::User,
            heal: Some((1, 2)),
            flags: MoveFlags::HEAL,
            ..MoveData::base("Recover", Type::Normal, Status, 0, None, 5)
        },
        MoveData {
            target: MoveTarget::User,
            boosts: Some([2, 0, 0, 0, 0, 0, 0]),
            flags: MoveFlags::empty(),
            ..MoveData::base("Swords Dance", Type::Normal, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::AllAdjacentFoes,
            boosts: Some([-1, 0, 0, 0, 0, 0, 0]),
            flags: MoveFlags::PROTECT | MoveFlags::REFLECTABLE | MoveFlags::SOUND,
            ..MoveData::base("Growl", Type::Normal, Status, 0, Some(100), 40)
        },
        MoveData {
            status: Some(StatusKind::Paralysis),
            ..MoveData::base("Thunder Wave", Type::Electric, Status, 0, Some(90), 20)
        },
        MoveData {
            status: Some(StatusKind::Burn),
            ..MoveData::base("Will-O-Wisp", Type::Fire, Status, 0, Some(85), 15)
        },
        MoveData {
            status: Some(StatusKind::Toxic),
            ..MoveData::base("Toxic", Type::Poison, Status, 0, Some(90), 10)
        },
        MoveData {
            status: Some(StatusKind::Sleep),
            flags: MoveFlags::PROTECT | MoveFlags::REFLECTABLE | MoveFlags::POWDER,
            ..MoveData::base("Spore", Type::Grass, Status, 0, Some(100), 15)
        },
        MoveData {
            target: MoveTarget::All,
            priority: -7,
            field_effect: Some(FieldEffectRule { kind: FieldKind::TrickRoom, turns: 5 }),
            flags: MoveFlags::empty(),
            ..MoveData::base("Trick Room", Type::Psychic, Status, 0, None, 5)
        },
        MoveData {
            target: MoveTarget::All,
            field_effect: Some(FieldEffectRule { kind: FieldKind::Weather(Weather::Rain), turns: 5 }),
            flags: MoveFlags::empty(),
            ..MoveData::base("Rain Dance", Type::Water, Status, 0, None, 5)
        },
        MoveData {
            target: MoveTarget::All,
            field_effect: Some(FieldEffectRule { kind: FieldKind::Weather(Weather::Sun), turns: 5 }),
            flags: MoveFlags::empty(),
            ..MoveData::base("Sunny Day", Type::Fire, Status, 0, None, 5)
        },
        MoveData {
            target: MoveTarget::All,
            field_effect: Some(FieldEffectRule { kind: FieldKind::Weather(Weather::Sand), turns: 5 }),
            flags: MoveFlags::empty(),
            ..MoveData::base("Sandstorm", Type::Rock, Status, 0, None, 10)
        },
        MoveData {
            target: MoveTarget::All,
            field_effect: Some(FieldEffectRule { kind: FieldKind::Terrain(Terrain::Grassy), turns: 5 }),
            flags: MoveFlags::empty(),
            ..MoveData::base("Grassy Terrain", Type::Grass, Status, 0, None, 10)
        },
        MoveData {
            terrain_priority: Some((Terrain::Grassy, 1)),
            ..MoveData::base("Grassy Glide", Type::Grass, Physical, 55, Some(100), 20)
        },
        MoveData {
            target: MoveTarget::UserSide,
            side_condition: Some(SideCondition::Reflect),
            flags: MoveFlags::empty(),
            ..MoveData::base("Reflect", Type::Psychic, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::UserSide,
            side_condition: Some(SideCondition::LightScreen),
            flags: MoveFlags::empty(),
            ..MoveData::base("Light Screen", Type::Psychic, Status, 0, None, 30)
        },
        MoveData {
            target: MoveTarget::UserSide,
            side_condition: Some(SideCondition::AuroraVeil),
            flags: MoveFlags::empty(),
            ..MoveData::base("Aurora Veil", Type::Ice, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::UserSide,
            side_condition: Some(SideCondition::Tailwind),
            flags: MoveFlags::empty(),
            ..MoveData::base("Tailwind", Type::Flying, Status, 0, None, 15)
        },
        MoveData {
            target: MoveTarget::FoeSide,
            side_condition: Some(SideCondition::StealthRock),
            flags: MoveFlags::REFLECTABLE,
            ..MoveData::base("Stealth Rock", Type::Rock, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::FoeSide,
            side_condition: Some(SideCondition::Spikes),
            flags: MoveFlags::REFLECTABLE,
            ..MoveData::base("Spikes", Type::Ground, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::FoeSide,
            side_condition: Some(SideCondition::ToxicSpikes),
            flags: MoveFlags::REFLECTABLE,
            ..MoveData::base("Toxic Spikes", Type::Poison, Status, 0, None, 20)
        },
        MoveData {
            target: MoveTarget::FoeSide,
            side_condition: Some(SideCondition::StickyWeb),
            flags: MoveFlags::REFLECTABLE,
            ..MoveData::base("Sticky Web", Type::Bug, Status, 0, None, 20)
        },
        MoveData {
            self_boosts: Some([0, -1, 0, -1, 0, 0, 0]),
            ..MoveData::base("Close Combat", Type::Fighting, Physical, 120, Some(100), 5)
        },
        MoveData::base("Dragon Claw", Type::Dragon, Physical, 80, Some(100), 15),
        MoveData {
            secondaries: vec![SecondaryEffect::flinch(30)],
            ..MoveData::base("Iron Head", Type::Steel, Physical, 80, Some(100), 15)
        },
        MoveData {
            flags: MoveFlags::CONTACT | MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::SLICING,
            ..MoveData::base("Kowtow Cleave", Type::Dark, Physical, 85, None, 10)
        },
        MoveData {
            power_rule: Some(PowerRule::FallenAllies { base: 50, per: 50 }),
            ..MoveData::base("Last Respects", Type::Ghost, Physical, 50, Some(100), 10)
        },
        MoveData {
            hit_count: Some(HitCount::Range(2, 5)),
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::BULLET,
            ..MoveData::base("Bullet Seed", Type::Grass, Physical, 25, Some(100), 30)
        },
        MoveData {
            hit_count: Some(HitCount::Range(2, 5)),
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::BULLET,
            ..MoveData::base("Rock Blast", Type::Rock, Physical, 25, Some(90), 10)
        },
        MoveData {
            hit_count: Some(HitCount::Fixed(2)),
            ..MoveData::base("Double Kick", Type::Fighting, Physical, 30, Some(100), 30)
        },
        MoveData {
            fixed_damage: Some(FixedDamage::Level),
            ..MoveData::base("Seismic Toss", Type::Fighting, Physical, 0, Some(100), 20)
        },
        MoveData {
            fixed_damage: Some(FixedDamage::Level),
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR,
            ..MoveData::base("Night Shade", Type::Ghost, Special, 0, Some(100), 15)
        },
        MoveData {
            fixed_damage: Some(FixedDamage::HalfTargetHp),
            ..MoveData::base("Super Fang", Type::Normal, Physical, 0, Some(90), 10)
        },
        MoveData {
            fixed_damage: Some(FixedDamage::Endeavor),
            ..MoveData::base("Endeavor", Type::Normal, Physical, 0, Some(100), 5)
        },
        MoveData {
            power_rule: Some(PowerRule::InverseSpeedRatio),
            ..MoveData::base("Gyro Ball", Type::Steel, Physical, 0, Some(100), 5)
        },
        MoveData {
            power_rule: Some(PowerRule::SpeedRatio),
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::BULLET,
            ..MoveData::base("Electro Ball", Type::Electric, Special, 0, Some(100), 10)
        },
        MoveData {
            power_rule: Some(PowerRule::HpScaled { max_power: 150 }),
            target: MoveTarget::AllAdjacentFoes,
            ..MoveData::base("Eruption", Type::Fire, Special, 150, Some(100), 5)
        },
        MoveData {
            power_rule: Some(PowerRule::LowHpThresholds),
            ..MoveData::base("Flail", Type::Normal, Physical, 0, Some(100), 15)
        },
        MoveData {
            power_rule: Some(PowerRule::TargetWeight),
            ..MoveData::base("Grass Knot", Type::Grass, Special, 0, Some(100), 20)
        },
        MoveData {
            power_rule: Some(PowerRule::TargetWeight),
            ..MoveData::base("Low Kick", Type::Fighting, Physical, 0, Some(100), 20)
        },
        MoveData {
            target: MoveTarget::AllAdjacentFoes,
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::SOUND,
            ..MoveData::base("Hyper Voice", Type::Normal, Special, 90, Some(100), 10)
        },
        MoveData {
            priority: 1,
            ..MoveData::base("Aqua Jet", Type::Water, Physical, 40, Some(100), 20)
        },
        MoveData {
            priority: 2,
            ..MoveData::base("Extreme Speed", Type::Normal, Physical, 80, Some(100), 5)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::boost(20, [0, 0, 0, -1, 0, 0, 0])],
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::BULLET,
            ..MoveData::base("Shadow Ball", Type::Ghost, Special, 80, Some(100), 15)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::boost(30, [0, 0, -1, 0, 0, 0, 0])],
            ..MoveData::base("Moonblast", Type::Fairy, Special, 95, Some(100), 15)
        },
        MoveData {
            recoil: Some((33, 100)),
            secondaries: vec![SecondaryEffect::status(10, StatusKind::Burn)],
            ..MoveData::base("Flare Blitz", Type::Fire, Physical, 120, Some(100), 15)
        },
        MoveData {
            recoil: Some((33, 100)),
            ..MoveData::base("Brave Bird", Type::Flying, Physical, 120, Some(100), 15)
        },
        MoveData {
            drain: Some((1, 2)),
            flags: MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::HEAL,
            ..MoveData::base("Giga Drain", Type::Grass, Special, 75, Some(100), 10)
        },
        MoveData {
            drain: Some((1, 2)),
            flags: MoveFlags::CONTACT | MoveFlags::PROTECT | MoveFlags::MIRROR
                | MoveFlags::PUNCH | MoveFlags::HEAL,
            ..MoveData::base("Drain Punch", Type::Fighting, Physical, 75, Some(100), 10)
        },
        MoveData {
            applies: Some(AppliedEffect::LeechSeed),
            ..MoveData::base("Leech Seed", Type::Grass, Status, 0, Some(90), 10)
        },
        MoveData {
            target: MoveTarget::User,
            applies: Some(AppliedEffect::Substitute),
            flags: MoveFlags::empty(),
            ..MoveData::base("Substitute", Type::Normal, Status, 0, None, 10)
        },
        MoveData {
            applies: Some(AppliedEffect::Taunt),
            flags: MoveFlags::PROTECT | MoveFlags::REFLECTABLE | MoveFlags::BYPASS_SUB,
            ..MoveData::base("Taunt", Type::Dark, Status, 0, Some(100), 20)
        },
        MoveData {
            applies: Some(AppliedEffect::Encore),
            flags: MoveFlags::PROTECT | MoveFlags::REFLECTABLE | MoveFlags::BYPASS_SUB,
            ..MoveData::base("Encore", Type::Normal, Status, 0, Some(100), 5)
        },
        MoveData {
            applies: Some(AppliedEffect::Disable),
            flags: MoveFlags::PROTECT | MoveFlags::REFLECTABLE | MoveFlags::BYPASS_SUB,
            ..MoveData::base("Disable", Type::Normal, Status, 0, Some(100), 20)
        },
        MoveData {
            applies: Some(AppliedEffect::Confuse),
            ..MoveData::base("Confuse Ray", Type::Ghost, Status, 0, Some(100), 10)
        },
        MoveData {
            target: MoveTarget::User,
            flags: MoveFlags::empty(),
            ..MoveData::base("Splash", Type::Normal, Status, 0, None, 40)
        },
        MoveData {
            ohko: true,
            ..MoveData::base("Fissure", Type::Ground, Physical, 0, Some(30), 5)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::boost(20, [0, -1, 0, 0, 0, 0, 0])],
            flags: MoveFlags::CONTACT | MoveFlags::PROTECT | MoveFlags::MIRROR | MoveFlags::BITE,
            ..MoveData::base("Crunch", Type::Dark, Physical, 80, Some(100), 15)
        },
        MoveData {
            secondaries: vec![SecondaryEffect::boost(10, [0, 0, 0, -1, 0, 0, 0])],
            ..MoveData::base("Psychic", Type::Psychic, Special, 90, Some(100), 10)
        },
    ]
}
