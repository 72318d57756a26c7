//! Packed battle state.
//!
//! Every mutable fact about a battle lives in the dense arrays declared in
//! `layout`. Components never poke lanes directly; they go through the typed
//! accessors here, which clamp writes, keep fainted bookkeeping honest and
//! emit log records. Derived values (effective speed, groundedness) are
//! recomputed on every read - their inputs change mid-turn and the reads are
//! cheap.

use serde::{Deserialize, Serialize};

use crate::battle_log::{BattleLog, Cause, LogRecord};
use crate::data::natures::Nature;
use crate::data::types::{Type, TYPE_NONE};
use crate::data::{effects::EffectId, Dex};
use crate::error::TeamError;
use crate::rng::BattlePrng;
use crate::sim::events::HandlerEntry;
use crate::sim::layout::*;
use crate::sim::stats::{self, BoostAxis, StatAxis, ALL_BOOST_AXES};

/// Battle shape fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub num_sides: usize,
    pub team_size: usize,
    pub active_slots: usize,
    /// Use the classic 0.5x screen modifier in doubles instead of 2732/4096.
    pub classic_screens: bool,
}

impl FormatDescriptor {
    pub fn singles() -> Self {
        Self {
            num_sides: 2,
            team_size: 6,
            active_slots: 1,
            classic_screens: false,
        }
    }

    pub fn doubles() -> Self {
        Self {
            num_sides: 2,
            team_size: 6,
            active_slots: 2,
            classic_screens: false,
        }
    }
}

/// Reference to one team slot on one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonRef {
    pub side: usize,
    pub slot: usize,
}

impl MonRef {
    pub fn new(side: usize, slot: usize) -> Self {
        Self { side, slot }
    }
}

/// Caller-facing build record for one team member.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PokemonBuild {
    pub species: String,
    pub level: u8,
    pub nature: Nature,
    pub ability: String,
    pub item: Option<String>,
    pub ivs: [u8; 6],
    pub evs: [u8; 6],
    pub moves: Vec<String>,
    pub tera_type: Option<Type>,
}

impl PokemonBuild {
    pub fn simple(species: &str, level: u8, ability: &str, moves: &[&str]) -> Self {
        Self {
            species: species.to_string(),
            level,
            nature: Nature::Hardy,
            ability: ability.to_string(),
            item: None,
            ivs: [31; 6],
            evs: [0; 6],
            moves: moves.iter().map(|m| m.to_string()).collect(),
            tera_type: None,
        }
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.item = Some(item.to_string());
        self
    }

    pub fn with_tera(mut self, tera: Type) -> Self {
        self.tera_type = Some(tera);
        self
    }

    pub fn with_evs(mut self, evs: [u8; 6]) -> Self {
        self.evs = evs;
        self
    }

    pub fn with_nature(mut self, nature: Nature) -> Self {
        self.nature = nature;
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BattleState {
    pub format: FormatDescriptor,
    /// Packed rows, `[num_sides][team_size][POKEMON_LANES]` flattened.
    rows: Vec<i32>,
    /// Remaining PP, `[num_sides][team_size][MOVE_SLOTS]` flattened.
    pp: Vec<i32>,
    /// Team index of each active slot; -1 while empty.
    active: Vec<i32>,
    /// `[num_sides][SIDE_CONDITION_COLUMNS]` flattened.
    side_conditions: Vec<i32>,
    field: [i32; FIELD_LANES],
    /// Total fainted per side; monotonically non-decreasing.
    fainted: Vec<i32>,
    /// One Terastallization per side per battle.
    tera_used: Vec<bool>,
    pub turn: u32,
    pub prng: BattlePrng,
    pub log: BattleLog,
    /// Registered effect handlers; managed by `sim::events`.
    pub(crate) handlers: Vec<HandlerEntry>,
    /// Pokemon that reached 0 HP and await faint processing.
    pub(crate) faint_queue: Vec<MonRef>,
}

impl BattleState {
    pub fn new(format: FormatDescriptor, seed: u32) -> Self {
        let mons = format.num_sides * format.team_size;
        Self {
            format,
            rows: vec![0; mons * POKEMON_LANES],
            pp: vec![0; mons * MOVE_SLOTS],
            active: vec![-1; format.num_sides * format.active_slots],
            side_conditions: vec![0; format.num_sides * SIDE_CONDITION_COLUMNS],
            field: [0; FIELD_LANES],
            fainted: vec![0; format.num_sides],
            tera_used: vec![false; format.num_sides],
            turn: 0,
            prng: BattlePrng::new(seed),
            log: BattleLog::new(),
            handlers: Vec::new(),
            faint_queue: Vec::new(),
        }
    }

    // --- Raw lane access ---------------------------------------------------

    fn row_base(&self, m: MonRef) -> usize {
        debug_assert!(m.side < self.format.num_sides && m.slot < self.format.team_size);
        (m.side * self.format.team_size + m.slot) * POKEMON_LANES
    }

    pub fn get(&self, m: MonRef, lane: usize) -> i32 {
        self.rows[self.row_base(m) + lane]
    }

    pub fn set(&mut self, m: MonRef, lane: usize, value: i32) {
        let base = self.row_base(m);
        self.rows[base + lane] = value;
    }

    fn add(&mut self, m: MonRef, lane: usize, delta: i32) {
        let base = self.row_base(m);
        self.rows[base + lane] += delta;
    }

    // --- Team loading ------------------------------------------------------

    pub fn load_team(
        &mut self,
        dex: &Dex,
        side: usize,
        team: &[PokemonBuild],
    ) -> Result<(), TeamError> {
        if team.is_empty() || team.len() > self.format.team_size {
            return Err(TeamError::BadTeamSize {
                side,
                got: team.len(),
                max: self.format.team_size,
            });
        }
        for (slot, build) in team.iter().enumerate() {
            self.load_member(dex, MonRef::new(side, slot), build)?;
        }
        Ok(())
    }

    fn load_member(
        &mut self,
        dex: &Dex,
        m: MonRef,
        build: &PokemonBuild,
    ) -> Result<(), TeamError> {
        let bad = |source| TeamError::BadMember {
            side: m.side,
            slot: m.slot,
            source,
        };
        if !(1..=100).contains(&build.level) {
            return Err(TeamError::BadLevel {
                side: m.side,
                slot: m.slot,
                level: build.level,
            });
        }
        if build.moves.is_empty() {
            return Err(TeamError::NoMoves {
                side: m.side,
                slot: m.slot,
            });
        }
        if build.moves.len() > MOVE_SLOTS {
            return Err(TeamError::TooManyMoves {
                side: m.side,
                slot: m.slot,
                got: build.moves.len(),
            });
        }

        let species_id = dex.species_id(&build.species).map_err(bad)?;
        let ability_id = dex.ability_id(&build.ability).map_err(bad)?;
        let item_id = match &build.item {
            Some(name) => Some(dex.item_id(name).map_err(bad)?),
            None => None,
        };
        let mut move_ids = [-1i32; MOVE_SLOTS];
        for (i, name) in build.moves.iter().enumerate() {
            move_ids[i] = dex.move_id(name).map_err(bad)? as i32;
        }

        let species = dex.species(species_id);
        if !species.ability_pool.is_empty()
            && !species
                .ability_pool
                .iter()
                .any(|a| crate::data::normalize_key(a) == crate::data::normalize_key(&build.ability))
        {
            return Err(TeamError::IllegalAbility {
                side: m.side,
                slot: m.slot,
                ability: build.ability.clone(),
            });
        }
        let level = build.level as u32;

        self.set(m, P_SPECIES, species_id as i32);
        self.set(m, P_LEVEL, level as i32);
        self.set(m, P_NATURE, build.nature.id() as i32);
        self.set(m, P_ABILITY, ability_id as i32);
        self.set(m, P_ITEM, item_id.map_or(-1, |id| id as i32));
        self.set(m, P_TYPE1, species.primary_type.id() as i32);
        self.set(
            m,
            P_TYPE2,
            species.secondary_type.map_or(TYPE_NONE, |t| t.id() as i32),
        );
        self.set(
            m,
            P_TERA_TYPE,
            build.tera_type.map_or(TYPE_NONE, |t| t.id() as i32),
        );

        let hp = stats::calc_hp(
            species.base_stats[0] as u32,
            build.ivs[0] as u32,
            build.evs[0] as u32,
            level,
        );
        self.set(m, P_STAT_HP, hp as i32);
        self.set(m, P_CURRENT_HP, hp as i32);
        for (i, axis) in [StatAxis::Atk, StatAxis::Def, StatAxis::Spa, StatAxis::Spd, StatAxis::Spe]
            .into_iter()
            .enumerate()
        {
            let v = stats::calc_stat(
                species.base_stats[i + 1] as u32,
                build.ivs[i + 1] as u32,
                build.evs[i + 1] as u32,
                level,
                build.nature,
                axis,
            );
            self.set(m, STAT_LANES[i + 1], v as i32);
        }

        for (i, lane) in MOVE_LANES.into_iter().enumerate() {
            self.set(m, lane, move_ids[i]);
            let pp = if move_ids[i] >= 0 {
                dex.mov(move_ids[i] as u16).pp as i32
            } else {
                0
            };
            let base = (m.side * self.format.team_size + m.slot) * MOVE_SLOTS;
            self.pp[base + i] = pp;
        }

        self.set(m, P_ENCORE_SLOT, -1);
        self.set(m, P_DISABLE_SLOT, -1);
        self.set(m, P_CHOICE_SLOT, -1);
        self.set(m, P_LAST_MOVE, -1);
        Ok(())
    }

    // --- Active slots ------------------------------------------------------

    pub fn active_team_slot(&self, side: usize, active_slot: usize) -> Option<usize> {
        let v = self.active[side * self.format.active_slots + active_slot];
        usize::try_from(v).ok()
    }

    pub fn set_active(&mut self, side: usize, active_slot: usize, team_slot: Option<usize>) {
        self.active[side * self.format.active_slots + active_slot] =
            team_slot.map_or(-1, |s| s as i32);
    }

    /// Active slot currently holding a team slot, if any.
    pub fn active_slot_of(&self, m: MonRef) -> Option<usize> {
        (0..self.format.active_slots)
            .find(|&a| self.active_team_slot(m.side, a) == Some(m.slot))
    }

    pub fn is_active(&self, m: MonRef) -> bool {
        self.active_slot_of(m).is_some()
    }

    /// All occupied active positions in (side, active_slot) order.
    pub fn all_active(&self) -> Vec<(usize, usize, MonRef)> {
        let mut out = Vec::new();
        for side in 0..self.format.num_sides {
            for a in 0..self.format.active_slots {
                if let Some(slot) = self.active_team_slot(side, a) {
                    out.push((side, a, MonRef::new(side, slot)));
                }
            }
        }
        out
    }

    // --- HP, status, stages ------------------------------------------------

    pub fn max_hp(&self, m: MonRef) -> i32 {
        self.get(m, P_STAT_HP)
    }

    pub fn hp(&self, m: MonRef) -> i32 {
        self.get(m, P_CURRENT_HP)
    }

    pub fn is_fainted(&self, m: MonRef) -> bool {
        self.hp(m) == 0
    }

    pub fn status(&self, m: MonRef) -> StatusKind {
        StatusKind::from_id(self.get(m, P_STATUS))
    }

    /// Damage clamped to current HP. Returns the HP actually removed. A drop
    /// to zero marks the Pokemon fainted and queues it for faint processing.
    pub fn damage(&mut self, m: MonRef, amount: i32, cause: Cause) -> i32 {
        if amount <= 0 || self.is_fainted(m) {
            return 0;
        }
        let dealt = amount.min(self.hp(m));
        self.add(m, P_CURRENT_HP, -dealt);
        let new_hp = self.hp(m);
        self.log.push(LogRecord::Damage {
            side: m.side,
            slot: m.slot,
            new_hp,
            max_hp: self.max_hp(m),
            cause,
        });
        if new_hp == 0 {
            self.set(m, P_STATUS, StatusKind::Fainted.id());
            self.set(m, P_STATUS_COUNTER, 0);
            self.faint_queue.push(m);
        }
        dealt
    }

    /// Heal clamped to max HP. Returns the HP actually restored.
    pub fn heal(&mut self, m: MonRef, amount: i32, cause: Cause) -> i32 {
        if amount <= 0 || self.is_fainted(m) {
            return 0;
        }
        let healed = amount.min(self.max_hp(m) - self.hp(m));
        if healed == 0 {
            return 0;
        }
        self.add(m, P_CURRENT_HP, healed);
        self.log.push(LogRecord::Heal {
            side: m.side,
            slot: m.slot,
            new_hp: self.hp(m),
            max_hp: self.max_hp(m),
            cause,
        });
        healed
    }

    /// Apply a primary status. Fails (returns false) if one is already set.
    /// Type and ability immunities are the caller's concern.
    pub fn set_status(&mut self, m: MonRef, status: StatusKind, counter: i32) -> bool {
        if self.status(m) != StatusKind::None || status == StatusKind::None {
            return false;
        }
        self.set(m, P_STATUS, status.id());
        self.set(m, P_STATUS_COUNTER, counter);
        self.log.push(LogRecord::Status {
            side: m.side,
            slot: m.slot,
            status,
        });
        true
    }

    pub fn cure_status(&mut self, m: MonRef) {
        let status = self.status(m);
        if status == StatusKind::None || status == StatusKind::Fainted {
            return;
        }
        self.set(m, P_STATUS, StatusKind::None.id());
        self.set(m, P_STATUS_COUNTER, 0);
        self.log.push(LogRecord::Cure {
            side: m.side,
            slot: m.slot,
            status,
        });
    }

    pub fn stage(&self, m: MonRef, axis: BoostAxis) -> i32 {
        self.get(m, STAGE_LANES[axis as usize])
    }

    /// Stage change clamped to [-6, 6]. Returns the applied delta; zero means
    /// the stage was already pinned at its cap.
    pub fn boost(&mut self, m: MonRef, axis: BoostAxis, delta: i32) -> i32 {
        let lane = STAGE_LANES[axis as usize];
        let old = self.get(m, lane);
        let new = (old + delta).clamp(-6, 6);
        if new == old {
            return 0;
        }
        self.set(m, lane, new);
        self.log.push(LogRecord::Boost {
            side: m.side,
            slot: m.slot,
            axis,
            delta: new - old,
            stage: new,
        });
        new - old
    }

    pub fn clear_boosts(&mut self, m: MonRef) {
        for axis in ALL_BOOST_AXES {
            self.set(m, STAGE_LANES[axis as usize], 0);
        }
    }

    // --- Moves and PP ------------------------------------------------------

    pub fn move_id(&self, m: MonRef, move_slot: usize) -> Option<u16> {
        u16::try_from(self.get(m, MOVE_LANES[move_slot])).ok()
    }

    fn pp_base(&self, m: MonRef) -> usize {
        (m.side * self.format.team_size + m.slot) * MOVE_SLOTS
    }

    pub fn pp(&self, m: MonRef, move_slot: usize) -> i32 {
        self.pp[self.pp_base(m) + move_slot]
    }

    pub fn dec_pp(&mut self, m: MonRef, move_slot: usize) {
        let base = self.pp_base(m);
        if self.pp[base + move_slot] > 0 {
            self.pp[base + move_slot] -= 1;
        }
    }

    // --- Volatiles ---------------------------------------------------------

    pub fn volatiles(&self, m: MonRef) -> Volatiles {
        Volatiles::from_bits_truncate(self.get(m, P_VOLATILES) as u32)
    }

    pub fn has_volatile(&self, m: MonRef, v: Volatiles) -> bool {
        self.volatiles(m).contains(v)
    }

    pub fn set_volatile(&mut self, m: MonRef, v: Volatiles) {
        let bits = self.volatiles(m) | v;
        self.set(m, P_VOLATILES, bits.bits() as i32);
    }

    pub fn clear_volatile(&mut self, m: MonRef, v: Volatiles) {
        let bits = self.volatiles(m) - v;
        self.set(m, P_VOLATILES, bits.bits() as i32);
    }

    /// Reset everything a Pokemon leaves behind when it leaves the field.
    pub fn reset_on_switch_out(&mut self, m: MonRef) {
        self.clear_boosts(m);
        self.clear_volatile(m, SWITCH_CLEARED_VOLATILES);
        self.set(m, P_CONFUSION_TURNS, 0);
        self.set(m, P_ENCORE_TURNS, 0);
        self.set(m, P_ENCORE_SLOT, -1);
        self.set(m, P_TAUNT_TURNS, 0);
        self.set(m, P_DISABLE_SLOT, -1);
        self.set(m, P_DISABLE_TURNS, 0);
        self.set(m, P_SUB_HP, 0);
        self.set(m, P_CHOICE_SLOT, -1);
        self.set(m, P_LAST_MOVE, -1);
        self.set(m, P_PROTECT_STREAK, 0);
        self.set(m, P_FLASH_FIRE, 0);
        self.set(m, P_ABILITY_SUPPRESSED, 0);
    }

    // --- Identity reads ----------------------------------------------------

    /// The ability as long as it is not suppressed. Suppression never alters
    /// the stored id.
    pub fn active_ability(&self, m: MonRef) -> Option<u16> {
        if self.get(m, P_ABILITY_SUPPRESSED) != 0 {
            return None;
        }
        u16::try_from(self.get(m, P_ABILITY)).ok()
    }

    pub fn ability_effect(&self, dex: &Dex, m: MonRef) -> Option<EffectId> {
        dex.ability(self.active_ability(m)?).effect
    }

    pub fn has_ability_effect(&self, dex: &Dex, m: MonRef, effect: EffectId) -> bool {
        self.ability_effect(dex, m) == Some(effect)
    }

    pub fn item(&self, m: MonRef) -> Option<u16> {
        u16::try_from(self.get(m, P_ITEM)).ok()
    }

    pub fn item_effect(&self, dex: &Dex, m: MonRef) -> Option<EffectId> {
        dex.item(self.item(m)?).effect
    }

    pub fn has_item_effect(&self, dex: &Dex, m: MonRef, effect: EffectId) -> bool {
        self.item_effect(dex, m) == Some(effect)
    }

    pub fn remove_item(&mut self, m: MonRef) {
        if let Some(item) = self.item(m) {
            self.set(m, P_ITEM, -1);
            self.log.push(LogRecord::ItemEnd {
                side: m.side,
                slot: m.slot,
                item,
            });
        }
    }

    /// Defending type lanes honoring Terastallization: a terastallized
    /// Pokemon defends purely with its Tera type.
    pub fn defending_types(&self, m: MonRef) -> (i32, i32, i32) {
        let tera = if self.get(m, P_TERASTALLIZED) != 0 {
            self.get(m, P_TERA_TYPE)
        } else {
            TYPE_NONE
        };
        (self.get(m, P_TYPE1), self.get(m, P_TYPE2), tera)
    }

    pub fn has_type(&self, m: MonRef, t: Type) -> bool {
        let id = t.id() as i32;
        if self.get(m, P_TERASTALLIZED) != 0 {
            return self.get(m, P_TERA_TYPE) == id;
        }
        self.get(m, P_TYPE1) == id || self.get(m, P_TYPE2) == id
    }

    /// STAB eligibility keeps the original types even while terastallized.
    pub fn original_types_include(&self, m: MonRef, t: Type) -> bool {
        let id = t.id() as i32;
        self.get(m, P_TYPE1) == id || self.get(m, P_TYPE2) == id
    }

    pub fn tera_available(&self, side: usize) -> bool {
        !self.tera_used[side]
    }

    pub fn terastallize(&mut self, m: MonRef) {
        debug_assert!(self.get(m, P_TERA_TYPE) != TYPE_NONE);
        self.tera_used[m.side] = true;
        self.set(m, P_TERASTALLIZED, 1);
        self.log.push(LogRecord::Terastallize {
            side: m.side,
            slot: m.slot,
            tera_type: self.get(m, P_TERA_TYPE) as u8,
        });
    }

    // --- Side conditions ---------------------------------------------------

    pub fn side_condition(&self, side: usize, sc: SideCondition) -> i32 {
        self.side_conditions[side * SIDE_CONDITION_COLUMNS + sc.column()]
    }

    pub fn set_side_condition(&mut self, side: usize, sc: SideCondition, value: i32) {
        self.side_conditions[side * SIDE_CONDITION_COLUMNS + sc.column()] = value;
    }

    // --- Field -------------------------------------------------------------

    pub fn field(&self, lane: usize) -> i32 {
        self.field[lane]
    }

    pub fn set_field(&mut self, lane: usize, value: i32) {
        self.field[lane] = value;
    }

    pub fn weather(&self) -> Weather {
        Weather::from_id(self.field[F_WEATHER])
    }

    pub fn terrain(&self) -> Terrain {
        Terrain::from_id(self.field[F_TERRAIN])
    }

    pub fn trick_room_active(&self) -> bool {
        self.field[F_TRICK_ROOM] > 0
    }

    pub fn wonder_room_active(&self) -> bool {
        self.field[F_WONDER_ROOM] > 0
    }

    pub fn magic_room_active(&self) -> bool {
        self.field[F_MAGIC_ROOM] > 0
    }

    // --- Faint bookkeeping -------------------------------------------------

    pub fn fainted_count(&self, side: usize) -> i32 {
        self.fainted[side]
    }

    pub(crate) fn record_faint(&mut self, m: MonRef) {
        self.fainted[m.side] += 1;
        self.log.push(LogRecord::Faint {
            side: m.side,
            slot: m.slot,
        });
    }

    pub fn side_has_reserve(&self, side: usize) -> bool {
        (0..self.format.team_size).any(|slot| {
            let m = MonRef::new(side, slot);
            self.get(m, P_SPECIES) >= 0 && self.hp(m) > 0 && !self.is_active(m)
        })
    }

    pub fn side_wiped(&self, side: usize) -> bool {
        (0..self.format.team_size).all(|slot| {
            let m = MonRef::new(side, slot);
            self.get(m, P_STAT_HP) == 0 || self.hp(m) == 0
        })
    }

    /// Reserve team slots a side may legally switch to.
    pub fn available_switches(&self, side: usize) -> Vec<usize> {
        (0..self.format.team_size)
            .filter(|&slot| {
                let m = MonRef::new(side, slot);
                self.get(m, P_STAT_HP) > 0 && self.hp(m) > 0 && !self.is_active(m)
            })
            .collect()
    }

    // --- Derived values ----------------------------------------------------

    /// Current effective Speed: stat stage, paralysis halving, ability
    /// weather doublers, item modifiers and Tailwind. Trick Room does not
    /// belong here; the scheduler negates the tier itself.
    pub fn effective_speed(&self, dex: &Dex, m: MonRef) -> i32 {
        let base = self.get(m, P_STAT_SPE) as u32;
        let mut speed = stats::apply_stage(base, self.stage(m, BoostAxis::Spe));
        if self.status(m) == StatusKind::Paralysis {
            speed /= 2;
        }
        match self.ability_effect(dex, m) {
            Some(EffectId::Chlorophyll) if self.weather() == Weather::Sun => speed *= 2,
            Some(EffectId::SwiftSwim) if self.weather() == Weather::Rain => speed *= 2,
            _ => {}
        }
        match self.item_effect(dex, m) {
            Some(EffectId::ChoiceScarf) => speed = speed * 3 / 2,
            Some(EffectId::IronBall) => speed /= 2,
            _ => {}
        }
        if self.side_condition(m.side, SideCondition::Tailwind) > 0 {
            speed *= 2;
        }
        speed.min(10_000) as i32
    }

    /// Grounded unless Flying-typed, Levitate or Air Balloon lifts it; Iron
    /// Ball forces it back down.
    pub fn is_grounded(&self, dex: &Dex, m: MonRef) -> bool {
        if self.has_item_effect(dex, m, EffectId::IronBall) {
            return true;
        }
        if self.has_type(m, Type::Flying) {
            return false;
        }
        if self.has_ability_effect(dex, m, EffectId::Levitate) {
            return false;
        }
        if self.has_item_effect(dex, m, EffectId::AirBalloon) {
            return false;
        }
        true
    }

    // --- Diagnostics -------------------------------------------------------

    /// State snapshot for invariant-violation diagnostics.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable state: {e}>"))
    }

    /// Hard engine invariants. A violation is a programmer error: halt with
    /// the snapshot and the last log record, never paper over it.
    pub fn assert_invariants(&self, dex: &Dex) {
        for side in 0..self.format.num_sides {
            for slot in 0..self.format.team_size {
                let m = MonRef::new(side, slot);
                if self.get(m, P_SPECIES) < 0 || self.get(m, P_STAT_HP) == 0 {
                    continue;
                }
                let hp = self.hp(m);
                let max = self.max_hp(m);
                if hp < 0 || hp > max {
                    self.invariant_panic(&format!("hp {hp} out of [0, {max}] for {m:?}"));
                }
                if (hp == 0) != (self.status(m) == StatusKind::Fainted) {
                    self.invariant_panic(&format!("fainted status out of sync for {m:?}"));
                }
                for axis in ALL_BOOST_AXES {
                    let s = self.stage(m, axis);
                    if !(-6..=6).contains(&s) {
                        self.invariant_panic(&format!("stage {s} out of range for {m:?}"));
                    }
                }
                for ms in 0..MOVE_SLOTS {
                    if let Some(id) = self.move_id(m, ms) {
                        let pp = self.pp(m, ms);
                        let max_pp = dex.mov(id).pp as i32;
                        if pp < 0 || pp > max_pp {
                            self.invariant_panic(&format!(
                                "pp {pp} out of [0, {max_pp}] for {m:?} slot {ms}"
                            ));
                        }
                    }
                }
            }
        }
    }

    pub(crate) fn invariant_panic(&self, message: &str) -> ! {
        panic!(
            "engine invariant violated: {message}\nlast log: {:?}\nstate: {}",
            self.log.last(),
            self.snapshot_json()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample::SAMPLE_DEX;

    fn loaded_state() -> BattleState {
        let dex = &*SAMPLE_DEX;
        let mut state = BattleState::new(FormatDescriptor::singles(), 1);
        state
            .load_team(
                dex,
                0,
                &[PokemonBuild::simple("Garchomp", 50, "Rough Skin", &["Earthquake", "Dragon Claw"])],
            )
            .unwrap();
        state
            .load_team(
                dex,
                1,
                &[PokemonBuild::simple("Charizard", 50, "Blaze", &["Flamethrower"])],
            )
            .unwrap();
        state.set_active(0, 0, Some(0));
        state.set_active(1, 0, Some(0));
        state
    }

    #[test]
    fn damage_clamps_and_marks_fainted() {
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        let max = state.max_hp(m);
        let dealt = state.damage(m, max + 500, Cause::Struggle);
        assert_eq!(dealt, max);
        assert_eq!(state.hp(m), 0);
        assert_eq!(state.status(m), StatusKind::Fainted);
        assert_eq!(state.faint_queue, vec![m]);
    }

    #[test]
    fn heal_clamps_to_max() {
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        state.damage(m, 30, Cause::Struggle);
        let healed = state.heal(m, 9999, Cause::Drain);
        assert_eq!(healed, 30);
        assert_eq!(state.hp(m), state.max_hp(m));
    }

    #[test]
    fn boosts_clamp_at_six() {
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        assert_eq!(state.boost(m, BoostAxis::Atk, 4), 4);
        assert_eq!(state.boost(m, BoostAxis::Atk, 4), 2);
        assert_eq!(state.boost(m, BoostAxis::Atk, 1), 0);
        assert_eq!(state.stage(m, BoostAxis::Atk), 6);
    }

    #[test]
    fn one_status_at_a_time() {
        let mut state = loaded_state();
        let m = MonRef::new(1, 0);
        assert!(state.set_status(m, StatusKind::Burn, 0));
        assert!(!state.set_status(m, StatusKind::Paralysis, 0));
        assert_eq!(state.status(m), StatusKind::Burn);
        state.cure_status(m);
        assert_eq!(state.status(m), StatusKind::None);
    }

    #[test]
    fn paralysis_halves_speed() {
        let dex = &*SAMPLE_DEX;
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        let before = state.effective_speed(dex, m);
        state.set_status(m, StatusKind::Paralysis, 0);
        assert_eq!(state.effective_speed(dex, m), before / 2);
    }

    #[test]
    fn tailwind_doubles_speed() {
        let dex = &*SAMPLE_DEX;
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        let before = state.effective_speed(dex, m);
        state.set_side_condition(0, SideCondition::Tailwind, 3);
        assert_eq!(state.effective_speed(dex, m), before * 2);
    }

    #[test]
    fn switch_out_reset_clears_volatiles_and_stages() {
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        state.boost(m, BoostAxis::Atk, 2);
        state.set_volatile(m, Volatiles::LEECH_SEED | Volatiles::TRAPPED);
        state.set(m, P_TAUNT_TURNS, 3);
        state.reset_on_switch_out(m);
        assert_eq!(state.stage(m, BoostAxis::Atk), 0);
        assert!(state.volatiles(m).is_empty());
        assert_eq!(state.get(m, P_TAUNT_TURNS), 0);
    }

    #[test]
    fn ability_pool_is_enforced_when_present() {
        use crate::data::abilities::AbilityData;
        use crate::data::moves::{MoveCategory, MoveData};
        use crate::data::species::SpeciesData;
        let dex = crate::data::Dex::from_tables(
            vec![SpeciesData::new("Gyarados", [95, 125, 79, 60, 100, 81], Type::Water, None, 2350, 65)
                .with_abilities(&["Intimidate"])],
            vec![MoveData::base("Tackle", Type::Normal, MoveCategory::Physical, 40, Some(100), 35)],
            vec![
                AbilityData::new("Intimidate", 3.5, None),
                AbilityData::new("Levitate", 3.5, None),
            ],
            vec![],
        )
        .unwrap();
        let mut state = BattleState::new(FormatDescriptor::singles(), 1);
        let mut build = PokemonBuild::simple("Gyarados", 50, "Levitate", &["Tackle"]);
        let err = state.load_team(&dex, 0, &[build.clone()]).unwrap_err();
        assert!(matches!(err, TeamError::IllegalAbility { .. }));
        build.ability = "Intimidate".to_string();
        assert!(state.load_team(&dex, 0, &[build]).is_ok());
    }

    #[test]
    fn serde_round_trip_is_exact() {
        let state = loaded_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: BattleState = serde_json::from_str(&json).unwrap();
        assert_eq!(state.snapshot_json(), back.snapshot_json());
        assert_eq!(state.prng, back.prng);
    }

    #[test]
    fn tera_defending_types() {
        let mut state = loaded_state();
        let m = MonRef::new(0, 0);
        state.set(m, P_TERA_TYPE, Type::Steel.id() as i32);
        assert!(state.has_type(m, Type::Dragon));
        state.terastallize(m);
        assert!(!state.has_type(m, Type::Dragon));
        assert!(state.has_type(m, Type::Steel));
        // STAB still sees the original typing.
        assert!(state.original_types_include(m, Type::Dragon));
        assert!(!state.tera_available(0));
    }
}
