//! Static species records.

use serde::{Deserialize, Serialize};

use crate::data::types::Type;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    /// Base stats in `StatAxis` order: HP, Atk, Def, SpA, SpD, Spe.
    pub base_stats: [u16; 6],
    pub primary_type: Type,
    pub secondary_type: Option<Type>,
    /// Hectograms; Grass Knot / Low Kick brackets read this.
    pub weight_hg: u16,
    /// Decimeters.
    pub height_dm: u16,
    /// Abilities this species may legally carry; empty means unchecked.
    pub ability_pool: Vec<String>,
}

impl SpeciesData {
    pub fn new(
        name: &str,
        base_stats: [u16; 6],
        primary_type: Type,
        secondary_type: Option<Type>,
        weight_hg: u16,
        height_dm: u16,
    ) -> Self {
        Self {
            name: name.to_string(),
            base_stats,
            primary_type,
            secondary_type,
            weight_hg,
            height_dm,
            ability_pool: Vec::new(),
        }
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.ability_pool = abilities.iter().map(|a| a.to_string()).collect();
        self
    }
}
