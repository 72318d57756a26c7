//! Static data registry.
//!
//! The `Dex` is assembled once from compiled tables and read-only afterwards;
//! battles hold it by shared reference and every lookup is an O(1) index.
//! Integer ids are assigned by sorting canonical keys, so independent loaders
//! over the same tables agree on the id map.

pub mod abilities;
pub mod effects;
pub mod items;
pub mod moves;
pub mod natures;
pub mod sample;
pub mod species;
pub mod types;

use std::collections::HashMap;

use crate::data::abilities::AbilityData;
use crate::data::items::ItemData;
use crate::data::moves::MoveData;
use crate::data::species::SpeciesData;
use crate::error::DexError;

/// Lowercase-alphanumeric canonical key: "Supreme Overlord" -> "supremeoverlord".
pub fn normalize_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct Dex {
    species: Vec<SpeciesData>,
    moves: Vec<MoveData>,
    abilities: Vec<AbilityData>,
    items: Vec<ItemData>,
    species_keys: HashMap<String, u16>,
    move_keys: HashMap<String, u16>,
    ability_keys: HashMap<String, u16>,
    item_keys: HashMap<String, u16>,
}

fn index_by_key<T>(
    kind: &'static str,
    mut records: Vec<T>,
    key_of: impl Fn(&T) -> String,
) -> Result<(Vec<T>, HashMap<String, u16>), DexError> {
    records.sort_by_key(|r| key_of(r));
    let mut keys = HashMap::with_capacity(records.len());
    for (id, record) in records.iter().enumerate() {
        let key = key_of(record);
        if keys.insert(key.clone(), id as u16).is_some() {
            return Err(DexError::DuplicateKey { kind, key });
        }
    }
    Ok((records, keys))
}

impl Dex {
    /// Build the registry from loader output. Duplicate canonical keys are
    /// rejected rather than letting a later record shadow an earlier one.
    pub fn from_tables(
        species: Vec<SpeciesData>,
        moves: Vec<MoveData>,
        abilities: Vec<AbilityData>,
        items: Vec<ItemData>,
    ) -> Result<Self, DexError> {
        let (species, species_keys) = index_by_key("species", species, |s| normalize_key(&s.name))?;
        let (moves, move_keys) = index_by_key("move", moves, |m| normalize_key(&m.name))?;
        let (abilities, ability_keys) =
            index_by_key("ability", abilities, |a| normalize_key(&a.name))?;
        let (items, item_keys) = index_by_key("item", items, |i| normalize_key(&i.name))?;
        Ok(Self {
            species,
            moves,
            abilities,
            items,
            species_keys,
            move_keys,
            ability_keys,
            item_keys,
        })
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    // Id lookups used while building teams; these report missing keys.

    pub fn species_id(&self, name: &str) -> Result<u16, DexError> {
        self.species_keys
            .get(&normalize_key(name))
            .copied()
            .ok_or_else(|| DexError::UnknownKey {
                kind: "species",
                key: name.to_string(),
            })
    }

    pub fn move_id(&self, name: &str) -> Result<u16, DexError> {
        self.move_keys
            .get(&normalize_key(name))
            .copied()
            .ok_or_else(|| DexError::UnknownKey {
                kind: "move",
                key: name.to_string(),
            })
    }

    pub fn ability_id(&self, name: &str) -> Result<u16, DexError> {
        self.ability_keys
            .get(&normalize_key(name))
            .copied()
            .ok_or_else(|| DexError::UnknownKey {
                kind: "ability",
                key: name.to_string(),
            })
    }

    pub fn item_id(&self, name: &str) -> Result<u16, DexError> {
        self.item_keys
            .get(&normalize_key(name))
            .copied()
            .ok_or_else(|| DexError::UnknownKey {
                kind: "item",
                key: name.to_string(),
            })
    }

    // Infallible id access for the battle hot path. Ids held in packed state
    // were validated at team build; an out-of-range id here is an engine bug.

    pub fn species(&self, id: u16) -> &SpeciesData {
        &self.species[id as usize]
    }

    pub fn mov(&self, id: u16) -> &MoveData {
        &self.moves[id as usize]
    }

    pub fn ability(&self, id: u16) -> &AbilityData {
        &self.abilities[id as usize]
    }

    pub fn item(&self, id: u16) -> &ItemData {
        &self.items[id as usize]
    }

    pub fn get_species(&self, id: u16) -> Option<&SpeciesData> {
        self.species.get(id as usize)
    }

    pub fn get_move(&self, id: u16) -> Option<&MoveData> {
        self.moves.get(id as usize)
    }

    pub fn get_ability(&self, id: u16) -> Option<&AbilityData> {
        self.abilities.get(id as usize)
    }

    pub fn get_item(&self, id: u16) -> Option<&ItemData> {
        self.items.get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::moves::MoveCategory;
    use crate::data::types::Type;

    #[test]
    fn ids_follow_sorted_keys() {
        let species = vec![
            SpeciesData::new("Zebra", [50; 6], Type::Normal, None, 100, 10),
            SpeciesData::new("Abra", [40; 6], Type::Psychic, None, 195, 9),
        ];
        let dex = Dex::from_tables(species, vec![], vec![], vec![]).unwrap();
        // "abra" sorts before "zebra" regardless of insertion order.
        assert_eq!(dex.species_id("Abra").unwrap(), 0);
        assert_eq!(dex.species_id("Zebra").unwrap(), 1);
        assert_eq!(dex.species(1).name, "Zebra");
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let moves = vec![
            MoveData::base("Fake Out", Type::Normal, MoveCategory::Physical, 40, Some(100), 10),
            MoveData::base("fakeout", Type::Normal, MoveCategory::Physical, 40, Some(100), 10),
        ];
        let err = Dex::from_tables(vec![], moves, vec![], vec![]).unwrap_err();
        assert_eq!(
            err,
            DexError::DuplicateKey {
                kind: "move",
                key: "fakeout".to_string()
            }
        );
    }

    #[test]
    fn unknown_keys_are_reported() {
        let dex = Dex::from_tables(vec![], vec![], vec![], vec![]).unwrap();
        assert!(matches!(
            dex.move_id("Hyper Beam"),
            Err(DexError::UnknownKey { kind: "move", .. })
        ));
    }

    #[test]
    fn normalize_strips_punctuation() {
        assert_eq!(normalize_key("King's Shield"), "kingsshield");
        assert_eq!(normalize_key("U-turn"), "uturn");
    }
}
