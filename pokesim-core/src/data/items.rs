//! Static held-item records.

use serde::{Deserialize, Serialize};

use crate::data::effects::EffectId;
use crate::data::types::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemCategory {
    Held,
    /// Locks the holder into its first chosen move.
    Choice,
    Berry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemData {
    pub name: String,
    pub category: ItemCategory,
    pub effect: Option<EffectId>,
    /// For type-boosting items: which move type gets the 4915/4096 boost.
    pub type_boost: Option<Type>,
}

impl ItemData {
    pub fn new(name: &str, category: ItemCategory, effect: Option<EffectId>) -> Self {
        Self {
            name: name.to_string(),
            category,
            effect,
            type_boost: None,
        }
    }

    pub fn type_boost(name: &str, boosted: Type) -> Self {
        Self {
            name: name.to_string(),
            category: ItemCategory::Held,
            effect: Some(EffectId::TypeBoostItem),
            type_boost: Some(boosted),
        }
    }
}
