//! Static ability records.

use serde::{Deserialize, Serialize};

use crate::data::effects::EffectId;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AbilityData {
    pub name: String,
    /// Competitive rating carried through from the source tables.
    pub rating: f32,
    /// Behavior tag, or `None` for abilities with no modeled effect.
    pub effect: Option<EffectId>,
}

impl AbilityData {
    pub fn new(name: &str, rating: f32, effect: Option<EffectId>) -> Self {
        Self {
            name: name.to_string(),
            rating,
            effect,
        }
    }
}
