//! Deterministic Pokemon battle engine.
//!
//! The core is a turn-resolution engine built for replayable, high-throughput
//! simulation: packed integer battle state, an integer-id static registry, a
//! tagged-dispatch event system, an integer damage pipeline and a scheduler
//! that resolves one atomic turn per [`engine::BattleEngine::step`]. A seed
//! plus the submitted action sequence reproduces the log stream bit for bit.

pub mod battle_log;
pub mod data;
pub mod engine;
pub mod error;
pub mod rng;
pub mod sim;

/// Commonly used exports for external consumers.
pub mod prelude {
    pub use crate::battle_log::{BattleLog, LogRecord};
    pub use crate::data::{sample::SAMPLE_DEX, Dex};
    pub use crate::engine::{BattleEngine, StepOutcome};
    pub use crate::error::{ActionError, DexError, TeamError};
    pub use crate::rng::BattlePrng;
    pub use crate::sim::battle::{Action, TargetRef};
    pub use crate::sim::state::{BattleState, FormatDescriptor, MonRef, PokemonBuild};
}
