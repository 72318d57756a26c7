//! Battle simulation: packed state, event dispatch, the damage pipeline and
//! the turn scheduler.

pub mod battle;
pub mod damage;
pub mod events;
pub mod faint_handler;
pub mod handlers;
pub mod layout;
pub mod state;
pub mod stats;
pub mod switching;
