//! The five game engines
//!
//! Each module owns its state, its level generator and its per-tick step,
//! and exposes `create(GameConfig)` returning a ready [`crate::Session`].

pub mod crossing;
pub mod hay;
pub mod mastermind;
pub mod memory;
pub mod snake;
