//! Advent calendar plumbing: which game a day opens, and daily seeds
//!
//! Daily seeds are folded from the date string, so every player who opens
//! the same door on the same date plays the identical board.

use serde::{Deserialize, Serialize};

use crate::rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Snake,
    Crossing,
    Mastermind,
    Memory,
    Hay,
}

pub const ALL_GAMES: [GameKind; 5] = [
    GameKind::Snake,
    GameKind::Crossing,
    GameKind::Mastermind,
    GameKind::Memory,
    GameKind::Hay,
];

impl GameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Snake => "snake",
            GameKind::Crossing => "crossing",
            GameKind::Mastermind => "mastermind",
            GameKind::Memory => "memory",
            GameKind::Hay => "hay",
        }
    }

    /// Stable position in [`ALL_GAMES`]
    pub fn index(self) -> usize {
        match self {
            GameKind::Snake => 0,
            GameKind::Crossing => 1,
            GameKind::Mastermind => 2,
            GameKind::Memory => 3,
            GameKind::Hay => 4,
        }
    }
}

/// Which game calendar day `day` (1-24) opens; the set cycles
pub fn game_for_day(day: u8) -> GameKind {
    let day = day.clamp(1, 24) as usize;
    ALL_GAMES[(day - 1) % ALL_GAMES.len()]
}

/// Shared seed for a calendar date ("daily challenge")
pub fn daily_seed(year: u16, month: u8, day: u8) -> u64 {
    let key = format!("{year:04}-{month:02}-{day:02}");
    rng::fnv1a(key.as_bytes())
}
