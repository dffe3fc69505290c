//! Per-game score tables
//!
//! Pure data, tracks the top 10 per game. The host decides where (and
//! whether) the tables are persisted; the core only keeps them sorted.

use serde::{Deserialize, Serialize};

use crate::calendar::{ALL_GAMES, GameKind};

/// Maximum entries kept per game
pub const MAX_ENTRIES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub score: u32,
    /// Seed the run was played with (replay/share link)
    pub seed: u64,
    /// Calendar day the run belonged to
    pub day: u8,
}

/// One game's top list, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoreTable {
    pub entries: Vec<ScoreEntry>,
}

impl ScoreTable {
    /// Check if a score would make the table
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Rank a score would achieve (1-indexed), `None` if it doesn't qualify
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a qualifying score, returning the rank achieved (1-indexed)
    pub fn add_score(&mut self, entry: ScoreEntry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        let pos = self.entries.iter().position(|e| entry.score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }
}

/// Top lists for the whole calendar, one table per game
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    tables: [ScoreTable; 5],
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, game: GameKind) -> &ScoreTable {
        &self.tables[game.index()]
    }

    pub fn table_mut(&mut self, game: GameKind) -> &mut ScoreTable {
        &mut self.tables[game.index()]
    }

    pub fn record(&mut self, game: GameKind, entry: ScoreEntry) -> Option<usize> {
        self.table_mut(game).add_score(entry)
    }

    /// (game, best score) pairs for games that have any entry
    pub fn bests(&self) -> Vec<(GameKind, u32)> {
        ALL_GAMES
            .iter()
            .filter_map(|&game| self.table(game).top_score().map(|s| (game, s)))
            .collect()
    }
}
