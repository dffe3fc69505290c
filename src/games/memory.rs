//! Observation game: spot the ornament that went missing
//!
//! The full shelf is shown during a study window; after it closes, one
//! ornament is gone and the player names it within a few tries. Earlier
//! correct guesses always outscore later ones, with a small bonus for
//! answering fast.

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicStream;
use crate::session::{Engine, GameConfig, Session, StepOutcome};

/// Seconds the full shelf stays visible
pub const STUDY_SECS: f32 = 5.0;
pub const MAX_GUESSES: usize = 3;
/// Base points per guess index; gaps exceed the maximum time bonus so an
/// earlier correct answer always wins
const GUESS_BASE: [u32; MAX_GUESSES] = [600, 300, 150];
const TIME_BONUS_WINDOW_SECS: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ornament {
    Star,
    Bell,
    Candle,
    Sleigh,
    Stocking,
    Snowflake,
    Holly,
    Reindeer,
    Gift,
    Angel,
    Drum,
    Lantern,
}

pub const ORNAMENTS: [Ornament; 12] = [
    Ornament::Star,
    Ornament::Bell,
    Ornament::Candle,
    Ornament::Sleigh,
    Ornament::Stocking,
    Ornament::Snowflake,
    Ornament::Holly,
    Ornament::Reindeer,
    Ornament::Gift,
    Ornament::Angel,
    Ornament::Drum,
    Ornament::Lantern,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryInput {
    pub guess: Option<Ornament>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryView {
    /// Shelf slots in display order; the withheld slot reads `None` once the
    /// study window closes
    pub slots: Vec<Option<Ornament>>,
    pub studying: bool,
    pub study_left: f32,
    pub guesses_left: usize,
    pub wrong_guesses: Vec<Ornament>,
}

pub struct MemoryEngine {
    layout: Vec<Ornament>,
    withheld_slot: usize,
    elapsed: f32,
    wrong: Vec<Ornament>,
    score: u32,
}

impl MemoryEngine {
    pub fn new(seed: u64) -> Self {
        let mut stream = DeterministicStream::from_seed(seed);
        let mut layout = ORNAMENTS.to_vec();
        stream.shuffle(&mut layout);
        let withheld_slot = stream.next_int(0, layout.len() as i32 - 1) as usize;
        Self {
            layout,
            withheld_slot,
            elapsed: 0.0,
            wrong: Vec::new(),
            score: 0,
        }
    }

    fn studying(&self) -> bool {
        self.elapsed < STUDY_SECS
    }

    fn withheld(&self) -> Ornament {
        self.layout[self.withheld_slot]
    }
}

impl Engine for MemoryEngine {
    type Input = MemoryInput;
    type View = MemoryView;

    fn initial_lives(&self) -> u8 {
        1
    }

    fn step(&mut self, input: &MemoryInput, dt: f32) -> StepOutcome {
        self.elapsed += dt;

        let guess = match input.guess {
            Some(g) => g,
            None => return StepOutcome::Continue,
        };
        // Guessing while everything is still visible is not a thing
        if self.studying() {
            return StepOutcome::Continue;
        }

        if guess == self.withheld() {
            let base = GUESS_BASE[self.wrong.len()];
            let bonus = (TIME_BONUS_WINDOW_SECS - self.elapsed).max(0.0) as u32;
            self.score = base + bonus;
            return StepOutcome::Won;
        }

        // Repeating an already-failed guess doesn't burn another try
        if !self.wrong.contains(&guess) {
            self.wrong.push(guess);
            if self.wrong.len() >= MAX_GUESSES {
                return StepOutcome::Lost;
            }
        }
        StepOutcome::Continue
    }

    fn soft_reset(&mut self) {
        self.wrong.clear();
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn view(&self) -> MemoryView {
        let studying = self.studying();
        let slots = self
            .layout
            .iter()
            .enumerate()
            .map(|(i, &item)| {
                if !studying && i == self.withheld_slot {
                    None
                } else {
                    Some(item)
                }
            })
            .collect();
        MemoryView {
            slots,
            studying,
            study_left: (STUDY_SECS - self.elapsed).max(0.0),
            guesses_left: MAX_GUESSES - self.wrong.len(),
            wrong_guesses: self.wrong.clone(),
        }
    }
}

pub fn create(config: GameConfig) -> Session<MemoryEngine> {
    let seed = config.resolve_seed();
    Session::new(MemoryEngine::new(seed), seed, config.on_complete)
}
