//! Code-breaking game: guess a hidden peg sequence
//!
//! Scoring is the classic two-pass rule. Pass one counts pegs that match in
//! both value and position and removes them from play; pass two counts
//! value-only matches, bounded by the smaller per-value count of what
//! remains on each side.

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicStream;
use crate::session::{Engine, GameConfig, Session, StepOutcome};

pub const CODE_LEN: usize = 4;
pub const MAX_GUESSES: usize = 10;
/// Winning on guess n scores (MAX_GUESSES + 1 - n) tiers
const TIER_POINTS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Peg {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
    Orange,
}

pub const PALETTE: [Peg; 6] = [
    Peg::Red,
    Peg::Green,
    Peg::Blue,
    Peg::Yellow,
    Peg::Purple,
    Peg::Orange,
];

/// Result of scoring one guess against the secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GuessScore {
    /// Right peg, right position
    pub exact: usize,
    /// Right peg, wrong position (multiset-bounded)
    pub color: usize,
}

/// Two-pass scoring; both slices must be `CODE_LEN` long
pub fn score_guess(secret: &[Peg], guess: &[Peg]) -> GuessScore {
    debug_assert_eq!(secret.len(), guess.len());

    let mut secret_rest = Vec::with_capacity(secret.len());
    let mut guess_rest = Vec::with_capacity(guess.len());
    let mut exact = 0;
    for (&s, &g) in secret.iter().zip(guess.iter()) {
        if s == g {
            exact += 1;
        } else {
            secret_rest.push(s);
            guess_rest.push(g);
        }
    }

    let color = PALETTE
        .iter()
        .map(|&peg| {
            let in_secret = secret_rest.iter().filter(|&&p| p == peg).count();
            let in_guess = guess_rest.iter().filter(|&&p| p == peg).count();
            in_secret.min(in_guess)
        })
        .sum();

    GuessScore { exact, color }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MastermindAction {
    /// Append a peg to the working guess
    Pick(Peg),
    /// Remove the last peg
    Erase,
    /// Score the working guess (only legal when it is full)
    Submit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MastermindInput {
    pub action: Option<MastermindAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attempt {
    pub guess: Vec<Peg>,
    pub result: GuessScore,
}

/// The secret stays out of the view until the game is decided
#[derive(Debug, Clone, Serialize)]
pub struct MastermindView {
    pub code_len: usize,
    pub palette: Vec<Peg>,
    pub attempts: Vec<Attempt>,
    pub working: Vec<Peg>,
    pub guesses_left: usize,
    pub revealed_secret: Option<Vec<Peg>>,
}

pub struct MastermindEngine {
    secret: Vec<Peg>,
    attempts: Vec<Attempt>,
    working: Vec<Peg>,
    decided: bool,
    score: u32,
}

impl MastermindEngine {
    pub fn new(seed: u64) -> Self {
        let mut stream = DeterministicStream::from_seed(seed);
        let secret = (0..CODE_LEN)
            .map(|_| PALETTE[stream.next_int(0, PALETTE.len() as i32 - 1) as usize])
            .collect();
        Self {
            secret,
            attempts: Vec::new(),
            working: Vec::new(),
            decided: false,
            score: 0,
        }
    }
}

impl Engine for MastermindEngine {
    type Input = MastermindInput;
    type View = MastermindView;

    fn initial_lives(&self) -> u8 {
        1
    }

    fn step(&mut self, input: &MastermindInput, _dt: f32) -> StepOutcome {
        let action = match input.action {
            Some(a) => a,
            None => return StepOutcome::Continue,
        };

        match action {
            MastermindAction::Pick(peg) => {
                if self.working.len() < CODE_LEN {
                    self.working.push(peg);
                }
            }
            MastermindAction::Erase => {
                self.working.pop();
            }
            MastermindAction::Submit => {
                // Partial guesses can't be submitted; drop silently
                if self.working.len() != CODE_LEN {
                    return StepOutcome::Continue;
                }
                let guess = std::mem::take(&mut self.working);
                let result = score_guess(&self.secret, &guess);
                self.attempts.push(Attempt { guess, result });

                if result.exact == CODE_LEN {
                    self.decided = true;
                    self.score =
                        (MAX_GUESSES + 1 - self.attempts.len()) as u32 * TIER_POINTS;
                    return StepOutcome::Won;
                }
                if self.attempts.len() >= MAX_GUESSES {
                    self.decided = true;
                    return StepOutcome::Lost;
                }
            }
        }

        StepOutcome::Continue
    }

    fn soft_reset(&mut self) {
        self.working.clear();
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn view(&self) -> MastermindView {
        MastermindView {
            code_len: CODE_LEN,
            palette: PALETTE.to_vec(),
            attempts: self.attempts.clone(),
            working: self.working.clone(),
            guesses_left: MAX_GUESSES - self.attempts.len(),
            revealed_secret: self.decided.then(|| self.secret.clone()),
        }
    }
}

pub fn create(config: GameConfig) -> Session<MastermindEngine> {
    let seed = config.resolve_seed();
    Session::new(MastermindEngine::new(seed), seed, config.on_complete)
}
