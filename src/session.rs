//! Session lifecycle shared by every game
//!
//! The host constructs a [`Session`] around a game engine, then drives it:
//! one [`Session::tick`] call per timer interval or animation frame. The
//! session owns the lifecycle (start screen, countdown, play, terminal
//! status, completion callback); the engine owns the gameplay inside
//! `Playing`. Terminal statuses are sticky - once reached, further ticks are
//! no-ops and the completion callback has already fired, exactly once.

use serde::{Deserialize, Serialize};

use crate::consts::COUNTDOWN_TICKS;
use crate::rng;

/// Lifecycle status of a game session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Idle, awaiting the player's start action
    Start,
    /// Non-interactive countdown, counter visible in the snapshot
    Countdown,
    /// Tick-driven simulation active
    Playing,
    Won,
    Lost,
    GameOver,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Won | Status::Lost | Status::GameOver)
    }
}

/// What a single engine step concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    /// A life was lost; the session decides between soft reset and game over
    LifeLost,
    Won,
    Lost,
}

/// One game's simulation core
///
/// Engines are pure state machines: same seed, same input sequence, same
/// states. They never see the lifecycle - `step` is only called in
/// `Playing`, and `soft_reset` restores the initial entity layout after a
/// non-final life loss (board, score and RNG position are preserved).
pub trait Engine {
    type Input: Clone + Default;
    type View: Clone + Serialize;

    /// Lives granted at session start (1 = sudden death)
    fn initial_lives(&self) -> u8;
    fn step(&mut self, input: &Self::Input, dt: f32) -> StepOutcome;
    fn soft_reset(&mut self);
    fn score(&self) -> u32;
    fn view(&self) -> Self::View;
}

pub type CompletionCallback = Box<dyn FnMut(u32)>;

/// Construction options for a game session
#[derive(Default)]
pub struct GameConfig {
    /// Reproducible layout seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Fired exactly once with the final score on any terminal status
    pub on_complete: Option<CompletionCallback>,
}

impl GameConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// The seed this session will actually run with
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rng::entropy_seed)
    }
}

/// Per-tick input: a start latch plus the game-specific events
#[derive(Debug, Clone, Default)]
pub struct SessionInput<I> {
    /// Leave the idle screen (ignored outside `Start`)
    pub start: bool,
    pub game: I,
}

impl<I: Default> SessionInput<I> {
    pub fn start() -> Self {
        Self {
            start: true,
            game: I::default(),
        }
    }

    pub fn game(input: I) -> Self {
        Self {
            start: false,
            game: input,
        }
    }
}

/// Renderable state for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<V> {
    pub status: Status,
    /// Countdown ticks remaining (meaningful in `Countdown`)
    pub countdown: u8,
    pub score: u32,
    pub lives: u8,
    /// Seconds spent in `Playing`
    pub elapsed: f32,
    /// Seed the session runs with (for share/replay links)
    pub seed: u64,
    pub view: V,
}

/// A live game instance owned by the host
pub struct Session<E: Engine> {
    engine: E,
    seed: u64,
    status: Status,
    countdown: u8,
    lives: u8,
    elapsed: f32,
    on_complete: Option<CompletionCallback>,
    destroyed: bool,
}

impl<E: Engine> Session<E> {
    pub fn new(engine: E, seed: u64, on_complete: Option<CompletionCallback>) -> Self {
        let lives = engine.initial_lives();
        Self {
            engine,
            seed,
            status: Status::Start,
            countdown: 0,
            lives,
            elapsed: 0.0,
            on_complete,
            destroyed: false,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Advance one tick. `dt` is seconds since the previous tick; discrete
    /// games may pass any fixed value, continuous games pass the frame delta.
    pub fn tick(&mut self, input: &SessionInput<E::Input>, dt: f32) -> Snapshot<E::View> {
        if self.destroyed || self.status.is_terminal() {
            return self.snapshot();
        }

        match self.status {
            Status::Start => {
                if input.start {
                    self.status = Status::Countdown;
                    self.countdown = COUNTDOWN_TICKS;
                    log::info!("session starting (seed {})", self.seed);
                }
            }
            Status::Countdown => {
                self.countdown = self.countdown.saturating_sub(1);
                if self.countdown == 0 {
                    self.status = Status::Playing;
                }
            }
            Status::Playing => {
                self.elapsed += dt;
                match self.engine.step(&input.game, dt) {
                    StepOutcome::Continue => {}
                    StepOutcome::LifeLost => {
                        self.lives = self.lives.saturating_sub(1);
                        if self.lives == 0 {
                            self.enter_terminal(Status::GameOver);
                        } else {
                            self.engine.soft_reset();
                            self.countdown = COUNTDOWN_TICKS;
                            self.status = Status::Countdown;
                            log::info!("life lost, {} remaining", self.lives);
                        }
                    }
                    StepOutcome::Won => self.enter_terminal(Status::Won),
                    StepOutcome::Lost => self.enter_terminal(Status::Lost),
                }
            }
            _ => {}
        }

        self.snapshot()
    }

    /// Stop the session: the callback is dropped and all further ticks are
    /// no-ops. Idempotent. (Timers and listeners live in the host; this is
    /// the core's entire teardown.)
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.on_complete = None;
    }

    pub fn snapshot(&self) -> Snapshot<E::View> {
        Snapshot {
            status: self.status,
            countdown: self.countdown,
            score: self.engine.score(),
            lives: self.lives,
            elapsed: self.elapsed,
            seed: self.seed,
            view: self.engine.view(),
        }
    }

    fn enter_terminal(&mut self, status: Status) {
        self.status = status;
        let score = self.engine.score();
        log::info!("session over: {:?}, score {}", status, score);
        if let Some(mut cb) = self.on_complete.take() {
            cb(score);
        }
    }
}
