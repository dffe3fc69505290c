//! Hay farm: build stock before the weather takes it
//!
//! Weather walks a small Markov chain with durations drawn per transition
//! and the current state's weight damped so it rarely repeats back-to-back.
//! Uncovered hay drains at the weather's loss rate; the barn is safe. The
//! player runs one task at a time - producing hay or hauling it to the barn
//! - and cancelling a task applies its effect pro-rata to the elapsed
//! fraction.

use serde::{Deserialize, Serialize};

use crate::rng::DeterministicStream;
use crate::session::{Engine, GameConfig, Session, StepOutcome};

/// Round length; the session ends Won at this horizon with score = barn
pub const ROUND_SECS: f32 = 90.0;

const WEATHER_MIN_SECS: i32 = 4;
const WEATHER_MAX_SECS: i32 = 9;
/// Base transition weights, damped for the current state
const WEATHER_WEIGHTS: [f32; 4] = [0.35, 0.30, 0.25, 0.10];
const SELF_REPEAT_DAMP: f32 = 0.15;

const PRODUCE_YIELD: f32 = 10.0;
const PRODUCE_BASE_SECS: f32 = 3.0;
const PRODUCE_SECS_PER_UNIT: f32 = 0.05;
const TRANSFER_BASE_SECS: f32 = 2.0;
const TRANSFER_SECS_PER_UNIT: f32 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weather {
    Sunny,
    Overcast,
    Rain,
    Storm,
}

pub const WEATHER_STATES: [Weather; 4] =
    [Weather::Sunny, Weather::Overcast, Weather::Rain, Weather::Storm];

impl Weather {
    /// Uncovered hay lost per second
    pub fn loss_rate(self) -> f32 {
        match self {
            Weather::Sunny => 0.0,
            Weather::Overcast => 0.3,
            Weather::Rain => 1.5,
            Weather::Storm => 4.0,
        }
    }

    /// Hay can only be made in dry weather
    pub fn allows_production(self) -> bool {
        matches!(self, Weather::Sunny | Weather::Overcast)
    }

    fn index(self) -> usize {
        WEATHER_STATES
            .iter()
            .position(|&w| w == self)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HayAction {
    StartProduce,
    StartTransfer,
    /// Stop the running task, keeping the pro-rata share of its effect
    Cancel,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HayInput {
    pub action: Option<HayAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskKind {
    Produce,
    Transfer,
}

#[derive(Debug, Clone, Copy)]
enum ActiveTask {
    Produce {
        duration: f32,
        progress: f32,
    },
    Transfer {
        /// Uncovered hay earmarked when the haul started
        amount: f32,
        duration: f32,
        progress: f32,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub kind: TaskKind,
    /// Completed fraction in `[0, 1]`
    pub fraction: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HayView {
    pub weather: Weather,
    pub weather_left: f32,
    pub production_allowed: bool,
    pub uncovered: f32,
    pub barn: f32,
    pub task: Option<TaskView>,
    pub time_left: f32,
}

pub struct HayEngine {
    stream: DeterministicStream,
    weather: Weather,
    weather_left: f32,
    uncovered: f32,
    barn: f32,
    task: Option<ActiveTask>,
    elapsed: f32,
}

impl HayEngine {
    pub fn new(seed: u64) -> Self {
        let mut stream = DeterministicStream::from_seed(seed);
        let weather = *stream
            .choice(&WEATHER_STATES)
            .unwrap_or(&Weather::Sunny);
        let weather_left = stream.next_int(WEATHER_MIN_SECS, WEATHER_MAX_SECS) as f32;
        Self {
            stream,
            weather,
            weather_left,
            uncovered: 0.0,
            barn: 0.0,
            task: None,
            elapsed: 0.0,
        }
    }

    /// Weighted draw with the current state's weight damped
    fn next_weather(&mut self) -> Weather {
        let mut weights = WEATHER_WEIGHTS;
        weights[self.weather.index()] *= SELF_REPEAT_DAMP;
        let i = self.stream.weighted(&weights).unwrap_or(0);
        WEATHER_STATES[i]
    }

    fn advance_weather(&mut self, dt: f32) {
        self.weather_left -= dt;
        while self.weather_left <= 0.0 {
            self.weather = self.next_weather();
            self.weather_left +=
                self.stream.next_int(WEATHER_MIN_SECS, WEATHER_MAX_SECS) as f32;
            log::info!("weather -> {:?}", self.weather);
        }
    }

    fn apply_action(&mut self, action: HayAction) {
        match action {
            // Tasks are mutually exclusive; a second start is dropped
            HayAction::StartProduce => {
                if self.task.is_none() && self.weather.allows_production() {
                    self.task = Some(ActiveTask::Produce {
                        duration: PRODUCE_BASE_SECS + PRODUCE_SECS_PER_UNIT * self.uncovered,
                        progress: 0.0,
                    });
                }
            }
            HayAction::StartTransfer => {
                if self.task.is_none() && self.uncovered > 0.0 {
                    self.task = Some(ActiveTask::Transfer {
                        amount: self.uncovered,
                        duration: TRANSFER_BASE_SECS + TRANSFER_SECS_PER_UNIT * self.uncovered,
                        progress: 0.0,
                    });
                }
            }
            HayAction::Cancel => {
                if let Some(task) = self.task.take() {
                    self.settle(task, false);
                }
            }
        }
    }

    /// Apply a task's effect: in full on completion, pro-rata on cancel
    fn settle(&mut self, task: ActiveTask, completed: bool) {
        match task {
            ActiveTask::Produce { duration, progress } => {
                let fraction = if completed {
                    1.0
                } else {
                    (progress / duration).clamp(0.0, 1.0)
                };
                self.uncovered += PRODUCE_YIELD * fraction;
            }
            ActiveTask::Transfer {
                amount,
                duration,
                progress,
            } => {
                let fraction = if completed {
                    1.0
                } else {
                    (progress / duration).clamp(0.0, 1.0)
                };
                // The pile may have drained below the earmarked share
                let moved = (amount * fraction).min(self.uncovered);
                self.uncovered -= moved;
                self.barn += moved;
            }
        }
    }

    fn advance_task(&mut self, dt: f32) {
        let Some(mut task) = self.task.take() else {
            return;
        };
        let done = match &mut task {
            ActiveTask::Produce { duration, progress } => {
                // Hay only dries while the weather allows it; rain stalls it
                if self.weather.allows_production() {
                    *progress += dt;
                }
                *progress >= *duration
            }
            ActiveTask::Transfer { duration, progress, .. } => {
                *progress += dt;
                *progress >= *duration
            }
        };
        if done {
            self.settle(task, true);
        } else {
            self.task = Some(task);
        }
    }
}

impl Engine for HayEngine {
    type Input = HayInput;
    type View = HayView;

    fn initial_lives(&self) -> u8 {
        1
    }

    fn step(&mut self, input: &HayInput, dt: f32) -> StepOutcome {
        self.elapsed += dt;

        if let Some(action) = input.action {
            self.apply_action(action);
        }

        self.advance_weather(dt);

        // Drain the open pile; the barn is untouchable by weather
        self.uncovered = (self.uncovered - self.weather.loss_rate() * dt).max(0.0);

        self.advance_task(dt);

        if self.elapsed >= ROUND_SECS {
            return StepOutcome::Won;
        }
        StepOutcome::Continue
    }

    fn soft_reset(&mut self) {
        self.task = None;
    }

    fn score(&self) -> u32 {
        self.barn.max(0.0) as u32
    }

    fn view(&self) -> HayView {
        let task = self.task.as_ref().map(|task| match *task {
            ActiveTask::Produce { duration, progress } => TaskView {
                kind: TaskKind::Produce,
                fraction: (progress / duration).clamp(0.0, 1.0),
            },
            ActiveTask::Transfer {
                duration, progress, ..
            } => TaskView {
                kind: TaskKind::Transfer,
                fraction: (progress / duration).clamp(0.0, 1.0),
            },
        });
        HayView {
            weather: self.weather,
            weather_left: self.weather_left.max(0.0),
            production_allowed: self.weather.allows_production(),
            uncovered: self.uncovered,
            barn: self.barn,
            task,
            time_left: (ROUND_SECS - self.elapsed).max(0.0),
        }
    }
}

pub fn create(config: GameConfig) -> Session<HayEngine> {
    let seed = config.resolve_seed();
    Session::new(HayEngine::new(seed), seed, config.on_complete)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn sunny_engine(seed: u64) -> HayEngine {
        let mut engine = HayEngine::new(seed);
        engine.weather = Weather::Sunny;
        engine.weather_left = ROUND_SECS * 2.0;
        engine
    }

    fn run(engine: &mut HayEngine, action: Option<HayAction>, secs: f32) {
        let steps = (secs / DT).round() as usize;
        let mut input = HayInput { action };
        for _ in 0..steps {
            engine.step(&input, DT);
            input.action = None;
        }
    }

    #[test]
    fn test_drain_is_monotonic_and_floors_at_zero() {
        let mut engine = sunny_engine(1);
        engine.weather = Weather::Rain;
        engine.uncovered = 1.0;
        let mut prev = engine.uncovered;
        for _ in 0..20 {
            engine.step(&HayInput::default(), DT);
            assert!(engine.uncovered <= prev);
            assert!(engine.uncovered >= 0.0);
            prev = engine.uncovered;
        }
        assert_eq!(engine.uncovered, 0.0);
    }

    #[test]
    fn test_produce_completes_with_yield() {
        let mut engine = sunny_engine(2);
        run(
            &mut engine,
            Some(HayAction::StartProduce),
            PRODUCE_BASE_SECS + 1.0,
        );
        assert!(engine.task.is_none());
        assert!((engine.uncovered - PRODUCE_YIELD).abs() < 1e-3);
    }

    #[test]
    fn test_cancel_produce_pays_pro_rata() {
        let mut engine = sunny_engine(2);
        run(
            &mut engine,
            Some(HayAction::StartProduce),
            PRODUCE_BASE_SECS / 2.0,
        );
        engine.step(
            &HayInput {
                action: Some(HayAction::Cancel),
            },
            DT,
        );
        assert!(engine.task.is_none());
        assert!(engine.uncovered > PRODUCE_YIELD * 0.3);
        assert!(engine.uncovered < PRODUCE_YIELD * 0.7);
    }

    #[test]
    fn test_transfer_moves_everything_on_completion() {
        let mut engine = sunny_engine(3);
        engine.uncovered = 20.0;
        let duration = TRANSFER_BASE_SECS + TRANSFER_SECS_PER_UNIT * 20.0;
        run(&mut engine, Some(HayAction::StartTransfer), duration + 1.0);
        assert_eq!(engine.uncovered, 0.0);
        assert!((engine.barn - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_cancel_transfer_moves_share() {
        let mut engine = sunny_engine(3);
        engine.uncovered = 20.0;
        let duration = TRANSFER_BASE_SECS + TRANSFER_SECS_PER_UNIT * 20.0;
        run(&mut engine, Some(HayAction::StartTransfer), duration / 2.0);
        engine.step(
            &HayInput {
                action: Some(HayAction::Cancel),
            },
            DT,
        );
        assert!(engine.barn > 20.0 * 0.3);
        assert!(engine.barn < 20.0 * 0.7);
        assert!((engine.barn + engine.uncovered - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_tasks_are_mutually_exclusive() {
        let mut engine = sunny_engine(4);
        engine.uncovered = 10.0;
        engine.step(
            &HayInput {
                action: Some(HayAction::StartProduce),
            },
            DT,
        );
        engine.step(
            &HayInput {
                action: Some(HayAction::StartTransfer),
            },
            DT,
        );
        assert!(matches!(engine.task, Some(ActiveTask::Produce { .. })));
    }

    #[test]
    fn test_no_production_in_rain() {
        let mut engine = sunny_engine(5);
        engine.weather = Weather::Rain;
        engine.step(
            &HayInput {
                action: Some(HayAction::StartProduce),
            },
            DT,
        );
        assert!(engine.task.is_none());
    }

    #[test]
    fn test_produce_stalls_when_weather_turns() {
        let mut engine = sunny_engine(6);
        engine.step(
            &HayInput {
                action: Some(HayAction::StartProduce),
            },
            DT,
        );
        engine.weather = Weather::Storm;
        run(&mut engine, None, PRODUCE_BASE_SECS * 2.0);
        // Still pending: progress froze the moment production became illegal
        assert!(matches!(engine.task, Some(ActiveTask::Produce { .. })));
    }

    #[test]
    fn test_self_repeat_is_rare() {
        let mut engine = HayEngine::new(7);
        let mut repeats = 0;
        let mut transitions = 0;
        for _ in 0..300 {
            let before = engine.weather;
            engine.weather_left = 0.0;
            engine.advance_weather(DT);
            transitions += 1;
            if engine.weather == before {
                repeats += 1;
            }
        }
        // Damped self-weight keeps immediate repeats well under a quarter
        assert!(repeats * 4 < transitions, "{repeats}/{transitions} repeats");
    }

    #[test]
    fn test_round_ends_won_with_barn_score() {
        let mut engine = sunny_engine(8);
        engine.barn = 37.6;
        engine.elapsed = ROUND_SECS - DT / 2.0;
        let out = engine.step(&HayInput::default(), DT);
        assert_eq!(out, StepOutcome::Won);
        assert_eq!(engine.score(), 37);
    }
}
