//! Headless driver for the arcade cores
//!
//! Seeds every game, replays a fixed input tape against each, and prints the
//! final snapshots as JSON - the quickest way to eyeball determinism from a
//! shell: running `advent-arcade 42` twice must print identical output.

use advent_arcade::board::Dir;
use advent_arcade::calendar::{ALL_GAMES, GameKind};
use advent_arcade::games::hay::{HayAction, HayInput};
use advent_arcade::games::mastermind::{MastermindAction, MastermindInput, PALETTE};
use advent_arcade::games::memory::{MemoryInput, ORNAMENTS};
use advent_arcade::games::snake::SnakeInput;
use advent_arcade::games::{crossing, hay, mastermind, memory, snake};
use advent_arcade::scores::ScoreEntry;
use advent_arcade::session::{Engine, Session};
use advent_arcade::{GameConfig, Leaderboard, SessionInput};

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|a| a.parse().ok())
        .unwrap_or(20241204);
    log::info!("advent arcade headless driver, seed {seed}");

    let mut board = Leaderboard::new();
    let scores = [
        run_snake(seed),
        run_crossing(seed),
        run_mastermind(seed),
        run_memory(seed),
        run_hay(seed),
    ];
    for (game, score) in ALL_GAMES.iter().zip(scores) {
        board.record(
            *game,
            ScoreEntry {
                score,
                seed,
                day: game.index() as u8 + 1,
            },
        );
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&board).unwrap_or_default()
    );
}

/// Start a session and burn through the countdown
fn warm_up<E: Engine>(session: &mut Session<E>) {
    session.tick(&SessionInput::start(), 1.0);
    for _ in 0..3 {
        session.tick(&SessionInput::game(E::Input::default()), 1.0);
    }
}

fn report<E: Engine>(name: GameKind, session: &Session<E>) -> u32 {
    let snap = session.snapshot();
    println!(
        "{}",
        serde_json::to_string_pretty(&snap).unwrap_or_default()
    );
    log::info!("{}: {:?}, score {}", name.as_str(), snap.status, snap.score);
    snap.score
}

fn run_snake(seed: u64) -> u32 {
    let mut session = snake::create(GameConfig::seeded(seed));
    warm_up(&mut session);

    // Staircase across the torus until something is hit
    for i in 0..500u32 {
        let turn = match i % 14 {
            6 => Some(Dir::Down),
            13 => Some(Dir::Right),
            _ => None,
        };
        let snap = session.tick(&SessionInput::game(SnakeInput { turn }), 0.2);
        if snap.status.is_terminal() {
            break;
        }
    }
    report(GameKind::Snake, &session)
}

fn run_crossing(seed: u64) -> u32 {
    let mut session = crossing::create(GameConfig::seeded(seed));
    warm_up(&mut session);

    let dt = 1.0 / 60.0;
    for frame in 0..3600u32 {
        let hop = if frame % 45 == 0 { Some(Dir::Up) } else { None };
        let snap = session.tick(&SessionInput::game(crossing::CrossingInput { hop }), dt);
        if snap.status.is_terminal() {
            break;
        }
    }
    report(GameKind::Crossing, &session)
}

fn run_mastermind(seed: u64) -> u32 {
    let mut session = mastermind::create(GameConfig::seeded(seed));
    warm_up(&mut session);

    'guesses: for round in 0..10usize {
        for slot in 0..4 {
            let peg = PALETTE[(round + slot) % PALETTE.len()];
            session.tick(
                &SessionInput::game(MastermindInput {
                    action: Some(MastermindAction::Pick(peg)),
                }),
                1.0,
            );
        }
        let snap = session.tick(
            &SessionInput::game(MastermindInput {
                action: Some(MastermindAction::Submit),
            }),
            1.0,
        );
        if snap.status.is_terminal() {
            break 'guesses;
        }
    }
    report(GameKind::Mastermind, &session)
}

fn run_memory(seed: u64) -> u32 {
    let mut session = memory::create(GameConfig::seeded(seed));
    warm_up(&mut session);

    // Sit out the study window, then read the shelf back in order
    for _ in 0..24 {
        session.tick(&SessionInput::game(MemoryInput::default()), 0.25);
    }
    for item in ORNAMENTS {
        let snap = session.tick(&SessionInput::game(MemoryInput { guess: Some(item) }), 0.25);
        if snap.status.is_terminal() {
            break;
        }
    }
    report(GameKind::Memory, &session)
}

fn run_hay(seed: u64) -> u32 {
    let mut session = hay::create(GameConfig::seeded(seed));
    warm_up(&mut session);

    let dt = 0.1;
    for _ in 0..1200u32 {
        let view = session.snapshot().view;
        let action = if view.task.is_none() {
            if view.production_allowed && view.uncovered < 8.0 {
                Some(HayAction::StartProduce)
            } else if view.uncovered > 0.0 {
                Some(HayAction::StartTransfer)
            } else {
                None
            }
        } else {
            None
        };
        let snap = session.tick(&SessionInput::game(HayInput { action }), dt);
        if snap.status.is_terminal() {
            break;
        }
    }
    report(GameKind::Hay, &session)
}
