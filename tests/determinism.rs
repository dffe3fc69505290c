//! Replay determinism across every game, plus generator properties
//!
//! Each trace builds its input tape from a stream derived from the same
//! seed, runs a full session, and serializes every snapshot. Two runs of the
//! same seed must produce byte-identical JSON sequences.

use advent_arcade::board::Dir;
use advent_arcade::games::hay::{HayAction, HayInput};
use advent_arcade::games::mastermind::{MastermindAction, MastermindInput, PALETTE};
use advent_arcade::games::memory::{MemoryInput, ORNAMENTS};
use advent_arcade::games::snake::{self, SnakeInput};
use advent_arcade::games::{crossing, hay, mastermind, memory};
use advent_arcade::rng::DeterministicStream;
use advent_arcade::{GameConfig, SessionInput};
use proptest::prelude::*;

fn tape_dir(tape: &mut DeterministicStream) -> Option<Dir> {
    match tape.next_int(0, 5) {
        0 => Some(Dir::Up),
        1 => Some(Dir::Down),
        2 => Some(Dir::Left),
        3 => Some(Dir::Right),
        _ => None,
    }
}

fn snake_trace(seed: u64, ticks: usize) -> Vec<String> {
    let mut session = snake::create(GameConfig::seeded(seed));
    let mut tape = DeterministicStream::from_seed(seed ^ 0xABCD);
    let mut out = Vec::with_capacity(ticks + 1);
    out.push(serde_json::to_string(&session.tick(&SessionInput::start(), 0.2)).unwrap());
    for _ in 0..ticks {
        let input = SnakeInput {
            turn: tape_dir(&mut tape),
        };
        out.push(serde_json::to_string(&session.tick(&SessionInput::game(input), 0.2)).unwrap());
    }
    out
}

fn crossing_trace(seed: u64, ticks: usize) -> Vec<String> {
    let mut session = crossing::create(GameConfig::seeded(seed));
    let mut tape = DeterministicStream::from_seed(seed ^ 0xABCD);
    let dt = 1.0 / 60.0;
    let mut out = Vec::with_capacity(ticks + 1);
    out.push(serde_json::to_string(&session.tick(&SessionInput::start(), dt)).unwrap());
    for _ in 0..ticks {
        let input = crossing::CrossingInput {
            hop: tape_dir(&mut tape),
        };
        out.push(serde_json::to_string(&session.tick(&SessionInput::game(input), dt)).unwrap());
    }
    out
}

fn mastermind_trace(seed: u64, ticks: usize) -> Vec<String> {
    let mut session = mastermind::create(GameConfig::seeded(seed));
    let mut tape = DeterministicStream::from_seed(seed ^ 0xABCD);
    let mut out = Vec::with_capacity(ticks + 1);
    out.push(serde_json::to_string(&session.tick(&SessionInput::start(), 1.0)).unwrap());
    for _ in 0..ticks {
        let action = match tape.next_int(0, 7) {
            0 => Some(MastermindAction::Erase),
            1 => Some(MastermindAction::Submit),
            n => Some(MastermindAction::Pick(
                PALETTE[(n as usize) % PALETTE.len()],
            )),
        };
        let input = MastermindInput { action };
        out.push(serde_json::to_string(&session.tick(&SessionInput::game(input), 1.0)).unwrap());
    }
    out
}

fn memory_trace(seed: u64, ticks: usize) -> Vec<String> {
    let mut session = memory::create(GameConfig::seeded(seed));
    let mut tape = DeterministicStream::from_seed(seed ^ 0xABCD);
    let mut out = Vec::with_capacity(ticks + 1);
    out.push(serde_json::to_string(&session.tick(&SessionInput::start(), 0.25)).unwrap());
    for _ in 0..ticks {
        let guess = if tape.chance(0.3) {
            tape.choice(&ORNAMENTS).copied()
        } else {
            None
        };
        let input = MemoryInput { guess };
        out.push(serde_json::to_string(&session.tick(&SessionInput::game(input), 0.25)).unwrap());
    }
    out
}

fn hay_trace(seed: u64, ticks: usize) -> Vec<String> {
    let mut session = hay::create(GameConfig::seeded(seed));
    let mut tape = DeterministicStream::from_seed(seed ^ 0xABCD);
    let mut out = Vec::with_capacity(ticks + 1);
    out.push(serde_json::to_string(&session.tick(&SessionInput::start(), 0.1)).unwrap());
    for _ in 0..ticks {
        let action = match tape.next_int(0, 9) {
            0 => Some(HayAction::StartProduce),
            1 => Some(HayAction::StartTransfer),
            2 => Some(HayAction::Cancel),
            _ => None,
        };
        let input = HayInput { action };
        out.push(serde_json::to_string(&session.tick(&SessionInput::game(input), 0.1)).unwrap());
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn snake_replay_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(snake_trace(seed, 150), snake_trace(seed, 150));
    }

    #[test]
    fn crossing_replay_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(crossing_trace(seed, 240), crossing_trace(seed, 240));
    }

    #[test]
    fn mastermind_replay_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(mastermind_trace(seed, 80), mastermind_trace(seed, 80));
    }

    #[test]
    fn memory_replay_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(memory_trace(seed, 60), memory_trace(seed, 60));
    }

    #[test]
    fn hay_replay_is_deterministic(seed in any::<u64>()) {
        prop_assert_eq!(hay_trace(seed, 300), hay_trace(seed, 300));
    }

    #[test]
    fn snake_boards_fully_connected(seed in any::<u64>()) {
        let board = snake::generate_board(seed);
        prop_assert!(board.fully_connected());
    }

    #[test]
    fn hay_stock_never_negative(seed in any::<u64>()) {
        let mut session = hay::create(GameConfig::seeded(seed));
        let mut tape = DeterministicStream::from_seed(seed ^ 0x5EED);
        session.tick(&SessionInput::start(), 0.1);
        for _ in 0..3 {
            session.tick(&SessionInput::game(HayInput::default()), 0.1);
        }
        for _ in 0..600 {
            let action = match tape.next_int(0, 9) {
                0 => Some(HayAction::StartProduce),
                1 => Some(HayAction::StartTransfer),
                2 => Some(HayAction::Cancel),
                _ => None,
            };
            let snap = session.tick(&SessionInput::game(HayInput { action }), 0.1);
            prop_assert!(snap.view.uncovered >= 0.0);
            prop_assert!(snap.view.barn >= 0.0);
        }
    }
}

#[test]
fn different_seeds_give_different_snake_boards() {
    // Not a strict invariant, but 8 seeds all colliding would mean the seed
    // is not reaching the generator.
    let boards: Vec<_> = (0..8u64).map(snake::generate_board).collect();
    let distinct = boards
        .iter()
        .map(|b| format!("{:?}", b.wall_cells()))
        .collect::<std::collections::HashSet<_>>();
    assert!(distinct.len() > 1);
}

#[test]
fn daily_seed_reproduces_identical_sessions() {
    let seed = advent_arcade::calendar::daily_seed(2024, 12, 7);
    assert_eq!(crossing_trace(seed, 120), crossing_trace(seed, 120));
}
