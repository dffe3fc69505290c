//! Snake on a toroidal grid with procedurally generated wall sets
//!
//! The board is generated once per seed from one of four wall patterns and
//! must pass the free-cell connectivity check before it ships; movement is
//! one cell per tick with wraparound, and every wall or body overlap is
//! fatal. Speed lives in the snapshot as a shrinking tick interval - the
//! host owns the timer and is expected to follow it.

use std::collections::VecDeque;

use serde::Serialize;

use crate::board::{Board, Dir, GridPos};
use crate::consts::GEN_MAX_ATTEMPTS;
use crate::rng::DeterministicStream;
use crate::session::{Engine, GameConfig, Session, StepOutcome};

pub const GRID_WIDTH: i32 = 17;
pub const GRID_HEIGHT: i32 = 15;
/// Starting body length (head + 2)
const START_LEN: i32 = 3;
const POINTS_PER_FOOD: u32 = 10;
/// Host-facing tick interval: starts slow, shrinks per food, floored
const START_TICK_MS: u32 = 220;
const SPEEDUP_PER_FOOD_MS: u32 = 8;
const MIN_TICK_MS: u32 = 80;
/// Reject boards so dense they leave no room to play
const MIN_FREE_CELLS: usize = 140;

/// Wall layout families the generator draws from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WallPattern {
    Scatter,
    Stripes,
    Rings,
    Spiral,
}

/// Per-tick input: at most one direction change
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeInput {
    pub turn: Option<Dir>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnakeView {
    pub width: i32,
    pub height: i32,
    pub walls: Vec<GridPos>,
    /// Head first
    pub body: Vec<GridPos>,
    pub food: GridPos,
    pub heading: Dir,
    /// Interval the host should schedule the next tick at
    pub tick_interval_ms: u32,
}

pub struct SnakeEngine {
    board: Board,
    stream: DeterministicStream,
    body: VecDeque<GridPos>,
    heading: Dir,
    food: GridPos,
    score: u32,
    tick_ms: u32,
}

impl SnakeEngine {
    pub fn new(seed: u64) -> Self {
        let board = generate_board(seed);
        // Board generation consumes its own per-attempt streams; food spawns
        // draw from a separate stream so replay stays stable either way.
        let mut stream = DeterministicStream::from_seed(seed ^ 0xF00D);
        let body = start_body(&board);
        let food = spawn_food(&board, &body, &mut stream).unwrap_or(GridPos::new(0, 0));
        Self {
            board,
            stream,
            body,
            heading: Dir::Right,
            food,
            score: 0,
            tick_ms: START_TICK_MS,
        }
    }
}

impl Engine for SnakeEngine {
    type Input = SnakeInput;
    type View = SnakeView;

    fn initial_lives(&self) -> u8 {
        1
    }

    fn step(&mut self, input: &SnakeInput, _dt: f32) -> StepOutcome {
        // One direction change per tick; a 180° reversal is silently dropped
        if let Some(turn) = input.turn {
            if turn != self.heading.opposite() {
                self.heading = turn;
            }
        }

        let head = self.body[0];
        let next = self.board.step(head, self.heading);

        // Fatal overlaps leave the body untouched on the final tick
        if self.board.is_wall(next) || self.body.contains(&next) {
            return StepOutcome::LifeLost;
        }

        self.body.push_front(next);
        if next == self.food {
            // Growth keeps the tail cell; the old tail position stays filled
            self.score += POINTS_PER_FOOD;
            self.tick_ms = (self.tick_ms.saturating_sub(SPEEDUP_PER_FOOD_MS)).max(MIN_TICK_MS);
            match spawn_food(&self.board, &self.body, &mut self.stream) {
                Some(food) => self.food = food,
                // Board filled: nothing left to eat
                None => return StepOutcome::Won,
            }
        } else {
            self.body.pop_back();
        }

        StepOutcome::Continue
    }

    fn soft_reset(&mut self) {
        self.body = start_body(&self.board);
        self.heading = Dir::Right;
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn view(&self) -> SnakeView {
        SnakeView {
            width: self.board.width,
            height: self.board.height,
            walls: self.board.wall_cells(),
            body: self.body.iter().copied().collect(),
            food: self.food,
            heading: self.heading,
            tick_interval_ms: self.tick_ms,
        }
    }
}

pub fn create(config: GameConfig) -> Session<SnakeEngine> {
    let seed = config.resolve_seed();
    Session::new(SnakeEngine::new(seed), seed, config.on_complete)
}

/// Initial body: head at the grid center, tail trailing left
fn start_body(board: &Board) -> VecDeque<GridPos> {
    let cy = board.height / 2;
    let cx = board.width / 2;
    (0..START_LEN)
        .map(|i| GridPos::new(cx - i, cy))
        .collect()
}

/// Uniform pick over cells that are neither wall nor snake; `None` when full
fn spawn_food(
    board: &Board,
    body: &VecDeque<GridPos>,
    stream: &mut DeterministicStream,
) -> Option<GridPos> {
    let mut candidates = Vec::new();
    for y in 0..board.height {
        for x in 0..board.width {
            let pos = GridPos::new(x, y);
            if !board.is_wall(pos) && !body.contains(&pos) {
                candidates.push(pos);
            }
        }
    }
    stream.choice(&candidates).copied()
}

/// Build a wall set for `seed`, retrying with seed-derived attempt indices
/// until the free-cell graph is fully connected. Falls back to an open field
/// rather than ever shipping an unsolvable board.
pub fn generate_board(seed: u64) -> Board {
    for attempt in 0..GEN_MAX_ATTEMPTS {
        let mut stream =
            DeterministicStream::from_seed(seed.wrapping_add(attempt.wrapping_mul(0x9E37_79B9)));
        let mut board = Board::empty(GRID_WIDTH, GRID_HEIGHT);

        let pattern = match stream.next_int(0, 3) {
            0 => WallPattern::Scatter,
            1 => WallPattern::Stripes,
            2 => WallPattern::Rings,
            _ => WallPattern::Spiral,
        };
        match pattern {
            WallPattern::Scatter => carve_scatter(&mut board, &mut stream),
            WallPattern::Stripes => carve_stripes(&mut board, &mut stream),
            WallPattern::Rings => carve_rings(&mut board, &mut stream),
            WallPattern::Spiral => carve_spiral(&mut board, &mut stream),
        }

        clear_start_zone(&mut board);

        if board.free_count() >= MIN_FREE_CELLS && board.fully_connected() {
            log::info!(
                "snake board: {:?}, {} walls, attempt {}",
                pattern,
                board.wall_cells().len(),
                attempt
            );
            return board;
        }
    }

    log::warn!(
        "snake board generation exhausted {} attempts, using open field",
        GEN_MAX_ATTEMPTS
    );
    Board::empty(GRID_WIDTH, GRID_HEIGHT)
}

/// The snake's spawn cells plus a one-cell runway must stay open
fn clear_start_zone(board: &mut Board) {
    let cy = board.height / 2;
    let cx = board.width / 2;
    for i in -START_LEN..=1 {
        board.set_wall(GridPos::new(cx + i, cy), false);
    }
}

fn carve_scatter(board: &mut Board, stream: &mut DeterministicStream) {
    let count = stream.next_int(12, 24);
    for _ in 0..count {
        let pos = GridPos::new(
            stream.next_int(0, board.width - 1),
            stream.next_int(0, board.height - 1),
        );
        board.set_wall(pos, true);
    }
}

fn carve_stripes(board: &mut Board, stream: &mut DeterministicStream) {
    let vertical = stream.chance(0.5);
    let spacing = stream.next_int(3, 5);
    let gap_chance = 0.35;
    let offset = stream.next_int(1, spacing);

    if vertical {
        let mut x = offset;
        while x < board.width {
            for y in 0..board.height {
                if !stream.chance(gap_chance) {
                    board.set_wall(GridPos::new(x, y), true);
                }
            }
            x += spacing;
        }
    } else {
        let mut y = offset;
        while y < board.height {
            for x in 0..board.width {
                if !stream.chance(gap_chance) {
                    board.set_wall(GridPos::new(x, y), true);
                }
            }
            y += spacing;
        }
    }
}

/// Cells of the rectangular ring inset by `inset`, clockwise from the corner
fn ring_cells(board: &Board, inset: i32) -> Vec<GridPos> {
    let (x0, y0) = (inset, inset);
    let (x1, y1) = (board.width - 1 - inset, board.height - 1 - inset);
    let mut cells = Vec::new();
    if x0 > x1 || y0 > y1 {
        return cells;
    }
    for x in x0..=x1 {
        cells.push(GridPos::new(x, y0));
    }
    for y in (y0 + 1)..=y1 {
        cells.push(GridPos::new(x1, y));
    }
    if y1 > y0 {
        for x in (x0..x1).rev() {
            cells.push(GridPos::new(x, y1));
        }
    }
    if x1 > x0 {
        for y in ((y0 + 1)..y1).rev() {
            cells.push(GridPos::new(x0, y));
        }
    }
    cells
}

fn carve_rings(board: &mut Board, stream: &mut DeterministicStream) {
    let mut inset = stream.next_int(1, 2);
    while inset < board.height / 2 {
        let cells = ring_cells(board, inset);
        if cells.len() < 8 {
            break;
        }
        for &pos in &cells {
            board.set_wall(pos, true);
        }
        // Punch two gaps per ring so the interior stays reachable
        let gap_width = stream.next_int(2, 3) as usize;
        for _ in 0..2 {
            let at = stream.next_int(0, cells.len() as i32 - 1) as usize;
            for k in 0..gap_width {
                board.set_wall(cells[(at + k) % cells.len()], false);
            }
        }
        inset += 3;
    }
}

fn carve_spiral(board: &mut Board, stream: &mut DeterministicStream) {
    // Concentric rings with one gap each, the gap rotating a quarter turn
    // per ring - reads as a spiral and stays connected through the gaps.
    let mut inset = 1;
    let mut side = stream.next_int(0, 3) as usize;
    while inset < board.height / 2 {
        let cells = ring_cells(board, inset);
        if cells.len() < 8 {
            break;
        }
        for &pos in &cells {
            board.set_wall(pos, true);
        }
        let gap_width = 3usize;
        let at = (cells.len() * side / 4 + stream.next_int(0, 1) as usize) % cells.len();
        for k in 0..gap_width {
            board.set_wall(cells[(at + k) % cells.len()], false);
        }
        side = (side + 1) % 4;
        inset += 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionInput, Status};

    #[test]
    fn test_generated_boards_connected() {
        for seed in 0..50 {
            let board = generate_board(seed);
            assert!(board.fully_connected(), "seed {} disconnected", seed);
            assert!(board.free_count() >= MIN_FREE_CELLS, "seed {} too dense", seed);
        }
    }

    #[test]
    fn test_start_zone_always_open() {
        for seed in 0..50 {
            let board = generate_board(seed);
            let cy = board.height / 2;
            let cx = board.width / 2;
            for i in -START_LEN..=1 {
                assert!(!board.is_wall(GridPos::new(cx + i, cy)));
            }
        }
    }

    #[test]
    fn test_moves_one_cell_per_tick() {
        let mut engine = SnakeEngine::new(3);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        engine.food = GridPos::new(0, 0);
        let head = engine.body[0];
        engine.step(&SnakeInput::default(), 1.0);
        assert_eq!(engine.body[0], GridPos::new(head.x + 1, head.y));
        assert_eq!(engine.body.len(), START_LEN as usize);
    }

    #[test]
    fn test_reversal_ignored() {
        let mut engine = SnakeEngine::new(3);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        engine.food = GridPos::new(0, 0);
        // Heading right; Left is a 180° reversal and must be dropped
        let out = engine.step(
            &SnakeInput {
                turn: Some(Dir::Left),
            },
            1.0,
        );
        assert_eq!(out, StepOutcome::Continue);
        assert_eq!(engine.heading, Dir::Right);
    }

    #[test]
    fn test_wraps_at_grid_edge() {
        let mut engine = SnakeEngine::new(3);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        engine.food = GridPos::new(0, 2);
        let cy = engine.body[0].y;
        for _ in 0..GRID_WIDTH {
            let out = engine.step(&SnakeInput::default(), 1.0);
            assert_eq!(out, StepOutcome::Continue);
        }
        // One full lap lands back on the start column, same row
        assert_eq!(engine.body[0], GridPos::new(GRID_WIDTH / 2, cy));
    }

    #[test]
    fn test_self_collision_fatal_and_frozen() {
        let mut engine = SnakeEngine::new(3);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        engine.food = GridPos::new(0, 0);
        // Long enough to turn back into itself
        let head = engine.body[0];
        engine.body = VecDeque::from(vec![
            head,
            GridPos::new(head.x - 1, head.y),
            GridPos::new(head.x - 2, head.y),
            GridPos::new(head.x - 3, head.y),
            GridPos::new(head.x - 3, head.y + 1),
        ]);
        engine.heading = Dir::Right;
        // Hook around: down, left, then up lands on the 4th segment
        engine.step(&SnakeInput { turn: Some(Dir::Down) }, 1.0);
        engine.step(&SnakeInput { turn: Some(Dir::Left) }, 1.0);
        let before: Vec<_> = engine.body.iter().copied().collect();
        let out = engine.step(&SnakeInput { turn: Some(Dir::Up) }, 1.0);
        assert_eq!(out, StepOutcome::LifeLost);
        let after: Vec<_> = engine.body.iter().copied().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_growth_and_speedup_on_food() {
        let mut engine = SnakeEngine::new(3);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        let head = engine.body[0];
        engine.food = GridPos::new(head.x + 1, head.y);
        let len_before = engine.body.len();
        let tick_before = engine.tick_ms;
        engine.step(&SnakeInput::default(), 1.0);
        assert_eq!(engine.body.len(), len_before + 1);
        assert_eq!(engine.score, POINTS_PER_FOOD);
        assert_eq!(engine.tick_ms, tick_before - SPEEDUP_PER_FOOD_MS);
    }

    #[test]
    fn test_tick_interval_floors() {
        let mut engine = SnakeEngine::new(3);
        engine.tick_ms = MIN_TICK_MS + 3;
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        for _ in 0..5 {
            let head = engine.body[0];
            engine.food = engine.board.step(head, engine.heading);
            engine.step(&SnakeInput::default(), 1.0);
        }
        assert_eq!(engine.tick_ms, MIN_TICK_MS);
    }

    #[test]
    fn test_session_game_over_on_wall_hit() {
        let mut engine = SnakeEngine::new(5);
        engine.board = Board::empty(GRID_WIDTH, GRID_HEIGHT);
        engine.food = GridPos::new(0, 2);
        let head = engine.body[0];
        engine.board.set_wall(GridPos::new(head.x + 2, head.y), true);

        let mut session = Session::new(engine, 5, None);
        session.tick(&SessionInput::start(), 1.0);
        for _ in 0..3 {
            session.tick(&SessionInput::game(SnakeInput::default()), 1.0);
        }
        assert_eq!(session.status(), Status::Playing);

        session.tick(&SessionInput::game(SnakeInput::default()), 1.0);
        let snap = session.tick(&SessionInput::game(SnakeInput::default()), 1.0);
        assert_eq!(snap.status, Status::GameOver);
        assert_eq!(snap.lives, 0);

        // Terminal is sticky
        let again = session.tick(&SessionInput::game(SnakeInput::default()), 1.0);
        assert_eq!(again.status, Status::GameOver);
    }
}
