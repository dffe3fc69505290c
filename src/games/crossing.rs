//! Lane-crossing game (roads, then a river) with continuous motion
//!
//! The player hops cell-by-cell while lane traffic moves continuously by
//! `speed * direction * dt`. Roads kill on contact; rivers kill unless a
//! surfaced platform is underfoot, and riding a platform drags the player
//! along by the platform's own displacement. All overlap tests shrink both
//! boxes by a padding fraction so pixel-edge grazes don't flicker into
//! deaths.

use glam::Vec2;
use serde::Serialize;

use crate::board::Dir;
use crate::rng::{CosmeticJitter, DeterministicStream};
use crate::session::{Engine, GameConfig, Session, StepOutcome};

/// Lane columns (player x range is `[0, LANE_SPAN - 1]`)
pub const LANE_SPAN: f32 = 13.0;
/// Row layout, bottom to top
pub const NUM_ROWS: usize = 13;
const FIRST_ROAD_ROW: usize = 1;
const MEDIAN_ROW: usize = 6;
const GOAL_ROW: usize = NUM_ROWS - 1;

const INITIAL_LIVES: u8 = 3;
/// Shrink fraction applied to each side of every box before overlap tests
const HIT_PADDING: f32 = 0.15;
/// Sinking platforms: up for 4.5s of every 6s cycle, submerged for the rest.
/// The phase offset is drawn once at generation time; evaluation combines it
/// with elapsed play time only - keep these two constants in lockstep.
const SINK_CYCLE_SECS: f32 = 6.0;
const SINK_SUBMERGE_AT: f32 = 4.5;

const ROW_POINTS: u32 = 5;
const CROSS_BASE: u32 = 100;
const LIFE_BONUS: u32 = 40;
const TIME_BONUS_WINDOW_SECS: f32 = 90.0;

const LANE_SPEEDS: [f32; 5] = [0.8, 1.2, 1.6, 2.0, 2.4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LaneKind {
    Grass,
    Road,
    River,
    Goal,
}

/// A vehicle or floating platform, left edge + width in lane cells
#[derive(Debug, Clone, Serialize)]
pub struct LaneObject {
    pub x: f32,
    pub width: f32,
    /// Cycle offset for periodically sinking platforms
    pub sink_offset: Option<f32>,
}

impl LaneObject {
    /// Submerged right now? Road vehicles and solid platforms never are.
    pub fn submerged(&self, elapsed: f32) -> bool {
        match self.sink_offset {
            Some(offset) => (elapsed + offset).rem_euclid(SINK_CYCLE_SECS) >= SINK_SUBMERGE_AT,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Lane {
    pub kind: LaneKind,
    /// Cells per second (0 for grass/goal)
    pub speed: f32,
    /// -1.0 or 1.0
    pub dir: f32,
    pub objects: Vec<LaneObject>,
}

impl Lane {
    fn calm(kind: LaneKind) -> Self {
        Self {
            kind,
            speed: 0.0,
            dir: 1.0,
            objects: Vec::new(),
        }
    }

    /// Displacement of this lane's traffic over `dt`
    fn displacement(&self, dt: f32) -> f32 {
        self.speed * self.dir * dt
    }
}

/// Axis-aligned box in lane space (x across, y = row number)
#[derive(Debug, Clone, Copy)]
struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    fn new(x: f32, row: f32, width: f32) -> Self {
        Self {
            min: Vec2::new(x, row),
            max: Vec2::new(x + width, row + 1.0),
        }
    }

    fn shrunk(self, pad: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(pad),
            max: self.max - Vec2::splat(pad),
        }
    }

    fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Padded overlap between the player cell and a lane object
fn hits(player_x: f32, row: usize, obj: &LaneObject) -> bool {
    let player = Rect::new(player_x, row as f32, 1.0).shrunk(HIT_PADDING);
    let target = Rect::new(obj.x, row as f32, obj.width).shrunk(HIT_PADDING);
    player.overlaps(&target)
}

/// Per-tick input: at most one hop
#[derive(Debug, Clone, Copy, Default)]
pub struct CrossingInput {
    pub hop: Option<Dir>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossingView {
    pub span: f32,
    pub lanes: Vec<Lane>,
    pub player_x: f32,
    pub player_row: usize,
    /// Which platforms are currently under water (parallel to lane objects)
    pub submerged: Vec<Vec<bool>>,
    /// Visual water shimmer only - never feeds gameplay
    #[serde(skip)]
    pub ripple: f32,
}

pub struct CrossingEngine {
    lanes: Vec<Lane>,
    initial_lanes: Vec<Lane>,
    player_x: f32,
    player_row: usize,
    /// Highest row reached this session (progress is scored once)
    max_row: usize,
    elapsed: f32,
    deaths: u8,
    score: u32,
    jitter: CosmeticJitter,
}

impl CrossingEngine {
    pub fn new(seed: u64) -> Self {
        let lanes = generate_lanes(&mut DeterministicStream::from_seed(seed));
        Self {
            initial_lanes: lanes.clone(),
            lanes,
            player_x: (LANE_SPAN / 2.0).floor(),
            player_row: 0,
            max_row: 0,
            elapsed: 0.0,
            deaths: 0,
            score: 0,
            jitter: CosmeticJitter::new(),
        }
    }

    fn lives_left(&self) -> u8 {
        INITIAL_LIVES.saturating_sub(self.deaths)
    }

    /// The platform currently supporting the player after projecting the
    /// player forward by the lane displacement (so riding stays stable).
    fn support_at(&self, row: usize, x: f32) -> Option<usize> {
        let lane = &self.lanes[row];
        if lane.kind != LaneKind::River {
            return None;
        }
        lane.objects
            .iter()
            .position(|obj| !obj.submerged(self.elapsed) && hits(x, row, obj))
    }
}

impl Engine for CrossingEngine {
    type Input = CrossingInput;
    type View = CrossingView;

    fn initial_lives(&self) -> u8 {
        INITIAL_LIVES
    }

    fn step(&mut self, input: &CrossingInput, dt: f32) -> StepOutcome {
        self.elapsed += dt;

        // Hop first: it is this tick's input. Out-of-range hops are dropped.
        if let Some(dir) = input.hop {
            let (dx, dy) = match dir {
                Dir::Up => (0.0, 1isize),
                Dir::Down => (0.0, -1),
                Dir::Left => (-1.0, 0),
                Dir::Right => (1.0, 0),
            };
            let nx = self.player_x + dx;
            let nrow = self.player_row as isize + dy;
            if (0.0..=LANE_SPAN - 1.0).contains(&nx)
                && (0..NUM_ROWS as isize).contains(&nrow)
            {
                self.player_x = nx;
                self.player_row = nrow as usize;
            }
        }

        // Advance traffic, wrapping at lane bounds
        for lane in &mut self.lanes {
            let disp = lane.displacement(dt);
            for obj in &mut lane.objects {
                obj.x += disp;
                let span = LANE_SPAN + obj.width;
                obj.x = (obj.x + obj.width).rem_euclid(span) - obj.width;
            }
        }

        if self.player_row > self.max_row {
            self.score += ROW_POINTS * (self.player_row - self.max_row) as u32;
            self.max_row = self.player_row;
        }

        if self.player_row == GOAL_ROW {
            let time_bonus = (TIME_BONUS_WINDOW_SECS - self.elapsed).max(0.0) as u32;
            self.score += CROSS_BASE + LIFE_BONUS * self.lives_left() as u32 + time_bonus;
            return StepOutcome::Won;
        }

        let lane_kind = self.lanes[self.player_row].kind;
        match lane_kind {
            LaneKind::Grass | LaneKind::Goal => StepOutcome::Continue,
            LaneKind::Road => {
                let row = self.player_row;
                let fatal = self.lanes[row]
                    .objects
                    .iter()
                    .any(|obj| hits(self.player_x, row, obj));
                if fatal {
                    self.deaths += 1;
                    StepOutcome::LifeLost
                } else {
                    StepOutcome::Continue
                }
            }
            LaneKind::River => {
                let disp = self.lanes[self.player_row].displacement(dt);
                let projected = self.player_x + disp;
                match self.support_at(self.player_row, projected) {
                    Some(_) => {
                        // Ride the platform; drifting off either edge is fatal
                        self.player_x = projected;
                        if !(0.0..=LANE_SPAN - 1.0).contains(&self.player_x) {
                            self.deaths += 1;
                            return StepOutcome::LifeLost;
                        }
                        StepOutcome::Continue
                    }
                    None => {
                        self.deaths += 1;
                        StepOutcome::LifeLost
                    }
                }
            }
        }
    }

    fn soft_reset(&mut self) {
        self.lanes = self.initial_lanes.clone();
        self.player_x = (LANE_SPAN / 2.0).floor();
        self.player_row = 0;
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn view(&self) -> CrossingView {
        let submerged = self
            .lanes
            .iter()
            .map(|lane| {
                lane.objects
                    .iter()
                    .map(|obj| obj.submerged(self.elapsed))
                    .collect()
            })
            .collect();
        CrossingView {
            span: LANE_SPAN,
            lanes: self.lanes.clone(),
            player_x: self.player_x,
            player_row: self.player_row,
            submerged,
            ripple: self.jitter.jitter(0.5),
        }
    }
}

pub fn create(config: GameConfig) -> Session<CrossingEngine> {
    let seed = config.resolve_seed();
    Session::new(CrossingEngine::new(seed), seed, config.on_complete)
}

/// Build the lane column. Speeds and directions are drawn with a bias
/// against repeating the previous lane's exact draw (one redraw on a match)
/// so adjacent lanes read differently while staying deterministic.
fn generate_lanes(stream: &mut DeterministicStream) -> Vec<Lane> {
    let mut lanes = Vec::with_capacity(NUM_ROWS);
    let mut prev_speed = 0.0f32;
    let mut prev_dir = 0.0f32;

    for row in 0..NUM_ROWS {
        let kind = match row {
            0 => LaneKind::Grass,
            MEDIAN_ROW => LaneKind::Grass,
            r if r == GOAL_ROW => LaneKind::Goal,
            r if r < MEDIAN_ROW && r >= FIRST_ROAD_ROW => LaneKind::Road,
            _ => LaneKind::River,
        };

        if matches!(kind, LaneKind::Grass | LaneKind::Goal) {
            lanes.push(Lane::calm(kind));
            continue;
        }

        let mut speed = *stream.choice(&LANE_SPEEDS).unwrap_or(&LANE_SPEEDS[0]);
        if speed == prev_speed {
            speed = *stream.choice(&LANE_SPEEDS).unwrap_or(&LANE_SPEEDS[0]);
        }
        let mut dir = if stream.chance(0.5) { 1.0 } else { -1.0 };
        if dir == prev_dir {
            dir = if stream.chance(0.5) { 1.0 } else { -1.0 };
        }
        prev_speed = speed;
        prev_dir = dir;

        let objects = match kind {
            LaneKind::Road => road_objects(stream),
            LaneKind::River => river_objects(stream),
            _ => Vec::new(),
        };

        lanes.push(Lane {
            kind,
            speed,
            dir,
            objects,
        });
    }

    log::info!(
        "crossing lanes: {} road, {} river",
        lanes.iter().filter(|l| l.kind == LaneKind::Road).count(),
        lanes.iter().filter(|l| l.kind == LaneKind::River).count()
    );
    lanes
}

fn road_objects(stream: &mut DeterministicStream) -> Vec<LaneObject> {
    let count = stream.next_int(2, 4);
    let slot = LANE_SPAN / count as f32;
    (0..count)
        .map(|i| {
            let width = if stream.chance(0.3) { 1.6 } else { 1.0 };
            let wobble = stream.next_float() * (slot - width).max(0.0);
            LaneObject {
                x: i as f32 * slot + wobble,
                width,
                sink_offset: None,
            }
        })
        .collect()
}

fn river_objects(stream: &mut DeterministicStream) -> Vec<LaneObject> {
    let count = stream.next_int(2, 3);
    let slot = LANE_SPAN / count as f32;
    (0..count)
        .map(|i| {
            let width = stream.next_int(2, 4) as f32;
            let wobble = stream.next_float() * (slot - width).max(0.0);
            let sink_offset = if stream.chance(0.25) {
                Some(stream.next_float() * SINK_CYCLE_SECS)
            } else {
                None
            };
            LaneObject {
                x: i as f32 * slot + wobble,
                width,
                sink_offset,
            }
        })
        .collect()
}
