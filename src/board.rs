//! Grid geometry for generated levels
//!
//! Boards are toroidal: stepping off one edge re-enters on the opposite one.
//! The connectivity check is what keeps generated wall sets honest - a board
//! is only shippable if every free cell can reach every other free cell.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::wrap_index;

/// A cell coordinate on a toroidal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Discrete movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Unit offset in grid space (y grows downward)
    pub fn offset(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// An immutable-once-generated wall layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    walls: Vec<bool>,
}

impl Board {
    /// A board with no walls (also the generator's fallback)
    pub fn empty(width: i32, height: i32) -> Self {
        assert!(width > 0 && height > 0);
        Self {
            width,
            height,
            walls: vec![false; (width * height) as usize],
        }
    }

    /// Wrap a position onto the torus
    pub fn wrap(&self, pos: GridPos) -> GridPos {
        GridPos::new(wrap_index(pos.x, self.width), wrap_index(pos.y, self.height))
    }

    /// One step in `dir` from `pos`, wrapped
    pub fn step(&self, pos: GridPos, dir: Dir) -> GridPos {
        let (dx, dy) = dir.offset();
        self.wrap(GridPos::new(pos.x + dx, pos.y + dy))
    }

    fn idx(&self, pos: GridPos) -> usize {
        let p = self.wrap(pos);
        (p.y * self.width + p.x) as usize
    }

    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.walls[self.idx(pos)]
    }

    pub fn set_wall(&mut self, pos: GridPos, on: bool) {
        let i = self.idx(pos);
        self.walls[i] = on;
    }

    /// All wall cells, row-major (for snapshots)
    pub fn wall_cells(&self) -> Vec<GridPos> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = GridPos::new(x, y);
                if self.is_wall(pos) {
                    out.push(pos);
                }
            }
        }
        out
    }

    pub fn free_count(&self) -> usize {
        self.walls.iter().filter(|&&w| !w).count()
    }

    /// True iff every free cell is reachable from every other free cell
    /// (BFS over the 4-connected toroidal free-cell graph)
    pub fn fully_connected(&self) -> bool {
        let total_free = self.free_count();
        if total_free == 0 {
            return false;
        }

        let start = match (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| GridPos::new(x, y)))
            .find(|&p| !self.is_wall(p))
        {
            Some(p) => p,
            None => return false,
        };

        let mut visited = vec![false; self.walls.len()];
        let mut queue = VecDeque::new();
        visited[self.idx(start)] = true;
        queue.push_back(start);
        let mut reached = 1usize;

        while let Some(pos) = queue.pop_front() {
            for dir in [Dir::Up, Dir::Down, Dir::Left, Dir::Right] {
                let next = self.step(pos, dir);
                let i = self.idx(next);
                if !visited[i] && !self.is_wall(next) {
                    visited[i] = true;
                    reached += 1;
                    queue.push_back(next);
                }
            }
        }

        reached == total_free
    }
}
