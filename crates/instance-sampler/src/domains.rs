//! Reference successor functions for the benchmark puzzle families.
//!
//! Every domain encodes its configurations as a flat [`State`]:
//!
//! - sliding tile: `state[i]` is the board position of tile `i`, tile 0 being
//!   the blank,
//! - Tower of Hanoi: `state[d]` is the tower holding disk `d`, disk 0 being
//!   the smallest,
//! - Lights-Out: one cell per light, `-1` for off and `1` for on.

use crate::error::{Result, SamplerError};
use crate::state::{Cell, State, Successors};

/// Hard 3x3 instances from the eight-puzzle literature, as tile positions.
pub const HARDEST_EIGHT_PUZZLES: [[Cell; 9]; 6] = [
    [3, 5, 6, 8, 4, 7, 2, 1, 0],
    [1, 8, 6, 7, 4, 3, 2, 5, 0],
    [8, 7, 4, 5, 6, 1, 2, 3, 0],
    [8, 7, 6, 5, 2, 1, 4, 3, 0],
    [7, 8, 3, 6, 5, 4, 1, 2, 0],
    [5, 8, 7, 6, 1, 4, 0, 2, 3],
];

fn invalid(message: String) -> SamplerError {
    SamplerError::InvalidConfiguration(message)
}

/// `width x height` sliding tile puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlidingTile {
    pub width: usize,
    pub height: usize,
}

impl SlidingTile {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || width * height < 2 {
            return Err(invalid(format!(
                "sliding tile board {}x{} needs at least two cells",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    pub fn cells(&self) -> usize {
        self.width * self.height
    }

    /// Every tile on its own index, blank in the top-left corner.
    pub fn initial(&self) -> State {
        State::new(0..self.cells() as Cell)
    }

    pub fn goal(&self) -> State {
        self.initial()
    }
}

impl Successors for SlidingTile {
    fn successors(&self, state: &State) -> Vec<State> {
        let Some(blank) = state.get(0).and_then(|b| usize::try_from(b).ok()) else {
            return Vec::new();
        };
        let (x, y) = (blank % self.width, blank / self.width);

        let mut targets = Vec::with_capacity(4);
        if x > 0 {
            targets.push(blank - 1);
        }
        if x + 1 < self.width {
            targets.push(blank + 1);
        }
        if y > 0 {
            targets.push(blank - self.width);
        }
        if y + 1 < self.height {
            targets.push(blank + self.width);
        }

        targets
            .into_iter()
            .filter_map(|target| {
                let target = target as Cell;
                let tile = state.cells().iter().position(|&pos| pos == target)?;
                Some(state.with_updates([(0, target), (tile, blank as Cell)]))
            })
            .collect()
    }
}

/// Tower of Hanoi with `disks` disks on `towers` towers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hanoi {
    pub disks: usize,
    pub towers: usize,
}

impl Hanoi {
    pub fn new(disks: usize, towers: usize) -> Result<Self> {
        if disks == 0 {
            return Err(invalid("hanoi needs at least one disk".to_string()));
        }
        if towers < 2 {
            return Err(invalid(format!(
                "hanoi needs at least two towers, got {}",
                towers
            )));
        }
        Ok(Self { disks, towers })
    }

    /// All disks stacked on the last tower; searches start here.
    pub fn initial(&self) -> State {
        State::filled(self.disks, (self.towers - 1) as Cell)
    }

    pub fn goal(&self) -> State {
        self.initial()
    }

    /// All disks stacked on the first tower, the farthest classic start.
    pub fn tower_zero(&self) -> State {
        State::filled(self.disks, 0)
    }

    /// Smallest disk on `tower`, if any.
    fn top(state: &State, tower: Cell) -> Option<usize> {
        state.cells().iter().position(|&t| t == tower)
    }
}

impl Successors for Hanoi {
    fn successors(&self, state: &State) -> Vec<State> {
        let mut next = Vec::new();
        for from in 0..self.towers as Cell {
            let Some(disk) = Self::top(state, from) else {
                continue;
            };
            for to in 0..self.towers as Cell {
                if to == from {
                    continue;
                }
                if Self::top(state, to).map_or(true, |other| other > disk) {
                    next.push(state.with_updates([(disk, to)]));
                }
            }
        }
        next
    }
}

/// `size x size` Lights-Out board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightsOut {
    pub size: usize,
}

impl LightsOut {
    pub const OFF: Cell = -1;
    pub const ON: Cell = 1;

    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(invalid("lights-out board needs a positive size".to_string()));
        }
        Ok(Self { size })
    }

    /// Every light off.
    pub fn initial(&self) -> State {
        State::filled(self.size * self.size, Self::OFF)
    }

    pub fn goal(&self) -> State {
        self.initial()
    }

    /// Press the button at `index`, toggling it and its orthogonal neighbours.
    pub fn press(&self, state: &State, index: usize) -> State {
        let (x, y) = (index % self.size, index / self.size);
        let mut toggled = vec![index];
        if x > 0 {
            toggled.push(index - 1);
        }
        if x + 1 < self.size {
            toggled.push(index + 1);
        }
        if y > 0 {
            toggled.push(index - self.size);
        }
        if y + 1 < self.size {
            toggled.push(index + self.size);
        }
        state.with_updates(
            toggled
                .into_iter()
                .filter_map(|i| state.get(i).map(|value| (i, -value))),
        )
    }
}

impl Successors for LightsOut {
    fn successors(&self, state: &State) -> Vec<State> {
        (0..state.len()).map(|i| self.press(state, i)).collect()
    }
}
