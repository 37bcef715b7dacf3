//! State representation and the successor-function seam.
//!
//! A [`State`] is an immutable, fixed-width vector of small integers. Two
//! states are the same node iff their cells are element-wise equal, so the
//! type derives `Hash`, `Eq` and `Ord` over the whole vector and can key both
//! hash and tree tables.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, SamplerError};

/// A single cell of a state vector (tile position, tower index, light value).
pub type Cell = i32;

/// Inline capacity covers every 4x4 board without touching the heap.
type Cells = SmallVec<[Cell; 16]>;

/// A puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Cells);

impl State {
    pub fn new(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self(cells.into_iter().collect())
    }

    /// A state of `width` cells all holding `value`.
    pub fn filled(width: usize, value: Cell) -> Self {
        Self(SmallVec::from_elem(value, width))
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Cell> {
        self.0.get(index).copied()
    }

    /// Clone with the given `(index, value)` overwrites applied.
    ///
    /// Out-of-range indices are ignored; the width never changes.
    pub fn with_updates(&self, updates: impl IntoIterator<Item = (usize, Cell)>) -> Self {
        let mut cells = self.0.clone();
        for (index, value) in updates {
            if let Some(cell) = cells.get_mut(index) {
                *cell = value;
            }
        }
        Self(cells)
    }
}

impl From<Vec<Cell>> for State {
    fn from(cells: Vec<Cell>) -> Self {
        Self(SmallVec::from_vec(cells))
    }
}

impl From<&[Cell]> for State {
    fn from(cells: &[Cell]) -> Self {
        Self(SmallVec::from_slice(cells))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_slice())
    }
}

/// Transition function of a puzzle domain.
///
/// Implementations must be deterministic for a fixed input, must not depend
/// on any shared mutable state, and should have a small branching factor.
/// The order of the returned states only influences which parent a search
/// records on ties.
pub trait Successors {
    fn successors(&self, state: &State) -> Vec<State>;
}

impl<F> Successors for F
where
    F: Fn(&State) -> Vec<State>,
{
    fn successors(&self, state: &State) -> Vec<State> {
        self(state)
    }
}

/// Wraps a successor function and rejects ill-formed output.
///
/// The width of every state is pinned to the width of the initial state the
/// expander was built from.
pub struct Expander<'a, S: ?Sized> {
    successors: &'a S,
    width: usize,
}

impl<'a, S: Successors + ?Sized> Expander<'a, S> {
    pub fn new(successors: &'a S, initial: &State) -> Result<Self> {
        if initial.is_empty() {
            return Err(SamplerError::InvalidConfiguration(
                "initial state has no cells".to_string(),
            ));
        }
        Ok(Self {
            successors,
            width: initial.len(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Successors of `state`, in the order the domain produced them.
    pub fn expand(&self, state: &State) -> Result<Vec<State>> {
        let next = self.successors.successors(state);
        if let Some(bad) = next.iter().find(|s| s.len() != self.width) {
            return Err(SamplerError::InvalidConfiguration(format!(
                "successor {} of {} has width {}, expected {}",
                bad,
                state,
                bad.len(),
                self.width
            )));
        }
        Ok(next)
    }
}
