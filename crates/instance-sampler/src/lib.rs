//! State-space sampling for planning benchmark generation.
//!
//! This crate explores the reachable configurations of a discrete puzzle
//! under its successor function and draws representative initial states
//! from that space without holding the whole space in memory. It provides a
//! uniform-cost frontier search, a backtracking random-walk sampler and a
//! reservoir sampler, plus reference successor functions for sliding tile,
//! Tower of Hanoi and Lights-Out puzzles.

pub mod domains;
pub mod error;
pub mod frontier;
pub mod generate;
pub mod reservoir;
pub mod state;
pub mod walk;

// Re-export main types
pub use domains::{Hanoi, LightsOut, SlidingTile, HARDEST_EIGHT_PUZZLES};
pub use error::{Result, SamplerError};
pub use frontier::{
    CloseTable, Discovered, FrontierConfig, FrontierSearch, SearchNode, SearchStats, Termination,
};
pub use generate::{generate_instances, Domain, GenerationConfig, InstanceSet, SamplerKind};
pub use reservoir::{reservoir_sample, try_reservoir_sample, Reservoir};
pub use state::{Cell, Expander, State, Successors};
pub use walk::{random_walk, random_walk_path, Walk, WalkConfig};
