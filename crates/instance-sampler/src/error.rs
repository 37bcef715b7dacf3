//! Error type shared by the search, walk and generation layers.

use thiserror::Error;

/// Errors surfaced to callers of the sampling engine.
///
/// Panics raised inside a successor function are not represented here; they
/// unwind through the search untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// The frontier emptied before any state at the requested depth was popped.
    #[error("state space exhausted: requested depth {requested}, deepest reachable {deepest}")]
    ExhaustedSpace { requested: u32, deepest: u32 },

    /// The random walk ran out of its restart or time budget.
    #[error("no simple path of length {length} found after {restarts} restarts")]
    NoSimplePath { length: usize, restarts: u32 },

    /// Bad input supplied by the caller (or by a successor function).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, SamplerError>;
