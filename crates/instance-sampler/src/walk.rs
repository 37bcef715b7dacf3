//! Randomized simple-path walks of a fixed length.
//!
//! The walk picks a random successor at every depth and scans the remaining
//! ones circularly from there, backtracking whenever a depth runs out of
//! unvisited candidates. When the root itself runs out the whole walk starts
//! over. The recursion over depth is unrolled onto an explicit stack of
//! frames, one per state on the current trace.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::Rng;

use crate::error::{Result, SamplerError};
use crate::state::{Expander, State, Successors};

/// Frame pops between deadline checks inside one attempt.
const DEADLINE_CHECK_INTERVAL: usize = 1024;

/// Configuration for a random walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkConfig {
    /// Number of transitions in the walk
    pub length: usize,
    /// Give up after this many whole-walk restarts (`None` retries forever)
    pub max_restarts: Option<u32>,
    /// Give up once this much time has passed, even in the middle of an
    /// attempt (`None` waits forever)
    pub timeout: Option<Duration>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            length: 5,
            max_restarts: None,
            timeout: None,
        }
    }
}

/// A completed walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    path: Vec<State>,
    /// Whole-walk restarts needed before this path was found
    pub restarts: u32,
    /// Depths abandoned after trying every candidate, across all attempts
    pub backtracks: usize,
}

impl Walk {
    /// Initial state followed by one state per transition.
    pub fn path(&self) -> &[State] {
        &self.path
    }

    pub fn into_path(self) -> Vec<State> {
        self.path
    }

    /// The state the walk ended in.
    pub fn end(&self) -> &State {
        // path is private and always holds at least the initial state
        &self.path[self.path.len() - 1]
    }

    /// Number of transitions taken.
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a single attempt from the root ended.
enum Attempt {
    Found(Vec<State>),
    DeadEnd,
    TimedOut,
}

/// Candidates left to try at one depth of the walk.
struct Frame {
    successors: Vec<State>,
    start: usize,
    tried: usize,
}

impl Frame {
    fn open<S, R>(expander: &Expander<'_, S>, state: &State, rng: &mut R) -> Result<Self>
    where
        S: Successors + ?Sized,
        R: Rng,
    {
        let successors = expander.expand(state)?;
        let start = if successors.is_empty() {
            0
        } else {
            rng.gen_range(0..successors.len())
        };
        Ok(Self {
            successors,
            start,
            tried: 0,
        })
    }

    /// Next candidate in circular order from the random start.
    fn next_candidate(&mut self) -> Option<&State> {
        if self.tried >= self.successors.len() {
            return None;
        }
        let index = (self.start + self.tried) % self.successors.len();
        self.tried += 1;
        Some(&self.successors[index])
    }
}

/// Sample the end state of a random simple walk of `config.length` transitions.
pub fn random_walk<S, R>(
    initial: State,
    config: &WalkConfig,
    successors: &S,
    rng: &mut R,
) -> Result<State>
where
    S: Successors + ?Sized,
    R: Rng,
{
    let walk = random_walk_path(initial, config, successors, rng)?;
    Ok(walk.end().clone())
}

/// Sample a random simple walk of `config.length` transitions.
///
/// The returned path has `length + 1` states, none repeated. Without a
/// restart or time budget this never returns when no such path exists.
pub fn random_walk_path<S, R>(
    initial: State,
    config: &WalkConfig,
    successors: &S,
    rng: &mut R,
) -> Result<Walk>
where
    S: Successors + ?Sized,
    R: Rng,
{
    let expander = Expander::new(successors, &initial)?;
    if config.length == 0 {
        return Ok(Walk {
            path: vec![initial],
            restarts: 0,
            backtracks: 0,
        });
    }

    let deadline = config.timeout.map(|t| Instant::now() + t);
    let mut restarts = 0;
    let mut backtracks = 0;
    loop {
        let out_of_time = match attempt(
            &expander,
            &initial,
            config.length,
            deadline,
            rng,
            &mut backtracks,
        )? {
            Attempt::Found(path) => {
                return Ok(Walk {
                    path,
                    restarts,
                    backtracks,
                })
            }
            Attempt::TimedOut => true,
            Attempt::DeadEnd => deadline.is_some_and(|d| Instant::now() >= d),
        };

        let out_of_restarts = config.max_restarts.is_some_and(|max| restarts >= max);
        if out_of_restarts || out_of_time {
            warn!(
                "giving up on a walk of length {} after {} restarts",
                config.length, restarts
            );
            return Err(SamplerError::NoSimplePath {
                length: config.length,
                restarts,
            });
        }

        restarts += 1;
        debug!(
            "walk of length {} backtracked to the root, restart {}",
            config.length, restarts
        );
    }
}

/// One walk from the root, abandoned once `deadline` passes.
fn attempt<S, R>(
    expander: &Expander<'_, S>,
    initial: &State,
    length: usize,
    deadline: Option<Instant>,
    rng: &mut R,
    backtracks: &mut usize,
) -> Result<Attempt>
where
    S: Successors + ?Sized,
    R: Rng,
{
    // trace[i] is the state whose candidates stack[i] holds
    let mut trace = vec![initial.clone()];
    let mut on_trace: HashSet<State> = HashSet::from([initial.clone()]);
    let mut stack = vec![Frame::open(expander, initial, rng)?];
    let mut steps = 0usize;

    while let Some(frame) = stack.last_mut() {
        steps += 1;
        if steps % DEADLINE_CHECK_INTERVAL == 0
            && deadline.is_some_and(|d| Instant::now() >= d)
        {
            return Ok(Attempt::TimedOut);
        }

        let Some(candidate) = frame.next_candidate() else {
            stack.pop();
            if let Some(dead) = trace.pop() {
                on_trace.remove(&dead);
            }
            *backtracks += 1;
            continue;
        };
        if on_trace.contains(candidate) {
            continue;
        }

        let candidate = candidate.clone();
        on_trace.insert(candidate.clone());
        trace.push(candidate);
        if trace.len() > length {
            return Ok(Attempt::Found(trace));
        }
        stack.push(Frame::open(expander, &trace[trace.len() - 1], rng)?);
    }

    Ok(Attempt::DeadEnd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{Hanoi, SlidingTile};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ring(n: i32) -> impl Fn(&State) -> Vec<State> {
        move |s: &State| {
            let i = s.get(0).unwrap_or(0);
            vec![State::new([(i + 1) % n]), State::new([(i + n - 1) % n])]
        }
    }

    fn assert_simple(path: &[State]) {
        let unique: HashSet<&State> = path.iter().collect();
        assert_eq!(unique.len(), path.len(), "walk revisited a state: {:?}", path);
    }

    #[test]
    fn test_walk_is_simple_with_exact_length() {
        let puzzle = SlidingTile::new(3, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for length in [1, 4, 12, 30] {
            let config = WalkConfig {
                length,
                ..Default::default()
            };
            let walk = random_walk_path(puzzle.initial(), &config, &puzzle, &mut rng).unwrap();
            assert_eq!(walk.path().len(), length + 1);
            assert_eq!(walk.path()[0], puzzle.initial());
            assert_simple(walk.path());
            for pair in walk.path().windows(2) {
                assert!(puzzle.successors(&pair[0]).contains(&pair[1]));
            }
        }
    }

    #[test]
    fn test_zero_length_returns_initial() {
        let succ = ring(4);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let end = random_walk(
            State::new([2]),
            &WalkConfig {
                length: 0,
                ..Default::default()
            },
            &succ,
            &mut rng,
        )
        .unwrap();
        assert_eq!(end, State::new([2]));
    }

    #[test]
    fn test_longest_simple_path_on_ring() {
        // A ring of 6 has simple paths of at most 5 edges
        let succ = ring(6);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = WalkConfig {
            length: 5,
            max_restarts: Some(0),
            timeout: None,
        };
        let walk = random_walk_path(State::new([0]), &config, &succ, &mut rng).unwrap();
        assert_eq!(walk.restarts, 0);
        assert_simple(walk.path());
        let end = walk.end().get(0).unwrap();
        assert!(end == 1 || end == 5);
    }

    #[test]
    fn test_backtracks_out_of_dead_end() {
        // 0 -> {1, 2}; 1 is a dead end, 2 -> 3 -> 4. Only 0-2-3-4 has length 3.
        let succ = |s: &State| match s.get(0) {
            Some(0) => vec![State::new([1]), State::new([2])],
            Some(2) => vec![State::new([3])],
            Some(3) => vec![State::new([4])],
            _ => Vec::new(),
        };
        for seed in 0..8 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let config = WalkConfig {
                length: 3,
                max_restarts: Some(0),
                timeout: None,
            };
            let end = random_walk(State::new([0]), &config, &succ, &mut rng).unwrap();
            assert_eq!(end, State::new([4]));
        }
    }

    #[test]
    fn test_restart_budget_reports_no_simple_path() {
        let succ = ring(4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = WalkConfig {
            length: 4,
            max_restarts: Some(3),
            timeout: None,
        };
        let err = random_walk(State::new([0]), &config, &succ, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SamplerError::NoSimplePath {
                length: 4,
                restarts: 3
            }
        );
    }

    #[test]
    fn test_timeout_reports_no_simple_path() {
        let isolated = |_: &State| Vec::<State>::new();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = WalkConfig {
            length: 2,
            max_restarts: None,
            timeout: Some(Duration::from_millis(5)),
        };
        let err = random_walk(State::new([0]), &config, &isolated, &mut rng).unwrap_err();
        assert!(matches!(err, SamplerError::NoSimplePath { length: 2, .. }));
    }

    #[test]
    fn test_timeout_interrupts_exhaustive_attempt() {
        // 4 disks on 3 towers give 81 states, so no simple path has 81 edges,
        // but there are far too many simple prefixes to enumerate in time
        let hanoi = Hanoi::new(4, 3).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let config = WalkConfig {
            length: 81,
            max_restarts: None,
            timeout: Some(Duration::from_millis(50)),
        };
        let started = Instant::now();
        let err = random_walk(hanoi.initial(), &config, &hanoi, &mut rng).unwrap_err();
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "walk ran for {:?}",
            started.elapsed()
        );
        assert_eq!(
            err,
            SamplerError::NoSimplePath {
                length: 81,
                restarts: 0
            }
        );
    }

    #[test]
    fn test_walk_accessors_agree() {
        let succ = ring(8);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let config = WalkConfig {
            length: 6,
            ..Default::default()
        };
        let walk = random_walk_path(State::new([0]), &config, &succ, &mut rng).unwrap();
        assert_eq!(walk.len(), 6);
        assert!(!walk.is_empty());
        assert_eq!(walk.end(), walk.path().last().unwrap());
        assert_eq!(walk.clone().into_path().len(), 7);
    }
}
