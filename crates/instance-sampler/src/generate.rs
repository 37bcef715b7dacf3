//! Instance generation: pick initial states for a planning benchmark.
//!
//! Each domain is searched outward from its canonical configuration, and the
//! states found at the requested distance are downsampled to the requested
//! instance count. The result pairs those initial states with the domain's
//! goal configuration; rendering them is left to the consumer.

use std::time::Duration;

use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domains::{Hanoi, LightsOut, SlidingTile, HARDEST_EIGHT_PUZZLES};
use crate::error::{Result, SamplerError};
use crate::frontier::{FrontierConfig, FrontierSearch, SearchStats, Termination};
use crate::reservoir::try_reservoir_sample;
use crate::state::{State, Successors};
use crate::walk::{random_walk, WalkConfig};

/// How initial states are drawn from the state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Uniform sample of all states at exactly (or up to) `steps`
    Frontier,
    /// Independent random simple walks of `steps` transitions
    Walk,
}

/// A puzzle family together with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    SlidingTile(SlidingTile),
    /// The fixed list of hard 3x3 instances; no search is run
    HardestEightPuzzle,
    Hanoi(Hanoi),
    LightsOut(LightsOut),
}

impl Domain {
    /// Sliding tile domain, or the fixed hard instance list when `longest`
    /// is set; that list only exists for the 3x3 board.
    pub fn sliding_tile(width: usize, height: usize, longest: bool) -> Result<Self> {
        if !longest {
            return Ok(Domain::SlidingTile(SlidingTile::new(width, height)?));
        }
        if (width, height) != (3, 3) {
            return Err(SamplerError::InvalidConfiguration(format!(
                "the hardest instance list is 3x3 only, got {}x{}",
                width, height
            )));
        }
        Ok(Domain::HardestEightPuzzle)
    }

    pub fn name(&self) -> String {
        match self {
            Domain::SlidingTile(p) => format!("puzzle-{}x{}", p.width, p.height),
            Domain::HardestEightPuzzle => "puzzle-3x3-hardest".to_string(),
            Domain::Hanoi(h) => format!("hanoi-{}-{}", h.disks, h.towers),
            Domain::LightsOut(l) => format!("lightsout-{}x{}", l.size, l.size),
        }
    }
}

/// Configuration for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Distance between the sampled initial states and the search origin
    pub steps: u32,
    /// Number of initial states to produce
    pub instances: usize,
    pub sampler: SamplerKind,
    /// Frontier sampler: also draw from states closer than `steps`
    pub include_shallower: bool,
    /// Walk sampler: whole-walk restarts allowed per instance
    pub max_restarts: Option<u32>,
    /// Walk sampler: time allowed per instance
    pub timeout: Option<Duration>,
    /// Fail instead of warning when the space runs out before `steps`
    pub strict: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            steps: 5,
            instances: 100,
            sampler: SamplerKind::Frontier,
            include_shallower: false,
            max_restarts: Some(100),
            timeout: None,
            strict: false,
        }
    }
}

impl GenerationConfig {
    pub fn frontier_config(&self) -> FrontierConfig {
        FrontierConfig {
            depth: self.steps,
            include_shallower: self.include_shallower,
        }
    }

    pub fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            length: self.steps as usize,
            max_restarts: self.max_restarts,
            timeout: self.timeout,
        }
    }
}

/// Sampled initial states and the goals they are to be solved towards.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceSet {
    pub domain: String,
    pub steps: u32,
    pub sampler: SamplerKind,
    pub inits: Vec<State>,
    pub goals: Vec<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchReport>,
}

/// Summary of the frontier search behind an [`InstanceSet`].
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub termination: Option<Termination>,
    pub discovered: usize,
    pub stats: SearchStats,
}

/// Generate the instance set for `domain`.
pub fn generate_instances<R: Rng>(
    domain: &Domain,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<InstanceSet> {
    if config.instances == 0 {
        return Err(SamplerError::InvalidConfiguration(
            "instance count must be positive".to_string(),
        ));
    }

    let (inits, goals, search) = match domain {
        Domain::SlidingTile(puzzle) => {
            let (inits, search) =
                sample_states(puzzle.initial(), puzzle, config.instances, config, rng)?;
            (inits, vec![puzzle.goal()], search)
        }
        Domain::HardestEightPuzzle => {
            let inits = HARDEST_EIGHT_PUZZLES
                .iter()
                .map(|cells| State::from(&cells[..]))
                .collect::<Vec<_>>();
            let goal = SlidingTile::new(3, 3)?.goal();
            (inits, vec![goal], None)
        }
        Domain::Hanoi(hanoi) => {
            // The all-on-tower-0 configuration is always the first instance
            let mut inits = vec![hanoi.tower_zero()];
            let (sampled, search) =
                sample_states(hanoi.initial(), hanoi, config.instances - 1, config, rng)?;
            inits.extend(sampled);
            (inits, vec![hanoi.goal()], search)
        }
        Domain::LightsOut(board) => {
            let (inits, search) =
                sample_states(board.initial(), board, config.instances, config, rng)?;
            (inits, vec![board.goal()], search)
        }
    };

    info!(
        "{}: {} initial states, {} goals",
        domain.name(),
        inits.len(),
        goals.len()
    );

    Ok(InstanceSet {
        domain: domain.name(),
        steps: config.steps,
        sampler: config.sampler,
        inits,
        goals,
        search,
    })
}

fn sample_states<S, R>(
    initial: State,
    successors: &S,
    count: usize,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<(Vec<State>, Option<SearchReport>)>
where
    S: Successors + ?Sized,
    R: Rng,
{
    if count == 0 {
        return Ok((Vec::new(), None));
    }

    match config.sampler {
        SamplerKind::Frontier => {
            let mut search = FrontierSearch::new(initial, &config.frontier_config(), successors)?;
            let states = try_reservoir_sample(
                search.by_ref().map(|found| found.map(|d| d.state)),
                Some(count),
                rng,
            )?;

            if search.exhausted_early() {
                if config.strict {
                    return Err(SamplerError::ExhaustedSpace {
                        requested: config.steps,
                        deepest: search.stats().deepest,
                    });
                }
                warn!(
                    "state space exhausted at distance {} before reaching {}",
                    search.stats().deepest,
                    config.steps
                );
            }
            if states.len() < count {
                warn!(
                    "only {} of {} requested instances available",
                    states.len(),
                    count
                );
            }

            let report = SearchReport {
                termination: search.termination(),
                discovered: search.table().len(),
                stats: search.stats().clone(),
            };
            Ok((states, Some(report)))
        }
        SamplerKind::Walk => {
            let walk = config.walk_config();
            let states = (0..count)
                .map(|_| random_walk(initial.clone(), &walk, successors, rng))
                .collect::<Result<Vec<_>>>()?;
            Ok((states, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_sliding_tile_instances_at_exact_depth() {
        let puzzle = SlidingTile::new(3, 3).unwrap();
        let config = GenerationConfig {
            steps: 5,
            instances: 10,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let set = generate_instances(&Domain::SlidingTile(puzzle), &config, &mut rng).unwrap();

        assert_eq!(set.inits.len(), 10);
        assert_eq!(set.goals, vec![puzzle.goal()]);
        let distinct: HashSet<&State> = set.inits.iter().collect();
        assert_eq!(distinct.len(), 10);

        // 20 states sit at distance 5 from the solved 3x3 board
        let report = set.search.unwrap();
        assert_eq!(report.stats.yielded, 20);
        assert_eq!(report.termination, Some(Termination::DepthBoundReached));
    }

    #[test]
    fn test_hanoi_prepends_tower_zero() {
        let hanoi = Hanoi::new(3, 3).unwrap();
        let config = GenerationConfig {
            steps: 3,
            instances: 3,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = generate_instances(&Domain::Hanoi(hanoi), &config, &mut rng).unwrap();

        assert_eq!(set.inits.len(), 3);
        assert_eq!(set.inits[0], State::new([0, 0, 0]));
        assert_eq!(set.goals, vec![State::new([2, 2, 2])]);
    }

    #[test]
    fn test_single_hanoi_instance_skips_search() {
        let hanoi = Hanoi::new(4, 3).unwrap();
        let config = GenerationConfig {
            instances: 1,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let set = generate_instances(&Domain::Hanoi(hanoi), &config, &mut rng).unwrap();
        assert_eq!(set.inits, vec![hanoi.tower_zero()]);
        assert!(set.search.is_none());
    }

    #[test]
    fn test_exhaustion_warns_or_fails() {
        // The 2x2 puzzle has 12 states, the farthest at distance 6
        let domain = Domain::SlidingTile(SlidingTile::new(2, 2).unwrap());
        let mut config = GenerationConfig {
            steps: 8,
            instances: 5,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let set = generate_instances(&domain, &config, &mut rng).unwrap();
        assert!(set.inits.is_empty());
        assert_eq!(
            set.search.unwrap().termination,
            Some(Termination::Exhausted)
        );

        config.strict = true;
        let err = generate_instances(&domain, &config, &mut rng).unwrap_err();
        assert_eq!(
            err,
            SamplerError::ExhaustedSpace {
                requested: 8,
                deepest: 6
            }
        );
    }

    #[test]
    fn test_walk_sampler() {
        let board = LightsOut::new(3).unwrap();
        let config = GenerationConfig {
            steps: 4,
            instances: 6,
            sampler: SamplerKind::Walk,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let set = generate_instances(&Domain::LightsOut(board), &config, &mut rng).unwrap();
        assert_eq!(set.inits.len(), 6);
        // The start is on every trace, so no simple walk can end there
        assert!(set.inits.iter().all(|s| *s != board.initial()));
    }

    #[test]
    fn test_hardest_eight_puzzles() {
        let config = GenerationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let set = generate_instances(&Domain::HardestEightPuzzle, &config, &mut rng).unwrap();
        assert_eq!(set.inits.len(), HARDEST_EIGHT_PUZZLES.len());
        assert_eq!(set.goals[0].cells(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_zero_instances_rejected() {
        let config = GenerationConfig {
            instances: 0,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = generate_instances(&Domain::HardestEightPuzzle, &config, &mut rng).unwrap_err();
        assert!(matches!(err, SamplerError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_instance_set_json_shape() {
        let hanoi = Hanoi::new(2, 3).unwrap();
        let config = GenerationConfig {
            steps: 1,
            instances: 2,
            ..Default::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let set = generate_instances(&Domain::Hanoi(hanoi), &config, &mut rng).unwrap();
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["domain"], "hanoi-2-3");
        assert_eq!(json["sampler"], "frontier");
        assert_eq!(json["inits"][0], serde_json::json!([0, 0]));
        assert_eq!(json["goals"][0], serde_json::json!([2, 2]));
    }

    #[test]
    fn test_longest_requires_three_by_three() {
        assert_eq!(
            Domain::sliding_tile(3, 3, true).unwrap(),
            Domain::HardestEightPuzzle
        );
        assert!(matches!(
            Domain::sliding_tile(4, 4, true),
            Err(SamplerError::InvalidConfiguration(_))
        ));
        assert_eq!(
            Domain::sliding_tile(4, 4, false).unwrap(),
            Domain::SlidingTile(SlidingTile::new(4, 4).unwrap())
        );
    }
}
