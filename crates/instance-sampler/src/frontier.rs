//! Uniform-cost frontier search over an implicit state graph.
//!
//! The search is a pull-based iterator: a state is handed to the consumer
//! before its successors are generated, and nothing is expanded until the
//! consumer asks for the next element. Superseded heap entries are never
//! removed; they are dropped at pop time when the close table says the node
//! is already closed.

use std::cmp::Reverse;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use log::{debug, info};
use serde::Serialize;

use crate::error::Result;
use crate::state::{Expander, State, Successors};

/// Configuration for a frontier search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierConfig {
    /// Distance from the initial state at which states are yielded
    pub depth: u32,
    /// Also yield every state closer than `depth`, as it is popped
    pub include_shallower: bool,
}

impl Default for FrontierConfig {
    fn default() -> Self {
        Self {
            depth: 5,
            include_shallower: false,
        }
    }
}

/// Bookkeeping attached to a discovered state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    /// Best known distance from the initial state
    pub distance: u32,
    /// Still eligible for expansion
    pub open: bool,
    /// Distance was lowered after the node was first recorded
    pub reopened: bool,
    /// Predecessor on the best known path (`None` for the initial state)
    pub parent: Option<State>,
}

/// Outcome of offering a successor to the close table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relaxation {
    /// First time the state was seen; it must be pushed.
    Inserted(State),
    /// A strictly shorter path was found; it must be pushed again.
    Reopened(State),
    /// The recorded distance was already as good.
    Unchanged,
}

/// Best distance found so far for every discovered state.
///
/// Entries are never removed and recorded distances only go down.
#[derive(Debug, Default)]
pub struct CloseTable {
    nodes: HashMap<State, SearchNode>,
}

impl CloseTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_root(root: State) -> Self {
        let mut table = Self::new();
        table.nodes.insert(
            root,
            SearchNode {
                distance: 0,
                open: true,
                reopened: false,
                parent: None,
            },
        );
        table
    }

    pub fn get(&self, state: &State) -> Option<&SearchNode> {
        self.nodes.get(state)
    }

    pub fn distance(&self, state: &State) -> Option<u32> {
        self.nodes.get(state).map(|node| node.distance)
    }

    pub fn contains(&self, state: &State) -> bool {
        self.nodes.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&State, &SearchNode)> {
        self.nodes.iter()
    }

    /// Record a path of length `candidate` to `state` through `parent`.
    pub fn relax(&mut self, state: State, parent: &State, candidate: u32) -> Relaxation {
        match self.nodes.entry(state) {
            Entry::Vacant(slot) => {
                let key = slot.key().clone();
                slot.insert(SearchNode {
                    distance: candidate,
                    open: true,
                    reopened: false,
                    parent: Some(parent.clone()),
                });
                Relaxation::Inserted(key)
            }
            Entry::Occupied(mut slot) => {
                if candidate >= slot.get().distance {
                    return Relaxation::Unchanged;
                }
                let node = slot.get_mut();
                node.distance = candidate;
                node.parent = Some(parent.clone());
                node.open = true;
                node.reopened = true;
                Relaxation::Reopened(slot.key().clone())
            }
        }
    }

    /// Close `state` if it is open. Returns `false` for closed or unknown states.
    fn close(&mut self, state: &State) -> bool {
        match self.nodes.get_mut(state) {
            Some(node) if node.open => {
                node.open = false;
                true
            }
            _ => false,
        }
    }

    /// States from the initial state to `state`, following recorded parents.
    ///
    /// Parent distances are strictly smaller than their child's, so the chain
    /// always ends at the root.
    pub fn path_to(&self, state: &State) -> Option<Vec<State>> {
        let mut path = vec![state.clone()];
        let mut node = self.nodes.get(state)?;
        while let Some(parent) = &node.parent {
            path.push(parent.clone());
            node = self.nodes.get(parent)?;
        }
        path.reverse();
        Some(path)
    }
}

/// Min-heap of `(distance, state)` pairs that tolerates stale entries.
#[derive(Debug, Default)]
struct Frontier {
    heap: BinaryHeap<Reverse<(u32, State)>>,
    high_water: usize,
}

impl Frontier {
    fn push(&mut self, distance: u32, state: State) {
        self.heap.push(Reverse((distance, state)));
        self.high_water = self.high_water.max(self.heap.len());
    }

    fn pop(&mut self) -> Option<(u32, State)> {
        self.heap.pop().map(|Reverse(entry)| entry)
    }
}

/// Why a search stopped producing states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// A state beyond the target depth was popped
    DepthBoundReached,
    /// The frontier emptied; the reachable space is fully explored
    Exhausted,
    /// The successor function produced an ill-formed state
    Failed,
}

/// Counters collected while searching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Heap entries popped, stale ones included
    pub popped: usize,
    /// Entries discarded because their node was already closed
    pub stale: usize,
    /// Nodes whose successors were generated
    pub expanded: usize,
    /// Successful relaxations of an already recorded node
    pub reopened: usize,
    /// States handed to the consumer
    pub yielded: usize,
    /// Largest distance popped so far
    pub deepest: u32,
    /// Largest frontier size observed
    pub frontier_high_water: usize,
}

/// A state produced by the search, with its distance from the initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovered {
    pub state: State,
    pub distance: u32,
}

/// Lazy uniform-cost search yielding states at (or up to) a target depth.
///
/// The close table stays readable through [`FrontierSearch::table`] between
/// calls to `next`, so consumers can inspect parents and distances of what
/// was discovered so far.
pub struct FrontierSearch<'a, S: ?Sized> {
    expander: Expander<'a, S>,
    config: FrontierConfig,
    table: CloseTable,
    frontier: Frontier,
    /// Yielded node whose expansion is deferred to the next pull
    pending: Option<(u32, State)>,
    stats: SearchStats,
    termination: Option<Termination>,
}

impl<'a, S: Successors + ?Sized> FrontierSearch<'a, S> {
    pub fn new(initial: State, config: &FrontierConfig, successors: &'a S) -> Result<Self> {
        let expander = Expander::new(successors, &initial)?;
        let mut frontier = Frontier::default();
        frontier.push(0, initial.clone());
        Ok(Self {
            expander,
            config: *config,
            table: CloseTable::with_root(initial),
            frontier,
            pending: None,
            stats: SearchStats {
                frontier_high_water: 1,
                ..Default::default()
            },
            termination: None,
        })
    }

    pub fn table(&self) -> &CloseTable {
        &self.table
    }

    pub fn into_table(self) -> CloseTable {
        self.table
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// `None` while the search can still produce states.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// True when the space ran out before any state at the target depth was popped.
    pub fn exhausted_early(&self) -> bool {
        self.termination == Some(Termination::Exhausted) && self.stats.deepest < self.config.depth
    }

    fn expand(&mut self, distance: u32, current: &State) -> Result<()> {
        let successors = self.expander.expand(current)?;
        self.stats.expanded += 1;

        let candidate = distance + 1;
        for next in successors {
            match self.table.relax(next, current, candidate) {
                Relaxation::Inserted(state) => self.frontier.push(candidate, state),
                Relaxation::Reopened(state) => {
                    self.stats.reopened += 1;
                    self.frontier.push(candidate, state);
                }
                Relaxation::Unchanged => {}
            }
        }
        self.stats.frontier_high_water = self.frontier.high_water;
        Ok(())
    }

    fn finish(&mut self, termination: Termination) {
        match termination {
            Termination::DepthBoundReached => info!(
                "explored all states with distance <= {} ({} expanded, {} discovered)",
                self.config.depth,
                self.stats.expanded,
                self.table.len()
            ),
            Termination::Exhausted => info!(
                "frontier exhausted at distance {} ({} expanded, {} discovered)",
                self.stats.deepest,
                self.stats.expanded,
                self.table.len()
            ),
            Termination::Failed => {}
        }
        self.pending = None;
        self.termination = Some(termination);
    }

    fn step(&mut self) -> Result<Option<Discovered>> {
        if let Some((distance, state)) = self.pending.take() {
            self.expand(distance, &state)?;
        }

        while let Some((distance, current)) = self.frontier.pop() {
            self.stats.popped += 1;
            if !self.table.close(&current) {
                self.stats.stale += 1;
                continue;
            }

            if distance > self.config.depth {
                self.finish(Termination::DepthBoundReached);
                return Ok(None);
            }

            if distance > self.stats.deepest {
                debug!(
                    "new distance {} reached, {} popped",
                    distance, self.stats.popped
                );
                self.stats.deepest = distance;
            }

            let emit = distance == self.config.depth
                || (distance < self.config.depth && self.config.include_shallower);
            if emit {
                self.stats.yielded += 1;
                self.pending = Some((distance, current.clone()));
                return Ok(Some(Discovered {
                    state: current,
                    distance,
                }));
            }

            self.expand(distance, &current)?;
        }

        self.finish(Termination::Exhausted);
        Ok(None)
    }
}

impl<S: Successors + ?Sized> Iterator for FrontierSearch<'_, S> {
    type Item = Result<Discovered>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }
        match self.step() {
            Ok(found) => found.map(Ok),
            Err(e) => {
                self.finish(Termination::Failed);
                Some(Err(e))
            }
        }
    }
}
