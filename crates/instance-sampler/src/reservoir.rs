//! Reservoir sampling (algorithm R) over a lazily produced sequence.
//!
//! Large boards have far too many states at a given depth to collect in
//! memory, so the sampler keeps only `capacity` of them while the search
//! streams through the rest.

use log::debug;
use rand::Rng;

/// Upper bound on slots reserved up front for a bounded reservoir
const PREALLOCATE_LIMIT: usize = 4096;

/// Fixed-capacity uniform sample of everything offered so far.
#[derive(Debug, Clone)]
pub struct Reservoir<T> {
    capacity: Option<usize>,
    items: Vec<T>,
    seen: usize,
    next_report: usize,
}

impl<T> Reservoir<T> {
    /// A reservoir holding at most `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self::with_limit(Some(capacity))
    }

    /// A reservoir that keeps everything it is offered.
    pub fn unbounded() -> Self {
        Self::with_limit(None)
    }

    pub fn with_limit(capacity: Option<usize>) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity.unwrap_or(0).min(PREALLOCATE_LIMIT)),
            seen: 0,
            next_report: 10,
        }
    }

    /// Offer the next element of the sequence.
    ///
    /// After `n` offers each offered element is held with probability
    /// `capacity / n`.
    pub fn offer<R: Rng>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        match self.capacity {
            Some(capacity) if self.items.len() >= capacity => {
                let slot = rng.gen_range(0..self.seen);
                if slot < capacity {
                    self.items[slot] = item;
                }
            }
            _ => self.items.push(item),
        }

        if self.seen == self.next_report {
            debug!("reservoir: {} elements seen", self.seen);
            self.next_report = self.next_report.saturating_mul(10);
        }
    }

    /// Number of elements offered so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Uniformly sample `limit` elements of `source`, or keep all of them when
/// `limit` is `None`.
///
/// When the source is shorter than `limit` every element is returned in
/// source order.
pub fn reservoir_sample<I, R>(source: I, limit: Option<usize>, rng: &mut R) -> Vec<I::Item>
where
    I: IntoIterator,
    R: Rng,
{
    let mut reservoir = Reservoir::with_limit(limit);
    for item in source {
        reservoir.offer(item, rng);
    }
    debug!(
        "reservoir sampling done: kept {} of {}",
        reservoir.len(),
        reservoir.seen()
    );
    reservoir.into_vec()
}

/// Like [`reservoir_sample`], but stops at the first `Err` in the source.
pub fn try_reservoir_sample<I, T, E, R>(
    source: I,
    limit: Option<usize>,
    rng: &mut R,
) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
    R: Rng,
{
    let mut reservoir = Reservoir::with_limit(limit);
    for item in source {
        reservoir.offer(item?, rng);
    }
    debug!(
        "reservoir sampling done: kept {} of {}",
        reservoir.len(),
        reservoir.seen()
    );
    Ok(reservoir.into_vec())
}
