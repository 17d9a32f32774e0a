//! Injectable randomness for shuffle generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniformly distributed indices.
pub trait RandomSource: Send + Sync {
    /// Returns a value in `[0, bound)`. `bound` is always at least 1.
    fn next_below(&mut self, bound: usize) -> usize;
}

/// Adapter from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send + Sync> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Reproducible source, same seed gives the same shuffles
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng + Send + Sync> RandomSource for RngSource<R> {
    fn next_below(&mut self, bound: usize) -> usize {
        self.rng.random_range(0..bound)
    }
}

/// Fisher-Yates permutation of `[0, len)`.
pub fn fisher_yates(len: usize, rng: &mut dyn RandomSource) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    for i in (1..len).rev() {
        let j = rng.next_below(i + 1);
        order.swap(i, j);
    }
    order
}
