//! Seeded RNG for reproducible demand sampling.
//!
//! Every OD evaluation creates a fresh `SampleRng` from the configured seed,
//! so repeated calls against the same Route Store sample exactly the same
//! journeys and their results only differ because of the network.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct SampleRng(SmallRng);

impl SampleRng {
    pub fn new(seed: u64) -> Self {
        SampleRng(SmallRng::seed_from_u64(seed))
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }
}
