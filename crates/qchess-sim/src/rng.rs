//! Seeded randomness for measurement.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Deterministic random source.
///
/// Two sources built from the same seed produce the same stream, which makes
/// measurement outcomes reproducible. Cloning copies the current stream
/// position, so a cloned game continues exactly where the original would.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    seed: u64,
    rng: StdRng,
}

impl SeededRandom {
    /// Create a source from an explicit seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a source with a seed drawn from the thread-local generator.
    ///
    /// The seed is kept so the run can be reproduced later.
    pub fn from_entropy() -> Self {
        let seed: u64 = rand::thread_rng().r#gen();
        Self::new(seed)
    }

    /// Seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.rng.r#gen()
    }
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
