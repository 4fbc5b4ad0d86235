use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform index picker used for every random choice the server makes.
pub trait RandomSource: Send + Sync {
    /// Index in `0..len`, each equally likely. Callers never pass zero.
    fn pick(&self, len: usize) -> usize;
}

/// Thread-local generator; what the server runs with.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible generator for tests and replays.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn pick(&self, len: usize) -> usize {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        rng.gen_range(0..len)
    }
}
