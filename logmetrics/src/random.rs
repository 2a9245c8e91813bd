//! The single source of randomness for a generator instance.

use std::{
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Bounded pseudo-random values, seeded once.
///
/// Not cryptographically secure. Every value a generator produces is drawn through
/// one of these, so two sources with the same seed and the same call order produce
/// the same sequence.
#[derive(Debug)]
pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource {
    /// Seed from the wall clock.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_nanos() as u64)
            .unwrap_or_default();
        Self::seeded(seed)
    }

    /// Seed explicitly, for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// An integer in `[0, max_exclusive)`. Yields 0 when the range is empty.
    pub fn random_int(&self, max_exclusive: i64) -> i64 {
        if max_exclusive <= 0 {
            return 0;
        }
        self.rng().gen_range(0..max_exclusive)
    }

    /// A uniform float in `[0, 1)`.
    pub fn random_float(&self) -> f64 {
        self.rng().gen::<f64>()
    }

    /// Pick one element uniformly, with replacement.
    pub fn pick<'a, T>(&self, candidates: &'a [T]) -> Option<&'a T> {
        if candidates.is_empty() {
            return None;
        }
        let index = self.random_int(candidates.len() as i64) as usize;
        candidates.get(index)
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng
            .lock()
            .expect("random source mutex should not be poisoned")
    }
}
