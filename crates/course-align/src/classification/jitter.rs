//! Randomness for the keyword-only estimate
//!
//! The keyword fallback scales its score by a random factor. The source of
//! that factor is injected so callers can fix it.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of multiplicative jitter factors
pub trait JitterSource: Send {
    /// Next factor to multiply a raw score by
    fn factor(&mut self) -> f64;
}

/// Uniform factors drawn from [`RandomJitter::DEFAULT_RANGE`]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Default factor range
    pub const DEFAULT_RANGE: (f64, f64) = (0.8, 1.2);

    /// Seeded generator; identical seeds give identical factors
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }
}

impl JitterSource for RandomJitter {
    fn factor(&mut self) -> f64 {
        let (low, high) = Self::DEFAULT_RANGE;
        self.rng.gen_range(low..high)
    }
}

/// Constant factor
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn factor(&mut self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = RandomJitter::seeded(42);
        let mut b = RandomJitter::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.factor(), b.factor());
        }
    }

    #[test]
    fn test_factor_within_range() {
        let mut jitter = RandomJitter::seeded(7);
        for _ in 0..1000 {
            let f = jitter.factor();
            assert!((0.8..1.2).contains(&f));
        }
    }

    #[test]
    fn test_fixed_jitter() {
        let mut jitter = FixedJitter(0.5);
        assert_eq!(jitter.factor(), 0.5);
        assert_eq!(jitter.factor(), 0.5);
    }
}
