//! Core type definitions used throughout the codebase

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 2D point as handed to the rendering backend
pub type Point2 = [f32; 2];

/// Closed numeric interval `[low, high]` that can be sampled uniformly
///
/// Deserializes from a two-element array so configuration files can write
/// `main = [1.5, 2.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Interval {
    pub low: f32,
    pub high: f32,
}

impl Interval {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    /// Degenerate interval that always samples `value`
    pub const fn fixed(value: f32) -> Self {
        Self {
            low: value,
            high: value,
        }
    }

    /// `low + uniform(0, 1) * (high - low)`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.low + rng.gen::<f32>() * (self.high - self.low)
    }

    pub fn is_ordered(&self) -> bool {
        self.low <= self.high
    }
}

impl From<[f32; 2]> for Interval {
    fn from([low, high]: [f32; 2]) -> Self {
        Self { low, high }
    }
}

impl From<Interval> for [f32; 2] {
    fn from(interval: Interval) -> Self {
        [interval.low, interval.high]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_interval_sample_stays_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let interval = Interval::new(1.5, 2.5);
        for _ in 0..100 {
            let v = interval.sample(&mut rng);
            assert!((1.5..=2.5).contains(&v));
        }
    }

    #[test]
    fn test_fixed_interval_is_deterministic() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(Interval::fixed(2.0).sample(&mut rng), 2.0);
    }
}
