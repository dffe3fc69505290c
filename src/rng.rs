//! Random number sources
//!
//! Two generators with very different contracts live here:
//! - [`DeterministicStream`]: seeded, reproducible, and the only RNG allowed
//!   to touch anything that affects boards, entities, score or status.
//! - [`CosmeticJitter`]: unseeded, for visual-only noise. Its output may only
//!   land in `#[serde(skip)]` snapshot fields.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seeded gameplay stream
///
/// Two streams built from the same seed produce identical sequences forever.
/// No entropy source other than the seed is consulted.
#[derive(Debug, Clone)]
pub struct DeterministicStream {
    rng: Pcg32,
}

impl DeterministicStream {
    /// Build a stream from a numeric seed
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Build a stream from a text seed (e.g. `"2024-12-04"` daily challenges)
    pub fn from_text(seed: &str) -> Self {
        Self::from_seed(fnv1a(seed.as_bytes()))
    }

    /// Next float in `[0, 1)`
    pub fn next_float(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Next integer in `[min, max]` inclusive
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        debug_assert!(min <= max);
        self.rng.random_range(min..=max)
    }

    /// Bernoulli draw with probability `p` of `true`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_float() < p
    }

    /// Uniform pick from a slice
    pub fn choice<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let i = self.rng.random_range(0..items.len());
            Some(&items[i])
        }
    }

    /// Weighted index pick; `None` if all weights are zero or the list is empty
    pub fn weighted(&mut self, weights: &[f32]) -> Option<usize> {
        let total: f32 = weights.iter().sum();
        if weights.is_empty() || total <= 0.0 {
            return None;
        }
        let mut threshold = self.next_float() * total;
        for (i, &w) in weights.iter().enumerate() {
            threshold -= w;
            if threshold <= 0.0 {
                return Some(i);
            }
        }
        Some(weights.len() - 1)
    }

    /// Fisher-Yates shuffle in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.random_range(0..=i);
            items.swap(i, j);
        }
    }
}

/// Fold bytes into a u64 (FNV-1a), stable across platforms
pub(crate) fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

/// Draw a fresh seed when the host supplies none
pub fn entropy_seed() -> u64 {
    rand::rng().random()
}

/// Unseeded noise for visual effects only
///
/// Never feed these values into gameplay state. Snapshot fields filled from
/// here must be `#[serde(skip)]` so replay comparisons ignore them.
#[derive(Debug, Default, Clone)]
pub struct CosmeticJitter;

impl CosmeticJitter {
    pub fn new() -> Self {
        Self
    }

    /// Uniform noise in `[-amplitude, amplitude)`
    pub fn jitter(&self, amplitude: f32) -> f32 {
        (rand::rng().random::<f32>() * 2.0 - 1.0) * amplitude
    }
}
