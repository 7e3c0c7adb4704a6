//! `DeterministicRng` - Seeded Random Number Generator
//!
//! `TigerStyle`: ChaCha20-backed, same seed = same sequence, forked streams
//! stay independent. All simulation randomness flows through this type.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// A deterministic random number generator.
#[derive(Debug, Clone)]
pub struct DeterministicRng {
    rng: ChaCha20Rng,
    seed: u64,
    /// Counter for deriving fork seeds
    fork_counter: u64,
}

impl DeterministicRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            fork_counter: 0,
        }
    }

    /// The original seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Random float in [0, 1).
    pub fn next_float(&mut self) -> f64 {
        let value = self.rng.gen::<f64>();

        // Postcondition
        debug_assert!((0.0..1.0).contains(&value), "float must be in [0, 1)");
        value
    }

    /// Random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }

    /// Random usize in [min, max] inclusive.
    ///
    /// # Panics
    /// Panics if min > max.
    pub fn next_usize(&mut self, min: usize, max: usize) -> usize {
        assert!(min <= max, "min ({min}) must be <= max ({max})");
        self.rng.gen_range(min..=max)
    }

    /// Random boolean that is true with the given probability.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    pub fn next_bool(&mut self, probability: f64) -> bool {
        assert!(
            (0.0..=1.0).contains(&probability),
            "probability must be in [0, 1], got {probability}"
        );
        self.next_float() < probability
    }

    /// Choose one element of a slice.
    ///
    /// # Panics
    /// Panics if the slice is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        assert!(!items.is_empty(), "cannot choose from empty slice");
        &items[self.next_usize(0, items.len() - 1)]
    }

    /// An independent fork of this RNG.
    ///
    /// Fork seeds derive from the parent seed and a counter (golden-ratio
    /// multiplier for spread), so sibling forks never share a stream.
    pub fn fork(&mut self) -> Self {
        let fork_seed = self.seed.wrapping_add(
            self.fork_counter
                .wrapping_add(1)
                .wrapping_mul(0x9E37_79B9_7F4A_7C15),
        );
        self.fork_counter += 1;
        Self::new(fork_seed)
    }
}
